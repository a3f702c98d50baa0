//! BSE `GetSensexData` response models.
//!
//! BSE sends numbers as display strings with Indian digit grouping
//! (`"81,512.30"`).

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::provider::lenient_decimal;

#[derive(Debug, Deserialize)]
pub struct BseIndexRow {
    /// Index name, e.g. "SENSEX" or "S&P BSE SENSEX"
    #[serde(rename = "indxnm")]
    pub index_name: String,
    #[serde(rename = "ltp", default, deserialize_with = "lenient_decimal")]
    pub last: Option<Decimal>,
    #[serde(rename = "chg", default, deserialize_with = "lenient_decimal")]
    pub change: Option<Decimal>,
    #[serde(rename = "perchg", default, deserialize_with = "lenient_decimal")]
    pub percent_change: Option<Decimal>,
}

impl BseIndexRow {
    pub fn is_sensex(&self) -> bool {
        let name = self.index_name.trim().to_uppercase();
        name == "SENSEX" || name.ends_with(" SENSEX")
    }
}
