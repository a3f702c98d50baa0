//! NSE `allIndices` response models.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::provider::lenient_decimal;

/// Top-level `allIndices` payload.
#[derive(Debug, Deserialize)]
pub struct NseIndicesResponse {
    pub data: Vec<NseIndex>,
}

/// One index row. Numeric fields may be missing; callers default them to 0.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NseIndex {
    pub index: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub last: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub variation: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub percent_change: Option<Decimal>,
}
