use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Display currency used when a source does not report one.
pub const DEFAULT_CURRENCY: &str = "₹";

/// A single symbol's current market reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Stable short identifier ("NIFTY", "SENSEX"), unique within a response
    pub symbol: String,

    /// Human-readable label
    pub name: String,

    /// Current level (index points, currency units or commodity price)
    pub price: Decimal,

    /// Absolute change versus the prior reference point
    pub change: Decimal,

    /// `change` as a percentage of the prior reference point
    pub change_percent: Decimal,

    /// Whether the originating session is trading right now
    pub is_open: bool,

    /// Display currency symbol or code
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Quote {
    /// Create a quote in the default currency.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        change: Decimal,
        change_percent: Decimal,
        is_open: bool,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price,
            change,
            change_percent,
            is_open,
            currency: default_currency(),
        }
    }

    /// Replace the display currency. Blank values keep the default.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        let currency = currency.into();
        if !currency.trim().is_empty() {
            self.currency = currency;
        }
        self
    }
}
