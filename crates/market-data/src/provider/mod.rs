//! Upstream quote providers.
//!
//! This module contains:
//! - The `QuoteProvider` trait that all providers implement
//! - Provider capabilities
//! - Concrete providers (NSE, BSE, Yahoo Finance, a simulated feed)
//!
//! Every provider owns its HTTP client and reports failures as
//! `MarketDataError`. None of them fall back on their own: gap filling
//! happens once, in the aggregator.

mod capabilities;
pub mod headers;
mod traits;

pub mod bse;
pub mod nse;
pub mod simulated;
pub mod yahoo;

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::errors::MarketDataError;

pub use capabilities::ProviderCapabilities;
pub use traits::QuoteProvider;

/// Request timeout used when a provider is built without one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Build a provider's HTTP client.
pub(crate) fn http_client(
    provider: &str,
    headers: HeaderMap,
    timeout: Duration,
) -> Result<Client, MarketDataError> {
    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| MarketDataError::ProviderError {
            provider: provider.to_string(),
            message: format!("Failed to create HTTP client: {}", e),
        })
}

/// Read a response body as JSON, reporting shape problems as a malformed payload.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, MarketDataError> {
    let body = response
        .text()
        .await
        .map_err(|e| MarketDataError::from_transport(provider, e))?;
    serde_json::from_str(&body).map_err(|e| MarketDataError::MalformedPayload {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Number as sent by exchange APIs: a JSON number or a comma-grouped string.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

/// Parse `"81,512.30"`, `" 12.5 "` or `"-0.15"` into a decimal.
pub(crate) fn parse_grouped_decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}

/// Deserialize an optional field that may be a number, a numeric string, or absent.
pub(crate) fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(match value {
        Some(LenientNumber::Number(n)) => Decimal::from_f64(n),
        Some(LenientNumber::Text(s)) => parse_grouped_decimal(&s),
        None => None,
    })
}

/// Round a price-like value to two decimal places.
pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient_decimal")]
        value: Option<Decimal>,
    }

    fn parse(json: &str) -> Option<Decimal> {
        serde_json::from_str::<Row>(json).unwrap().value
    }

    #[test]
    fn test_parse_grouped_decimal() {
        assert_eq!(parse_grouped_decimal("81,512.30"), Some(dec!(81512.30)));
        assert_eq!(parse_grouped_decimal(" -0.15 "), Some(dec!(-0.15)));
        assert_eq!(parse_grouped_decimal("1,00,000"), Some(dec!(100000)));
        assert_eq!(parse_grouped_decimal(""), None);
        assert_eq!(parse_grouped_decimal("n/a"), None);
    }

    #[test]
    fn test_lenient_decimal_accepts_numbers_and_strings() {
        assert_eq!(parse(r#"{"value": 23250.4}"#), Some(dec!(23250.4)));
        assert_eq!(parse(r#"{"value": "81,512.30"}"#), Some(dec!(81512.30)));
        assert_eq!(parse(r#"{"value": null}"#), None);
        assert_eq!(parse(r#"{}"#), None);
        assert_eq!(parse(r#"{"value": "-"}"#), None);
    }
}
