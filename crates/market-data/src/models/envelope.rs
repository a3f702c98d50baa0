use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::market_status::MarketStatus;
use super::quote::Quote;

/// Body returned by the market data endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataResponse {
    /// Always `true` when data is returned, even if every quote is estimated
    pub success: bool,
    pub data: Vec<Quote>,
    #[serde(serialize_with = "serialize_millis")]
    pub timestamp: DateTime<Utc>,
    pub is_live: bool,
    pub market_status: MarketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl MarketDataResponse {
    pub fn new(
        data: Vec<Quote>,
        timestamp: DateTime<Utc>,
        is_live: bool,
        market_status: MarketStatus,
    ) -> Self {
        Self {
            success: true,
            data,
            timestamp,
            is_live,
            market_status,
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn serialize_millis<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sample() -> MarketDataResponse {
        let ts = Utc.with_ymd_and_hms(2026, 1, 29, 10, 15, 0).unwrap();
        let quote = Quote::new("NIFTY", "Nifty 50", dec!(23250.4), dec!(12.3), dec!(0.05), true);
        MarketDataResponse::new(vec![quote], ts, true, MarketStatus::Open)
    }

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["timestamp"], "2026-01-29T10:15:00.000Z");
        assert_eq!(json["isLive"], true);
        assert_eq!(json["marketStatus"], "open");
        assert_eq!(json["data"][0]["symbol"], "NIFTY");
        assert!(json.get("warning").is_none());
    }

    #[test]
    fn test_warning_present_when_set() {
        let json = serde_json::to_value(sample().with_warning("Using cached market data")).unwrap();
        assert_eq!(json["warning"], "Using cached market data");
    }

    #[test]
    fn test_envelope_parses_back() {
        let text = serde_json::to_string(&sample()).unwrap();
        let parsed: MarketDataResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.market_status, MarketStatus::Open);
        assert_eq!(parsed.warning, None);
    }
}
