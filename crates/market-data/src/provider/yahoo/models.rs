//! Yahoo Finance v7 quote response models.

use serde::Deserialize;

/// Main response wrapper for the v7 quote API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteResponse {
    pub quote_response: YahooQuoteResult,
}

#[derive(Debug, Deserialize)]
pub struct YahooQuoteResult {
    #[serde(default)]
    pub result: Vec<YahooQuote>,
    // Note: error field exists in API but we handle errors via HTTP status/empty results
}

/// One row of the quote API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuote {
    pub symbol: String,
    pub regular_market_price: Option<f64>,
    pub regular_market_change: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
    /// "REGULAR", "PRE", "POST", "CLOSED", ...
    pub market_state: Option<String>,
    pub currency: Option<String>,
}
