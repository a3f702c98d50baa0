//! Yahoo Finance quote provider.
//!
//! Covers the whole catalog (Indian indices, US indices, gold, silver and
//! crude futures) through the v7 quote API, which needs a cookie + crumb
//! pair obtained from the consent host.

mod models;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use reqwest::{Client, StatusCode};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::models::{Quote, DEFAULT_CURRENCY};
use crate::provider::headers::yahoo_headers;
use crate::provider::{
    http_client, read_json, round2, ProviderCapabilities, QuoteProvider, DEFAULT_REQUEST_TIMEOUT,
};

use models::{YahooQuote, YahooQuoteResponse};

pub const YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";
pub const YAHOO_API_BASE: &str = "https://query1.finance.yahoo.com";
const PROVIDER_ID: &str = "YAHOO";

/// Yahoo ticker to (symbol, display name).
const SYMBOL_MAP: &[(&str, &str, &str)] = &[
    ("^NSEI", "NIFTY", "Nifty 50"),
    ("^BSESN", "SENSEX", "Sensex"),
    ("^NSEBANK", "BANKNIFTY", "Bank Nifty"),
    ("^IXIC", "NASDAQ", "Nasdaq"),
    ("^DJI", "DOW", "Dow Jones"),
    ("GC=F", "GOLD", "Gold"),
    ("SI=F", "SILVER", "Silver"),
    ("CL=F", "CRUDE", "Crude Oil"),
];

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

// ============================================================================
// Yahoo Provider
// ============================================================================

pub struct YahooProvider {
    client: Client,
    cookie_url: String,
    api_base: String,
    crumb: RwLock<Option<CrumbData>>,
}

impl YahooProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_endpoints(YAHOO_COOKIE_URL, YAHOO_API_BASE, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Use other hosts for the consent cookie and the API (a mock server in tests).
    pub fn with_endpoints(
        cookie_url: &str,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self, MarketDataError> {
        Ok(Self {
            client: http_client(PROVIDER_ID, yahoo_headers(), timeout)?,
            cookie_url: cookie_url.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            crumb: RwLock::new(None),
        })
    }

    fn read_crumb(&self) -> RwLockReadGuard<'_, Option<CrumbData>> {
        self.crumb.read().unwrap_or_else(|poisoned| {
            warn!("Yahoo crumb lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_crumb(&self) -> RwLockWriteGuard<'_, Option<CrumbData>> {
        self.crumb.write().unwrap_or_else(|poisoned| {
            warn!("Yahoo crumb lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Ensure we have a valid Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        let cached = self.read_crumb().clone();
        if let Some(crumb) = cached {
            return Ok(crumb);
        }

        self.fetch_crumb().await
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        // Step 1: the consent host answers 404 but still sets the cookie
        let response = self
            .client
            .get(&self.cookie_url)
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to get cookie: {}", e),
            })?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Failed to parse Yahoo cookie".to_string(),
            })?;

        // Step 2: Get crumb using cookie
        let response = self
            .client
            .get(format!("{}/v1/test/getcrumb", self.api_base))
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to get crumb: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Crumb request returned {}", response.status()),
            });
        }

        let crumb = response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read crumb: {}", e),
            })?
            .trim()
            .to_string();

        if crumb.is_empty() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Yahoo returned an empty crumb".to_string(),
            });
        }

        let crumb_data = CrumbData { cookie, crumb };
        *self.write_crumb() = Some(crumb_data.clone());
        debug!("Yahoo crumb refreshed");

        Ok(crumb_data)
    }

    /// Clear the cached crumb (used when authentication fails)
    fn clear_crumb(&self) {
        *self.write_crumb() = None;
    }

    fn quote_url(&self, crumb: &str) -> String {
        let symbols = SYMBOL_MAP
            .iter()
            .map(|(ticker, _, _)| *ticker)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/v7/finance/quote?symbols={}&crumb={}",
            self.api_base,
            encode(&symbols),
            encode(crumb)
        )
    }
}

/// Map a Yahoo currency code to the display symbol.
fn display_currency(code: Option<&str>) -> String {
    match code.map(str::trim) {
        Some("INR") => "₹".to_string(),
        Some("USD") => "$".to_string(),
        Some(other) if !other.is_empty() => other.to_string(),
        _ => DEFAULT_CURRENCY.to_string(),
    }
}

fn yahoo_quote_to_quote(row: &YahooQuote) -> Option<Quote> {
    let (_, symbol, name) = SYMBOL_MAP
        .iter()
        .find(|(ticker, _, _)| *ticker == row.symbol)?;

    let price = row.regular_market_price.and_then(Decimal::from_f64)?;
    let change = row
        .regular_market_change
        .and_then(Decimal::from_f64)
        .unwrap_or(Decimal::ZERO);
    let change_percent = row
        .regular_market_change_percent
        .and_then(Decimal::from_f64)
        .unwrap_or(Decimal::ZERO);
    let is_open = row.market_state.as_deref() == Some("REGULAR");

    Some(
        Quote::new(
            *symbol,
            *name,
            round2(price),
            round2(change),
            round2(change_percent),
            is_open,
        )
        .with_currency(display_currency(row.currency.as_deref())),
    )
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        5
    }

    fn capabilities(&self) -> ProviderCapabilities {
        let symbols: Vec<&str> = SYMBOL_MAP.iter().map(|(_, symbol, _)| *symbol).collect();
        ProviderCapabilities::new(&symbols).with_handshake()
    }

    async fn fetch_quotes(&self) -> Result<Vec<Quote>, MarketDataError> {
        let crumb = self.ensure_crumb().await?;

        let response = self
            .client
            .get(self.quote_url(&crumb.crumb))
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.clear_crumb();
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Yahoo authentication expired".to_string(),
            });
        }
        if !status.is_success() {
            return Err(MarketDataError::from_status(PROVIDER_ID, status));
        }

        let data: YahooQuoteResponse = read_json(PROVIDER_ID, response).await?;

        Ok(data
            .quote_response
            .result
            .iter()
            .filter_map(yahoo_quote_to_quote)
            .collect())
    }
}
