//! National Stock Exchange of India provider.
//!
//! NSE rejects API calls that don't carry the cookies its landing page
//! sets, so every fetch is two requests: the landing page, then
//! `/api/allIndices` with the collected cookies and a matching `Referer`.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{self, HeaderMap};
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{MarketSession, Quote};
use crate::provider::headers::nse_headers;
use crate::provider::{
    http_client, read_json, round2, ProviderCapabilities, QuoteProvider, DEFAULT_REQUEST_TIMEOUT,
};

use models::{NseIndex, NseIndicesResponse};

pub const NSE_BASE_URL: &str = "https://www.nseindia.com";
const PROVIDER_ID: &str = "NSE";

/// NSE index name to (symbol, display name).
const INDEX_MAP: &[(&str, &str, &str)] = &[
    ("NIFTY 50", "NIFTY", "Nifty 50"),
    ("NIFTY BANK", "BANKNIFTY", "Bank Nifty"),
];

pub struct NseProvider {
    client: Client,
    base_url: String,
    session: MarketSession,
}

impl NseProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_base_url(NSE_BASE_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Point the provider at another host (a mock server in tests).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, MarketDataError> {
        Ok(Self {
            client: http_client(PROVIDER_ID, nse_headers(), timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: MarketSession::nse(),
        })
    }

    /// Load the landing page and return its cookies as a `Cookie` header value.
    ///
    /// A non-success status is logged and tolerated: the data call may still work.
    async fn session_cookie(&self) -> Result<String, MarketDataError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        if !response.status().is_success() {
            warn!(
                "NSE landing page returned {}, continuing without a fresh session",
                response.status()
            );
        }

        Ok(collect_cookies(response.headers()))
    }

    async fn fetch_indices(&self, cookie: &str) -> Result<NseIndicesResponse, MarketDataError> {
        let mut request = self
            .client
            .get(format!("{}/api/allIndices", self.base_url))
            .header(header::REFERER, format!("{}/", self.base_url));
        if !cookie.is_empty() {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::from_status(PROVIDER_ID, status));
        }

        read_json(PROVIDER_ID, response).await
    }
}

/// Join every `Set-Cookie` header's `name=value` part with `"; "`.
fn collect_cookies(headers: &HeaderMap) -> String {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

fn index_to_quote(index: &NseIndex, is_open: bool) -> Option<Quote> {
    let (_, symbol, name) = INDEX_MAP
        .iter()
        .find(|(nse_name, _, _)| *nse_name == index.index)?;

    Some(Quote::new(
        *symbol,
        *name,
        round2(index.last.unwrap_or(Decimal::ZERO)),
        round2(index.variation.unwrap_or(Decimal::ZERO)),
        round2(index.percent_change.unwrap_or(Decimal::ZERO)),
        is_open,
    ))
}

#[async_trait]
impl QuoteProvider for NseProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        let symbols: Vec<&str> = INDEX_MAP.iter().map(|(_, symbol, _)| *symbol).collect();
        ProviderCapabilities::new(&symbols).with_handshake()
    }

    async fn fetch_quotes(&self) -> Result<Vec<Quote>, MarketDataError> {
        let cookie = self.session_cookie().await?;
        debug!("NSE session established with {} cookie bytes", cookie.len());

        let indices = self.fetch_indices(&cookie).await?;
        let is_open = self.session.is_open_at(Utc::now());

        let quotes: Vec<Quote> = indices
            .data
            .iter()
            .filter_map(|index| index_to_quote(index, is_open))
            .collect();

        debug!("NSE returned {} of {} mapped indices", quotes.len(), INDEX_MAP.len());
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    const INDICES: &str = r#"{
        "data": [
            {"index": "NIFTY 50", "last": 23250.4, "variation": 12.3, "percentChange": 0.05},
            {"index": "NIFTY IT", "last": 41000.0, "variation": -20.0, "percentChange": -0.05},
            {"index": "NIFTY BANK", "last": 49210.75}
        ]
    }"#;

    fn provider(server: &mockito::ServerGuard) -> NseProvider {
        NseProvider::with_base_url(&server.url(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_collect_cookies_keeps_name_value_pairs() {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, "nsit=abc; Path=/; HttpOnly".parse().unwrap());
        headers.append(header::SET_COOKIE, "nseappid=xyz; Secure".parse().unwrap());
        assert_eq!(collect_cookies(&headers), "nsit=abc; nseappid=xyz");
        assert_eq!(collect_cookies(&HeaderMap::new()), "");
    }

    #[test]
    fn test_capabilities() {
        let caps = NseProvider::new().unwrap().capabilities();
        assert!(caps.covers("NIFTY"));
        assert!(caps.covers("BANKNIFTY"));
        assert!(!caps.covers("SENSEX"));
        assert!(caps.requires_handshake);
    }

    #[tokio::test]
    async fn test_fetch_maps_known_indices_with_session_cookie() {
        let mut server = mockito::Server::new_async().await;
        let landing = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("set-cookie", "nsit=abc; Path=/")
            .with_header("set-cookie", "nseappid=xyz; Path=/")
            .create_async()
            .await;
        let api = server
            .mock("GET", "/api/allIndices")
            .match_header("cookie", "nsit=abc; nseappid=xyz")
            .match_header("referer", Matcher::Regex("/$".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(INDICES)
            .create_async()
            .await;

        let quotes = provider(&server).fetch_quotes().await.unwrap();

        landing.assert_async().await;
        api.assert_async().await;
        assert_eq!(quotes.len(), 2);

        assert_eq!(quotes[0].symbol, "NIFTY");
        assert_eq!(quotes[0].name, "Nifty 50");
        assert_eq!(quotes[0].price, dec!(23250.4));
        assert_eq!(quotes[0].change, dec!(12.3));
        assert_eq!(quotes[0].change_percent, dec!(0.05));
        assert_eq!(quotes[0].currency, "₹");

        // Missing numeric fields default to zero
        assert_eq!(quotes[1].symbol, "BANKNIFTY");
        assert_eq!(quotes[1].price, dec!(49210.75));
        assert_eq!(quotes[1].change, Decimal::ZERO);
        assert_eq!(quotes[1].change_percent, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_landing_page_failure_does_not_abort() {
        let mut server = mockito::Server::new_async().await;
        let _landing = server.mock("GET", "/").with_status(503).create_async().await;
        let _api = server
            .mock("GET", "/api/allIndices")
            .with_status(200)
            .with_body(INDICES)
            .create_async()
            .await;

        let quotes = provider(&server).fetch_quotes().await.unwrap();
        assert_eq!(quotes.len(), 2);
    }

    #[tokio::test]
    async fn test_api_rejection_is_bad_status() {
        let mut server = mockito::Server::new_async().await;
        let _landing = server.mock("GET", "/").with_status(200).create_async().await;
        let _api = server
            .mock("GET", "/api/allIndices")
            .with_status(401)
            .create_async()
            .await;

        let err = provider(&server).fetch_quotes().await.unwrap_err();
        assert!(matches!(err, MarketDataError::BadStatus { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_html_instead_of_json_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _landing = server.mock("GET", "/").with_status(200).create_async().await;
        let _api = server
            .mock("GET", "/api/allIndices")
            .with_status(200)
            .with_body("<html>Access Denied</html>")
            .create_async()
            .await;

        let err = provider(&server).fetch_quotes().await.unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedPayload { .. }));
    }
}
