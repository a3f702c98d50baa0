//! BSE (Bombay Stock Exchange) provider for the SENSEX index.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{MarketSession, Quote};
use crate::provider::headers::bse_headers;
use crate::provider::{
    http_client, read_json, round2, ProviderCapabilities, QuoteProvider, DEFAULT_REQUEST_TIMEOUT,
};

use models::BseIndexRow;

pub const BSE_BASE_URL: &str = "https://api.bseindia.com";
const PROVIDER_ID: &str = "BSE";
const SENSEX_PATH: &str = "/BseIndiaAPI/api/GetSensexData/w";

pub struct BseProvider {
    client: Client,
    base_url: String,
    session: MarketSession,
}

impl BseProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_base_url(BSE_BASE_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, MarketDataError> {
        Ok(Self {
            client: http_client(PROVIDER_ID, bse_headers(), timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: MarketSession::nse(),
        })
    }
}

#[async_trait]
impl QuoteProvider for BseProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new(&["SENSEX"])
    }

    async fn fetch_quotes(&self) -> Result<Vec<Quote>, MarketDataError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, SENSEX_PATH))
            .send()
            .await
            .map_err(|e| MarketDataError::from_transport(PROVIDER_ID, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::from_status(PROVIDER_ID, status));
        }

        let rows: Vec<BseIndexRow> = read_json(PROVIDER_ID, response).await?;

        let Some(row) = rows.iter().find(|row| row.is_sensex()) else {
            debug!("BSE payload had {} rows but no SENSEX", rows.len());
            return Ok(Vec::new());
        };

        // A row without a price is not a reading.
        let Some(last) = row.last else {
            return Err(MarketDataError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: "SENSEX row has no last traded price".to_string(),
            });
        };

        let quote = Quote::new(
            "SENSEX",
            "Sensex",
            round2(last),
            round2(row.change.unwrap_or(Decimal::ZERO)),
            round2(row.percent_change.unwrap_or(Decimal::ZERO)),
            self.session.is_open_at(Utc::now()),
        );
        Ok(vec![quote])
    }
}
