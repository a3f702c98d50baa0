//! Market data endpoint client.

use std::time::Duration;

use async_trait::async_trait;
use nifsen_market_data::MarketDataResponse;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

use crate::error::TickerError;

/// Default request timeout for one poll.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Anything that can produce a market data envelope.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch(&self) -> Result<MarketDataResponse, TickerError>;
}

/// Polls the HTTP endpoint with a plain GET.
pub struct HttpMarketDataClient {
    client: Client,
    url: String,
}

impl HttpMarketDataClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TickerError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MarketDataSource for HttpMarketDataClient {
    async fn fetch(&self) -> Result<MarketDataResponse, TickerError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TickerError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TickerError::Decode(e.to_string()))
    }
}
