//! Envelope-producing market data service.
//!
//! Wraps one aggregation in the response envelope. Nothing here returns an
//! error: when the aggregation itself breaks (panic, deadline) the caller
//! still gets a complete, clearly marked fallback list.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, warn};

use crate::models::{MarketDataResponse, MarketSession};
use crate::registry::{ProviderStatus, QuoteAggregator};

/// Default bound on a whole aggregation.
pub const DEFAULT_AGGREGATION_DEADLINE: Duration = Duration::from_secs(15);

/// Warning attached when the aggregation could not complete.
pub const DEGRADED_WARNING: &str = "Using cached market data";

/// Warning attached when too few symbols came from live sources.
pub const ESTIMATED_WARNING: &str = "Live market data unavailable; showing estimated values";

#[derive(Clone)]
pub struct MarketDataService {
    aggregator: Arc<QuoteAggregator>,
    session: MarketSession,
    deadline: Duration,
}

impl MarketDataService {
    pub fn new(aggregator: Arc<QuoteAggregator>) -> Self {
        Self {
            aggregator,
            session: MarketSession::nse(),
            deadline: DEFAULT_AGGREGATION_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_session(mut self, session: MarketSession) -> Self {
        self.session = session;
        self
    }

    pub fn aggregator(&self) -> &QuoteAggregator {
        &self.aggregator
    }

    pub fn provider_statuses(&self) -> Vec<ProviderStatus> {
        self.aggregator.provider_statuses()
    }

    /// Produce a response envelope for the current moment.
    pub async fn snapshot(&self) -> MarketDataResponse {
        let aggregator = Arc::clone(&self.aggregator);
        let mut task = tokio::spawn(async move { aggregator.aggregate().await });

        match tokio::time::timeout(self.deadline, &mut task).await {
            Ok(Ok(aggregation)) => {
                let now = Utc::now();
                let status = self.session.resolve(now, aggregation.live_quotes());
                let response =
                    MarketDataResponse::new(aggregation.quotes, now, aggregation.is_live, status);
                if aggregation.is_live {
                    response
                } else {
                    response.with_warning(ESTIMATED_WARNING)
                }
            }
            Ok(Err(join_error)) => {
                error!("Market data aggregation task failed: {}", join_error);
                self.degraded()
            }
            Err(_) => {
                task.abort();
                warn!(
                    "Market data aggregation exceeded {}ms, serving fallback",
                    self.deadline.as_millis()
                );
                self.degraded()
            }
        }
    }

    /// Full fallback envelope, used when the aggregation could not complete.
    fn degraded(&self) -> MarketDataResponse {
        let now = Utc::now();
        MarketDataResponse::new(
            self.aggregator.fallback().generate_all(),
            now,
            false,
            self.session.status_at(now),
        )
        .with_warning(DEGRADED_WARNING)
    }
}
