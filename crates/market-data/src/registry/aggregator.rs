//! Concurrent multi-provider aggregation.
//!
//! One aggregation calls every registered provider, waits for all of them, merges their quotes in priority order and fills whatever
//! is still missing from the fallback generator. The result always covers
//! the full catalog, in catalog order.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use log::{debug, info, warn};
use tokio::time::Instant;

use crate::errors::MarketDataError;
use crate::fallback::FallbackGenerator;
use crate::models::{Catalog, Quote};
use crate::provider::QuoteProvider;

use super::report::{summarize, ProviderOutcome, ProviderReport, ProviderStatus};
use super::validator::QuoteValidator;

/// Default per-provider timeout.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(8);

/// Default number of live symbols needed for a response to count as live.
pub const DEFAULT_MIN_LIVE_SYMBOLS: usize = 2;

#[derive(Clone, Debug)]
pub struct AggregatorConfig {
    /// Upper bound on a single provider call, handshake included.
    pub provider_timeout: Duration,
    /// Live symbols required for `is_live`. Values below 1 are treated as 1.
    pub min_live_symbols: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            min_live_symbols: DEFAULT_MIN_LIVE_SYMBOLS,
        }
    }
}

/// Result of one aggregation.
#[derive(Clone, Debug)]
pub struct Aggregation {
    /// One quote per catalog symbol, in catalog order.
    pub quotes: Vec<Quote>,
    /// Symbols whose quote came from a provider rather than the fallback generator.
    pub live_symbols: Vec<String>,
    /// One entry per registered provider, in priority order.
    pub reports: Vec<ProviderReport>,
    pub is_live: bool,
}

impl Aggregation {
    /// Quotes that came from a live source.
    pub fn live_quotes(&self) -> impl Iterator<Item = &Quote> {
        self.quotes
            .iter()
            .filter(|q| self.live_symbols.iter().any(|s| *s == q.symbol))
    }
}

pub struct QuoteAggregator {
    /// Sorted by priority; equal priorities keep registration order.
    providers: Vec<Arc<dyn QuoteProvider>>,
    fallback: FallbackGenerator,
    validator: QuoteValidator,
    config: AggregatorConfig,
}

impl QuoteAggregator {
    pub fn new(
        mut providers: Vec<Arc<dyn QuoteProvider>>,
        fallback: FallbackGenerator,
        config: AggregatorConfig,
    ) -> Self {
        // sort_by_key is stable
        providers.sort_by_key(|p| p.priority());

        info!(
            "Quote aggregator initialized with providers: {:?}",
            providers.iter().map(|p| p.id()).collect::<Vec<_>>()
        );

        Self {
            providers,
            fallback,
            validator: QuoteValidator::new(),
            config,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.fallback.catalog()
    }

    pub fn fallback(&self) -> &FallbackGenerator {
        &self.fallback
    }

    /// Registration of every provider, in priority order.
    pub fn provider_statuses(&self) -> Vec<ProviderStatus> {
        self.providers
            .iter()
            .map(|p| {
                let capabilities = p.capabilities();
                ProviderStatus {
                    id: p.id(),
                    priority: p.priority(),
                    symbols: capabilities.symbols,
                    requires_handshake: capabilities.requires_handshake,
                }
            })
            .collect()
    }

    /// Run every provider concurrently and compose the full quote list.
    pub async fn aggregate(&self) -> Aggregation {
        let calls = self
            .providers
            .iter()
            .map(|provider| settle(Arc::clone(provider), self.config.provider_timeout));
        let settled = join_all(calls).await;

        let mut reports = Vec::with_capacity(self.providers.len());
        let mut batches: Vec<Vec<Quote>> = Vec::with_capacity(self.providers.len());

        // join_all keeps input order, so results line up with providers
        for (provider, (result, elapsed)) in self.providers.iter().zip(settled) {
            let id = provider.id();
            let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

            let outcome = match result {
                Ok(quotes) => {
                    let outcome = ProviderOutcome::Succeeded {
                        quotes: quotes.len(),
                    };
                    batches.push(quotes);
                    outcome
                }
                Err(err) => {
                    warn!("Provider {} failed: {}", id, err);
                    match err {
                        MarketDataError::Timeout { .. } => ProviderOutcome::TimedOut,
                        other => ProviderOutcome::Failed {
                            message: other.to_string(),
                        },
                    }
                }
            };

            reports.push(ProviderReport {
                provider: id,
                outcome,
                elapsed_ms,
            });
        }

        let live = merge_quotes(self.catalog(), &self.validator, batches);
        let live_symbols: Vec<String> = live.iter().map(|q| q.symbol.clone()).collect();

        let mut quotes = live;
        quotes.extend(
            self.fallback
                .generate_missing(live_symbols.iter().map(String::as_str)),
        );
        self.catalog().sort_quotes(&mut quotes);

        let is_live = live_symbols.len() >= self.config.min_live_symbols.max(1);

        info!(
            "Aggregated {} quotes ({} live, is_live={}): {}",
            quotes.len(),
            live_symbols.len(),
            is_live,
            summarize(&reports)
        );

        Aggregation {
            quotes,
            live_symbols,
            reports,
            is_live,
        }
    }
}

/// Call one provider with a timeout and a panic guard. Never panics, never hangs.
async fn settle(
    provider: Arc<dyn QuoteProvider>,
    timeout: Duration,
) -> (Result<Vec<Quote>, MarketDataError>, Duration) {
    let started = Instant::now();
    let guarded = AssertUnwindSafe(provider.fetch_quotes()).catch_unwind();

    let result = match tokio::time::timeout(timeout, guarded).await {
        Ok(Ok(result)) => result,
        Ok(Err(_panic)) => Err(MarketDataError::ProviderError {
            provider: provider.id().to_string(),
            message: "provider panicked".to_string(),
        }),
        Err(_elapsed) => Err(MarketDataError::Timeout {
            provider: provider.id().to_string(),
        }),
    };

    (result, started.elapsed())
}

/// Merge provider batches, given in priority order, into one live quote list.
///
/// Quotes that fail validation or name a symbol outside the catalog are
/// dropped. The first occurrence of a symbol wins. Output order follows the
/// input; callers sort afterwards.
pub fn merge_quotes(
    catalog: &Catalog,
    validator: &QuoteValidator,
    batches: impl IntoIterator<Item = Vec<Quote>>,
) -> Vec<Quote> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for quote in batches.into_iter().flatten() {
        if !catalog.contains(&quote.symbol) {
            debug!("Dropping {}: not in catalog", quote.symbol);
            continue;
        }
        if seen.contains(&quote.symbol) {
            continue;
        }
        if let Err(err) = validator.validate(&quote) {
            warn!("Dropping quote: {}", err);
            continue;
        }
        seen.insert(quote.symbol.clone());
        merged.push(quote);
    }

    merged
}
