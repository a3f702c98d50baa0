//! Quote provider trait definition.
//!
//! This module defines the `QuoteProvider` trait that every upstream
//! quote source implements.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::Quote;

use super::capabilities::ProviderCapabilities;

/// Trait for upstream quote sources.
///
/// Implement this trait to add a new source. The aggregator only looks at
/// the provider's id, priority and result; merge logic never changes when a
/// provider is added.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use nifsen_market_data::provider::{ProviderCapabilities, QuoteProvider};
///
/// struct MyFeed;
///
/// #[async_trait]
/// impl QuoteProvider for MyFeed {
///     fn id(&self) -> &'static str {
///         "MY_FEED"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities::new(&["NIFTY"])
///     }
///
///     async fn fetch_quotes(&self) -> Result<Vec<Quote>, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "NSE", "YAHOO". Used for logging,
    /// provider reports and diagnostics.
    fn id(&self) -> &'static str;

    /// Provider priority for merging.
    ///
    /// Lower values = higher priority. Default is 10. When two providers
    /// return the same symbol, the quote from the higher-priority provider
    /// is kept.
    fn priority(&self) -> u8 {
        10
    }

    /// Describes which symbols this provider can produce.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Fetch every quote this provider can currently produce.
    ///
    /// Partial results are fine: return whatever subset of symbols the
    /// upstream answered with. Any failure is returned as an error; the
    /// aggregator turns it into "no data from this source".
    async fn fetch_quotes(&self) -> Result<Vec<Quote>, MarketDataError>;
}
