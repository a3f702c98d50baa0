//! NIFSEN Market Data Crate
//!
//! Aggregates index and commodity quotes for the NIFSEN ticker from several
//! upstream sources and always answers with a complete quote list.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Multiple providers: NSE, BSE, Yahoo Finance and a simulated feed
//! - Concurrent fetching with per-provider timeouts and panic guards
//! - Quote validation at the merge boundary
//! - Randomized fallback quotes for anything no provider delivered
//! - Market news from public RSS feeds
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | MarketDataService|  (envelope, deadline, market status)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! | QuoteAggregator  | --> | QuoteValidator   |
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! | QuoteProvider x N|  (NSE, BSE, Yahoo, simulated)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  merge_quotes    | --> | FallbackGenerator|  (fills gaps)
//! +------------------+     +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Quote`] - One instrument's price, change and session flag
//! - [`Catalog`] - The fixed, ordered list of symbols every response covers
//! - [`MarketDataResponse`] - The JSON envelope served to clients
//! - [`QuoteAggregator`] - Runs providers and composes the quote list

pub mod errors;
pub mod fallback;
pub mod models;
pub mod news;
pub mod provider;
pub mod registry;
pub mod service;

pub use errors::MarketDataError;
pub use fallback::{FallbackGenerator, DEFAULT_MAX_VARIATION_PCT};

pub use models::{
    Catalog, CatalogEntry, MarketDataResponse, MarketSession, MarketStatus, Quote,
    DEFAULT_CURRENCY,
};

pub use news::{NewsFeed, NewsItem, NewsResponse, NewsService};

// Re-export provider types
pub use provider::bse::BseProvider;
pub use provider::nse::NseProvider;
pub use provider::simulated::SimulatedProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{ProviderCapabilities, QuoteProvider};

// Re-export registry types
pub use registry::{
    Aggregation, AggregatorConfig, ProviderOutcome, ProviderReport, ProviderStatus,
    QuoteAggregator, QuoteValidator, ValidationSeverity,
};

pub use service::{MarketDataService, DEGRADED_WARNING, ESTIMATED_WARNING};
