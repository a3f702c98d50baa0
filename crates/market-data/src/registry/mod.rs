//! Provider orchestration.
//!
//! This module provides:
//! - Concurrent aggregation with per-provider timeouts and panic guards
//! - Quote data validation
//! - Per-provider outcome reports

mod aggregator;
mod report;
mod validator;

pub use aggregator::{
    merge_quotes, Aggregation, AggregatorConfig, QuoteAggregator, DEFAULT_MIN_LIVE_SYMBOLS,
    DEFAULT_PROVIDER_TIMEOUT,
};
pub use report::{summarize, ProviderOutcome, ProviderReport, ProviderStatus};
pub use validator::{QuoteValidator, ValidationIssue, ValidationSeverity, ValidatorConfig};
