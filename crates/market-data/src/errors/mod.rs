//! Error types for the market data crate.

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Provider errors never reach the HTTP layer: the aggregator converts them
/// into "no data from this source" and records them in the provider report.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// A provider-specific error occurred (handshake failure, auth expiry, ...).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("Bad status from {provider}: {status}")]
    BadStatus {
        /// The provider that answered
        provider: String,
        /// HTTP status code
        status: u16,
    },

    /// The provider answered but the payload did not have the expected shape.
    #[error("Malformed payload from {provider}: {message}")]
    MalformedPayload {
        /// The provider that answered
        provider: String,
        /// What failed to parse
        message: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request (or the whole aggregation) ran past its deadline.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A quote failed validation.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// The symbol catalog is unusable (empty, duplicate symbols, negative prices).
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Map a non-success HTTP status to the matching error variant.
    pub fn from_status(provider: &str, status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited {
                provider: provider.to_string(),
            }
        } else {
            Self::BadStatus {
                provider: provider.to_string(),
                status: status.as_u16(),
            }
        }
    }

    /// Map a reqwest error, keeping timeouts distinct from other transport errors.
    pub fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::Network(err)
        }
    }
}
