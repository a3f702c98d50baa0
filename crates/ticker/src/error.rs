use thiserror::Error;

/// Why a poll produced no snapshot.
#[derive(Error, Debug)]
pub enum TickerError {
    /// The endpoint could not be reached.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Market data endpoint returned status {status}")]
    Status { status: u16 },

    /// The body was not a market data envelope.
    #[error("Invalid market data response: {0}")]
    Decode(String),
}
