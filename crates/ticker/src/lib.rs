//! NIFSEN ticker client.
//!
//! Polls the market data endpoint on a fixed interval and renders the
//! result as a loading line, an error with a retry action, or a looping
//! marquee of quotes.

pub mod client;
pub mod error;
pub mod poller;
pub mod presenter;
pub mod state;

pub use client::{HttpMarketDataClient, MarketDataSource, DEFAULT_FETCH_TIMEOUT};
pub use error::TickerError;
pub use poller::{TickerConfig, TickerHandle, TickerPoller, DEFAULT_POLL_INTERVAL};
pub use presenter::{render, TickerItem, TickerView, Trend};
pub use state::TickerState;
