//! Market data models
//!
//! - `quote` - A single symbol's reading (Quote)
//! - `catalog` - The ordered symbol list every response covers (Catalog, CatalogEntry)
//! - `market_status` - Session window and open/closed indicator (MarketSession, MarketStatus)
//! - `envelope` - The endpoint response body (MarketDataResponse)

mod catalog;
mod envelope;
mod market_status;
mod quote;

pub use catalog::{Catalog, CatalogEntry};
pub use envelope::{serialize_millis, MarketDataResponse};
pub use market_status::{MarketSession, MarketStatus};
pub use quote::{Quote, DEFAULT_CURRENCY};
