use nifsen_market_data::MarketDataResponse;

/// What the ticker currently knows.
#[derive(Clone, Debug, PartialEq)]
pub enum TickerState {
    /// Nothing to show yet, or a manual retry is in flight.
    Loading,
    /// The most recent poll succeeded.
    Ready(MarketDataResponse),
    /// The most recent poll failed. `last` keeps the previous good snapshot, if any.
    Failed {
        message: String,
        last: Option<MarketDataResponse>,
    },
}

impl TickerState {
    pub fn is_loading(&self) -> bool {
        matches!(self, TickerState::Loading)
    }

    /// The newest snapshot available, even when the latest poll failed.
    pub fn snapshot(&self) -> Option<&MarketDataResponse> {
        match self {
            TickerState::Ready(snapshot) => Some(snapshot),
            TickerState::Failed { last, .. } => last.as_ref(),
            TickerState::Loading => None,
        }
    }
}
