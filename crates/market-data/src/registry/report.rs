//! Per-provider outcome tracking for aggregation diagnostics.

use serde::Serialize;

/// What happened to one provider during an aggregation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ProviderOutcome {
    /// The provider answered; `quotes` counts what it returned before merging.
    Succeeded { quotes: usize },
    /// The provider returned an error or panicked.
    Failed { message: String },
    /// The provider did not answer in time.
    TimedOut,
}

/// Record of a single provider during one aggregation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderReport {
    pub provider: &'static str,
    #[serde(flatten)]
    pub outcome: ProviderOutcome,
    pub elapsed_ms: u64,
}

impl ProviderReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProviderOutcome::Succeeded { .. })
    }
}

/// Summary for logging, e.g. `NSE: OK(2) | BSE: ERROR(Bad status from BSE: 503) | YAHOO: TIMEOUT`.
pub fn summarize(reports: &[ProviderReport]) -> String {
    reports
        .iter()
        .map(|r| match &r.outcome {
            ProviderOutcome::Succeeded { quotes } => format!("{}: OK({})", r.provider, quotes),
            ProviderOutcome::Failed { message } => format!("{}: ERROR({})", r.provider, message),
            ProviderOutcome::TimedOut => format!("{}: TIMEOUT", r.provider),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Registration of one provider, for the diagnostics route.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub id: &'static str,
    pub priority: u8,
    pub symbols: Vec<String>,
    /// Whether a fetch needs a cookie or crumb exchange first
    pub requires_handshake: bool,
}
