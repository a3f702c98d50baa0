//! Provider capabilities.

use serde::Serialize;

/// Describes what a quote provider covers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCapabilities {
    /// Catalog symbols the provider can return.
    pub symbols: Vec<String>,

    /// Whether a session handshake (cookie, crumb) precedes the data call.
    pub requires_handshake: bool,
}

impl ProviderCapabilities {
    pub fn new(symbols: &[&str]) -> Self {
        Self {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            requires_handshake: false,
        }
    }

    pub fn with_handshake(mut self) -> Self {
        self.requires_handshake = true;
        self
    }

    pub fn covers(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}
