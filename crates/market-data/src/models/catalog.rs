//! The fixed list of symbols every response must cover.
//!
//! Catalog order doubles as display priority: the aggregator sorts its
//! final quote list by the position of each symbol in the catalog.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quote::{Quote, DEFAULT_CURRENCY};
use crate::errors::MarketDataError;

/// Reference data for one symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub symbol: String,
    pub name: String,
    /// Seed level for synthetic quotes
    pub base_price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Typical daily swing in percent, used by the simulated feed
    #[serde(default = "default_volatility")]
    pub volatility: Decimal,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_volatility() -> Decimal {
    Decimal::new(5, 1)
}

impl CatalogEntry {
    pub fn new(
        symbol: &str,
        name: &str,
        base_price: Decimal,
        currency: &str,
        volatility: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            base_price,
            currency: currency.to_string(),
            volatility,
        }
    }
}

/// Ordered, validated symbol catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists, duplicate symbols and negative base prices.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, MarketDataError> {
        if entries.is_empty() {
            return Err(MarketDataError::InvalidCatalog(
                "catalog has no entries".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.symbol.trim().is_empty() {
                return Err(MarketDataError::InvalidCatalog(
                    "catalog entry with empty symbol".to_string(),
                ));
            }
            if !seen.insert(entry.symbol.as_str()) {
                return Err(MarketDataError::InvalidCatalog(format!(
                    "duplicate symbol {}",
                    entry.symbol
                )));
            }
            if entry.base_price < Decimal::ZERO {
                return Err(MarketDataError::InvalidCatalog(format!(
                    "negative base price for {}",
                    entry.symbol
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Parse a JSON array of entries.
    pub fn from_json_str(json: &str) -> Result<Self, MarketDataError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)
            .map_err(|e| MarketDataError::InvalidCatalog(e.to_string()))?;
        Self::new(entries)
    }

    /// Load a JSON catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MarketDataError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            MarketDataError::InvalidCatalog(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    /// Position of a symbol in display order.
    pub fn position(&self, symbol: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.symbol == symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.symbol.as_str())
    }

    /// Sort quotes into catalog order. Unknown symbols go last, keeping their relative order.
    pub fn sort_quotes(&self, quotes: &mut [Quote]) {
        quotes.sort_by_key(|q| self.position(&q.symbol).unwrap_or(usize::MAX));
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let entries = vec![
            CatalogEntry::new("NIFTY", "Nifty 50", Decimal::new(23250, 0), "₹", Decimal::new(8, 1)),
            CatalogEntry::new("SENSEX", "Sensex", Decimal::new(81500, 0), "₹", Decimal::new(75, 2)),
            CatalogEntry::new("BANKNIFTY", "Bank Nifty", Decimal::new(49200, 0), "₹", Decimal::new(12, 1)),
            CatalogEntry::new("NASDAQ", "Nasdaq", Decimal::new(19850, 0), "$", Decimal::new(9, 1)),
            CatalogEntry::new("DOW", "Dow Jones", Decimal::new(43200, 0), "$", Decimal::new(6, 1)),
            CatalogEntry::new("GOLD", "Gold", Decimal::new(78500, 0), "₹", Decimal::new(4, 1)),
            CatalogEntry::new("SILVER", "Silver", Decimal::new(89200, 0), "₹", Decimal::new(7, 1)),
            CatalogEntry::new("CRUDE", "Crude Oil", Decimal::new(6150, 0), "₹", Decimal::new(15, 1)),
        ];
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_catalog_order() {
        let catalog = Catalog::default();
        let symbols: Vec<_> = catalog.symbols().collect();
        assert_eq!(
            symbols,
            vec!["NIFTY", "SENSEX", "BANKNIFTY", "NASDAQ", "DOW", "GOLD", "SILVER", "CRUDE"]
        );
        assert_eq!(catalog.position("BANKNIFTY"), Some(2));
        assert_eq!(catalog.position("FTSE"), None);
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = Catalog::default();
        assert!(Catalog::new(catalog.entries().to_vec()).is_ok());
    }

    #[test]
    fn test_rejects_empty_catalog() {
        assert!(matches!(
            Catalog::new(vec![]),
            Err(MarketDataError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_symbols() {
        let entries = vec![
            CatalogEntry::new("NIFTY", "Nifty 50", dec!(23250), "₹", dec!(0.8)),
            CatalogEntry::new("NIFTY", "Nifty again", dec!(23000), "₹", dec!(0.8)),
        ];
        let err = Catalog::new(entries).unwrap_err();
        assert!(err.to_string().contains("duplicate symbol NIFTY"));
    }

    #[test]
    fn test_rejects_negative_base_price() {
        let entries = vec![CatalogEntry::new("CRUDE", "Crude Oil", dec!(-1), "₹", dec!(1.5))];
        assert!(Catalog::new(entries).is_err());
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let catalog = Catalog::from_json_str(
            r#"[{"symbol":"NIFTY","name":"Nifty 50","basePrice":23250},
                {"symbol":"DOW","name":"Dow Jones","basePrice":43200,"currency":"$","volatility":0.6}]"#,
        )
        .unwrap();

        let nifty = catalog.get("NIFTY").unwrap();
        assert_eq!(nifty.currency, "₹");
        assert_eq!(nifty.volatility, dec!(0.5));
        assert_eq!(catalog.get("DOW").unwrap().currency, "$");
    }

    #[test]
    fn test_sort_quotes_uses_catalog_order() {
        let catalog = Catalog::default();
        let mut quotes = vec![
            Quote::new("CRUDE", "Crude Oil", dec!(6150), dec!(0), dec!(0), false),
            Quote::new("NIFTY", "Nifty 50", dec!(23250), dec!(0), dec!(0), false),
            Quote::new("DOW", "Dow Jones", dec!(43200), dec!(0), dec!(0), false),
        ];
        catalog.sort_quotes(&mut quotes);
        let order: Vec<_> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(order, vec!["NIFTY", "DOW", "CRUDE"]);
    }
}
