//! Synthetic quotes for symbols no live source could provide.
//!
//! Fallback quotes sit within a small random band around the catalog base
//! price and always report `is_open = false`.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{Catalog, CatalogEntry, Quote};

/// Default half-width of the random band, in percent.
pub const DEFAULT_MAX_VARIATION_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

pub struct FallbackGenerator {
    catalog: Catalog,
    max_variation: Decimal,
    rng: Mutex<StdRng>,
}

impl FallbackGenerator {
    /// Generator seeded from OS entropy.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_rng(catalog, StdRng::from_entropy())
    }

    /// Deterministic generator for tests.
    pub fn with_seed(catalog: Catalog, seed: u64) -> Self {
        Self::with_rng(catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Catalog, rng: StdRng) -> Self {
        Self {
            catalog,
            max_variation: DEFAULT_MAX_VARIATION_PCT,
            rng: Mutex::new(rng),
        }
    }

    /// Override the band half-width. Negative values are treated as zero.
    pub fn with_max_variation(mut self, pct: Decimal) -> Self {
        self.max_variation = pct.max(Decimal::ZERO);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn max_variation(&self) -> Decimal {
        self.max_variation
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| {
            warn!("Fallback generator mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Draw a percentage uniformly in `[-max, +max]` at two decimal places.
    fn draw_percent(&self) -> Decimal {
        // Work in hundredths so the draw is exact.
        let bound = (self.max_variation * Decimal::ONE_HUNDRED)
            .trunc()
            .to_i64()
            .unwrap_or(0);
        if bound == 0 {
            return Decimal::ZERO;
        }
        let hundredths = self.lock_rng().gen_range(-bound..=bound);
        Decimal::new(hundredths, 2)
    }

    /// Synthetic quote for one catalog entry.
    pub fn generate(&self, entry: &CatalogEntry) -> Quote {
        let percent = self.draw_percent();
        let change = (entry.base_price * percent / Decimal::ONE_HUNDRED).round_dp(2);
        let price = (entry.base_price + change).max(Decimal::ZERO);

        Quote::new(
            entry.symbol.as_str(),
            entry.name.as_str(),
            price,
            change,
            percent,
            false,
        )
        .with_currency(entry.currency.as_str())
    }

    /// One synthetic quote per catalog entry, in catalog order.
    pub fn generate_all(&self) -> Vec<Quote> {
        self.catalog
            .entries()
            .iter()
            .map(|entry| self.generate(entry))
            .collect()
    }

    /// Synthetic quotes for the catalog symbols absent from `present`, in catalog order.
    pub fn generate_missing<'a>(&self, present: impl IntoIterator<Item = &'a str>) -> Vec<Quote> {
        let present: HashSet<&str> = present.into_iter().collect();
        self.catalog
            .entries()
            .iter()
            .filter(|entry| !present.contains(entry.symbol.as_str()))
            .map(|entry| self.generate(entry))
            .collect()
    }
}
