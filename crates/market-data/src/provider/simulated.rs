//! Simulated quote feed for demos and local development.
//!
//! Each symbol takes a small random step on every fetch, scaled by its
//! catalog volatility. Change figures are measured against the catalog
//! base price, so the feed looks like a trading session that opened there.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{Catalog, Quote};
use crate::provider::{round2, ProviderCapabilities, QuoteProvider};

const PROVIDER_ID: &str = "SIMULATED";

/// A single step moves at most this fraction of the entry's volatility.
const STEP_FRACTION: f64 = 0.1;

struct WalkState {
    rng: StdRng,
    levels: HashMap<String, Decimal>,
}

pub struct SimulatedProvider {
    catalog: Catalog,
    state: Mutex<WalkState>,
}

impl SimulatedProvider {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_rng(catalog, StdRng::from_entropy())
    }

    pub fn with_seed(catalog: Catalog, seed: u64) -> Self {
        Self::with_rng(catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Catalog, rng: StdRng) -> Self {
        let levels = catalog
            .entries()
            .iter()
            .map(|e| (e.symbol.clone(), e.base_price))
            .collect();
        Self {
            catalog,
            state: Mutex::new(WalkState { rng, levels }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, WalkState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Simulated feed mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Advance every symbol one step and return the new readings.
    fn step(&self) -> Vec<Quote> {
        let mut state = self.lock_state();
        let WalkState { rng, levels } = &mut *state;

        self.catalog
            .entries()
            .iter()
            .map(|entry| {
                let max_step = entry.volatility.to_f64().unwrap_or(0.0) * STEP_FRACTION;
                let step_pct = if max_step > 0.0 {
                    rng.gen_range(-max_step..=max_step)
                } else {
                    0.0
                };
                let step_pct = Decimal::from_f64(step_pct).unwrap_or(Decimal::ZERO);

                let level = levels
                    .entry(entry.symbol.clone())
                    .or_insert(entry.base_price);
                let next = (*level + *level * step_pct / Decimal::ONE_HUNDRED).max(Decimal::ZERO);
                *level = next;

                let price = round2(next);
                let change = round2(price - entry.base_price);
                let change_percent = if entry.base_price.is_zero() {
                    Decimal::ZERO
                } else {
                    round2(change * Decimal::ONE_HUNDRED / entry.base_price)
                };

                Quote::new(
                    entry.symbol.as_str(),
                    entry.name.as_str(),
                    price,
                    change,
                    change_percent,
                    true,
                )
                .with_currency(entry.currency.as_str())
            })
            .collect()
    }
}

#[async_trait]
impl QuoteProvider for SimulatedProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        50
    }

    fn capabilities(&self) -> ProviderCapabilities {
        let symbols: Vec<&str> = self.catalog.symbols().collect();
        ProviderCapabilities::new(&symbols)
    }

    async fn fetch_quotes(&self) -> Result<Vec<Quote>, MarketDataError> {
        Ok(self.step())
    }
}
