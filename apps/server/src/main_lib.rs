use std::sync::Arc;

use crate::config::Config;
use anyhow::Context;
use nifsen_market_data::{
    AggregatorConfig, BseProvider, Catalog, FallbackGenerator, MarketDataService, NewsService,
    NseProvider, QuoteAggregator, QuoteProvider, SimulatedProvider, YahooProvider,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub market_data: MarketDataService,
    pub news: NewsService,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => Catalog::default(),
    };
    tracing::info!(
        "Catalog in use: {:?}",
        catalog.symbols().collect::<Vec<_>>()
    );

    let providers = build_providers(&config.providers, &catalog)?;

    let fallback =
        FallbackGenerator::new(catalog).with_max_variation(config.fallback_variation_pct);
    let aggregator = QuoteAggregator::new(
        providers,
        fallback,
        AggregatorConfig {
            provider_timeout: config.provider_timeout,
            min_live_symbols: config.min_live_symbols,
        },
    );

    let market_data =
        MarketDataService::new(Arc::new(aggregator)).with_deadline(config.aggregation_deadline);
    let news = NewsService::new(config.news_feeds.clone(), config.news_timeout)?;

    Ok(Arc::new(AppState { market_data, news }))
}

fn build_providers(
    ids: &[String],
    catalog: &Catalog,
) -> anyhow::Result<Vec<Arc<dyn QuoteProvider>>> {
    let mut providers: Vec<Arc<dyn QuoteProvider>> = Vec::with_capacity(ids.len());
    for id in ids {
        let provider: Arc<dyn QuoteProvider> = match id.as_str() {
            "nse" => Arc::new(NseProvider::new()?),
            "bse" => Arc::new(BseProvider::new()?),
            "yahoo" => Arc::new(YahooProvider::new()?),
            "simulated" => Arc::new(SimulatedProvider::new(catalog.clone())),
            other => {
                tracing::warn!("Ignoring unknown provider '{}'", other);
                continue;
            }
        };
        providers.push(provider);
    }
    Ok(providers)
}
