use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use nifsen_market_data::{NewsFeed, DEFAULT_MAX_VARIATION_PCT};
use rust_decimal::Decimal;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Provider ids in registration order: any of `nse`, `bse`, `yahoo`, `simulated`.
    pub providers: Vec<String>,
    pub provider_timeout: Duration,
    /// Always below `request_timeout`, so a degraded answer still goes out as 200.
    pub aggregation_deadline: Duration,
    pub min_live_symbols: usize,
    pub fallback_variation_pct: Decimal,
    pub catalog_path: Option<PathBuf>,
    pub news_timeout: Duration,
    pub news_feeds: Vec<NewsFeed>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            providers: vec!["nse".to_string(), "bse".to_string(), "yahoo".to_string()],
            provider_timeout: Duration::from_millis(8_000),
            aggregation_deadline: Duration::from_millis(15_000),
            min_live_symbols: 2,
            fallback_variation_pct: DEFAULT_MAX_VARIATION_PCT,
            catalog_path: None,
            news_timeout: Duration::from_millis(10_000),
            news_feeds: NewsFeed::defaults(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Unset or unparseable values keep
    /// their defaults, except `NF_LISTEN_ADDR`, which panics when it does not
    /// parse as a socket address.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let listen_addr = lookup("NF_LISTEN_ADDR")
            .map(|v| v.parse().expect("Invalid NF_LISTEN_ADDR"))
            .unwrap_or(defaults.listen_addr);
        let cors_allow = lookup("NF_CORS_ALLOW_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or(defaults.cors_allow);
        let providers = lookup("NF_PROVIDERS")
            .map(|v| {
                split_list(&v)
                    .into_iter()
                    .map(|p| p.to_ascii_lowercase())
                    .collect()
            })
            .unwrap_or(defaults.providers);
        let fallback_variation_pct = lookup("NF_FALLBACK_VARIATION_PCT")
            .and_then(|v| Decimal::from_str(v.trim()).ok())
            .unwrap_or(defaults.fallback_variation_pct);
        let catalog_path = lookup("NF_CATALOG_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let millis = |key: &str, default: Duration| {
            parsed::<u64>(&lookup, key)
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let request_timeout = millis("NF_REQUEST_TIMEOUT_MS", defaults.request_timeout);
        let aggregation_deadline = clamp_deadline(
            millis("NF_AGGREGATION_DEADLINE_MS", defaults.aggregation_deadline),
            request_timeout,
        );

        Self {
            listen_addr,
            cors_allow,
            request_timeout,
            providers,
            provider_timeout: millis("NF_PROVIDER_TIMEOUT_MS", defaults.provider_timeout),
            aggregation_deadline,
            min_live_symbols: parsed(&lookup, "NF_MIN_LIVE_SYMBOLS")
                .unwrap_or(defaults.min_live_symbols),
            fallback_variation_pct,
            catalog_path,
            news_timeout: millis("NF_NEWS_TIMEOUT_MS", defaults.news_timeout),
            news_feeds: defaults.news_feeds,
        }
    }
}

/// Time left for writing the degraded response once the deadline fires.
const RESPONSE_HEADROOM: Duration = Duration::from_millis(500);

/// Keep the aggregation deadline inside the request timeout.
fn clamp_deadline(deadline: Duration, request_timeout: Duration) -> Duration {
    let ceiling = match request_timeout.checked_sub(RESPONSE_HEADROOM) {
        Some(ceiling) if !ceiling.is_zero() => ceiling,
        _ => request_timeout / 2,
    };
    if deadline > ceiling {
        tracing::warn!(
            "Aggregation deadline {:?} exceeds request timeout {:?}, using {:?}",
            deadline,
            request_timeout,
            ceiling
        );
        ceiling
    } else {
        deadline
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
