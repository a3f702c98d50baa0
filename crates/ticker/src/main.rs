use std::sync::Arc;
use std::time::Duration;

use nifsen_ticker::{
    render, HttpMarketDataClient, TickerConfig, TickerPoller, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_POLL_INTERVAL,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_TICKER_URL: &str = "http://localhost:8080/market-data";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let url = std::env::var("NF_TICKER_URL").unwrap_or_else(|_| DEFAULT_TICKER_URL.into());
    let interval = std::env::var("NF_TICKER_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL);

    let client = HttpMarketDataClient::new(url, DEFAULT_FETCH_TIMEOUT)?;
    tracing::info!("Polling {} every {}s", client.url(), interval.as_secs());

    let handle = TickerPoller::mount(Arc::new(client), TickerConfig { interval });
    let mut updates = handle.subscribe();
    println!("{}", render(&handle.state()));

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                println!("{}", render(&state));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.unmount();
    Ok(())
}
