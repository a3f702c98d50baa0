use axum::{body::to_bytes, response::Response, Router};
use nifsen_market_data::NewsFeed;
use nifsen_server::{api::app_router, build_state, config::Config};

/// Config that never reaches the network unless a test opts in.
#[allow(dead_code)]
pub fn offline_config(providers: &[&str], news_feeds: Vec<NewsFeed>) -> Config {
    Config {
        providers: providers.iter().map(|p| p.to_string()).collect(),
        news_feeds,
        ..Config::default()
    }
}

#[allow(dead_code)]
pub async fn app(config: &Config) -> Router {
    let state = build_state(config).await.unwrap();
    app_router(state, config)
}

#[allow(dead_code)]
pub async fn json_body(response: Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
