use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{extract::State, routing::get, Json, Router};
use nifsen_market_data::NewsResponse;

/// Latest market headlines, or the static list when no feed is reachable.
async fn get_stock_news(State(state): State<Arc<AppState>>) -> Json<NewsResponse> {
    Json(state.news.latest().await)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/stock-news", get(get_stock_news))
}
