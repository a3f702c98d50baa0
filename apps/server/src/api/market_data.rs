use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use nifsen_market_data::{MarketDataResponse, ProviderStatus};

/// Current quotes. Always 200: failures surface as `isLive: false` and a warning.
async fn get_market_data(State(state): State<Arc<AppState>>) -> Json<MarketDataResponse> {
    Json(state.market_data.snapshot().await)
}

/// Bare OPTIONS requests. Preflights carrying CORS headers are answered by the CORS layer.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn list_providers(State(state): State<Arc<AppState>>) -> Json<Vec<ProviderStatus>> {
    Json(state.market_data.provider_statuses())
}

async fn get_provider(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ProviderStatus>> {
    state
        .market_data
        .provider_statuses()
        .into_iter()
        .find(|p| p.id.eq_ignore_ascii_case(&id))
        .map(Json)
        .ok_or(ApiError::UnknownProvider(id))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/market-data",
            get(get_market_data)
                .post(get_market_data)
                .options(preflight),
        )
        .route("/market-data/providers", get(list_providers))
        .route("/market-data/providers/{id}", get(get_provider))
}
