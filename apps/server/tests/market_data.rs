mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use nifsen_market_data::{DEGRADED_WARNING, ESTIMATED_WARNING};
use tower::ServiceExt;

const SYMBOLS: [&str; 8] = [
    "NIFTY", "SENSEX", "BANKNIFTY", "NASDAQ", "DOW", "GOLD", "SILVER", "CRUDE",
];

fn symbols(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["symbol"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn get_without_providers_serves_estimated_catalog() {
    let config = common::offline_config(&[], Vec::new());
    let app = common::app(&config).await;

    let response = app
        .oneshot(Request::builder().uri("/market-data").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let json = common::json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["isLive"], false);
    assert_eq!(json["warning"], ESTIMATED_WARNING);
    assert_ne!(json["warning"], DEGRADED_WARNING);
    assert_eq!(symbols(&json), SYMBOLS);
    assert!(json["marketStatus"] == "open" || json["marketStatus"] == "closed");

    let timestamp = json["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());

    for quote in json["data"].as_array().unwrap() {
        assert_eq!(quote["isOpen"], false);
        assert!(quote["price"].as_f64().unwrap() >= 0.0);
    }
}

#[tokio::test]
async fn post_behaves_like_get() {
    let config = common::offline_config(&["simulated"], Vec::new());
    let app = common::app(&config).await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/market-data")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["isLive"], true);
    assert!(json.get("warning").is_none());
    assert_eq!(json["marketStatus"], "open");
    assert_eq!(symbols(&json), SYMBOLS);
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let config = common::offline_config(&[], Vec::new());
    let app = common::app(&config).await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/market-data")
                .header(header::ORIGIN, "https://nifsen.in")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(
                    header::ACCESS_CONTROL_REQUEST_HEADERS,
                    "authorization, x-client-info, apikey, content-type",
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let allowed_headers = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .to_string();
    for name in ["authorization", "x-client-info", "apikey", "content-type", "x-supabase-client-platform"] {
        assert!(allowed_headers.contains(name), "missing {}", name);
    }

    let allowed_methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    for method in ["GET", "POST", "OPTIONS"] {
        assert!(allowed_methods.contains(method));
    }
}

#[tokio::test]
async fn bare_options_is_ok_with_empty_body() {
    let config = common::offline_config(&[], Vec::new());
    let app = common::app(&config).await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/market-data")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn simple_request_gets_allow_origin() {
    let config = common::offline_config(&[], Vec::new());
    let app = common::app(&config).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/market-data")
                .header(header::ORIGIN, "https://nifsen.in")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn provider_diagnostics() {
    let config = common::offline_config(&["simulated", "bogus"], Vec::new());
    let app = common::app(&config).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/market-data/providers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::json_body(response).await;
    let providers = json.as_array().unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0]["id"], "SIMULATED");
    assert_eq!(providers[0]["priority"], 50);
    assert_eq!(providers[0]["requiresHandshake"], false);
    assert!(providers[0].get("state").is_none());
    assert_eq!(providers[0]["symbols"].as_array().unwrap().len(), 8);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/market-data/providers/simulated")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/market-data/providers/nse")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = common::json_body(response).await;
    assert_eq!(json["code"], 404);
    assert_eq!(json["message"], "Unknown provider: nse");
}
