//! Integration tests for `GET /api/locations/nearest`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, test_config, test_pool};

const UNUSED_UPSTREAM: &str = "http://127.0.0.1:9";

#[tokio::test]
async fn test_nearest_city() {
    let app = build_test_app(test_pool().await, test_config(UNUSED_UPSTREAM), None);

    let response = get(&app, "/api/locations/nearest?lat=40.42&lon=-3.70").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["code"], "28079");
    assert_eq!(json["data"]["name"], "Madrid");
    assert_eq!(json["data"]["timezone"], "Europe/Madrid");
    assert!(json["data"]["distance_km"].as_f64().unwrap() < 1.0);
}

#[tokio::test]
async fn test_nearest_city_rejects_bad_coordinates() {
    let app = build_test_app(test_pool().await, test_config(UNUSED_UPSTREAM), None);

    let response = get(&app, "/api/locations/nearest?lat=95&lon=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = get(&app, "/api/locations/nearest?lat=40.4").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
