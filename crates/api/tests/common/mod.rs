//! Shared helpers for the API integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use aeris_api::config::ServerConfig;
use aeris_api::router::build_app_router;
use aeris_api::state::AppState;
use aeris_core::source::SourceKind;
use aeris_db::DbPool;
use aeris_push::VapidSigner;
use aeris_upstream::UpstreamConfig;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

const VAPID_PRIVATE_PEM: &str = include_str!("../../../push/tests/fixtures/vapid_private.pem");
pub const VAPID_PUBLIC_KEY: &str = include_str!("../../../push/tests/fixtures/vapid_public.txt");

/// In-memory database with migrations applied.
pub async fn test_pool() -> DbPool {
    let pool = aeris_db::create_pool("sqlite::memory:")
        .await
        .expect("in-memory pool");
    aeris_db::run_migrations(&pool).await.expect("migrations");
    pool
}

/// Config with every upstream service pointed at `upstream_base`.
pub fn test_config(upstream_base: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/public")),
        cache_ttl_secs: 300,
        cache_retention_hours: 24,
        sources: vec![SourceKind::OpenMeteo],
        upstream: UpstreamConfig::with_base_url(upstream_base),
        push: None,
        rain_check_interval_secs: 900,
        notify_cooldown_secs: 3600,
    }
}

pub fn test_signer() -> Arc<VapidSigner> {
    Arc::new(
        VapidSigner::from_pem(
            VAPID_PRIVATE_PEM.as_bytes(),
            VAPID_PUBLIC_KEY,
            "mailto:ops@aeris.test",
        )
        .expect("fixture key"),
    )
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(
    pool: DbPool,
    config: ServerConfig,
    vapid: Option<Arc<VapidSigner>>,
) -> Router {
    let http = aeris_upstream::http::build_client(&config.upstream).expect("http client");
    let state = AppState::new(pool, config.clone(), http, vapid);
    build_app_router(state, &config)
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: &Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
