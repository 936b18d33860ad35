//! Shared test harness for HTTP-level integration tests.
//!
//! Builds the production route table over a per-test database pool and a
//! real analysis pool, then drives it in-process via `tower::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;

use lexd_analysis::engine::{AnalysisEngine, LexicalEngine};
use lexd_analysis::pool::{AnalysisPool, PoolConfig};
use lexd_api::config::ServerConfig;
use lexd_api::router;
use lexd_api::state::AppState;

/// Admin secret configured for every test app.
pub const TEST_ADMIN_SECRET: &str = "test-admin-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        admin_token: Some(TEST_ADMIN_SECRET.to_string()),
        analysis_workers: 2,
        job_timeout_secs: 5,
    }
}

/// Build the application router with the built-in engine.
///
/// Mirrors the router construction in `main.rs` (minus network-level
/// layers irrelevant in-process) so integration tests exercise the same
/// routes, extractors, and error mapping that production uses.
pub fn build_test_app(pool: SqlitePool) -> Router {
    let config = test_config();
    let pool_config = config.pool_config();
    build_test_app_with(pool, Arc::new(LexicalEngine::new()), pool_config)
}

/// Build the application router over an injected engine and pool sizing.
///
/// Lets failure-path tests substitute slow or failing engines.
pub fn build_test_app_with(
    pool: SqlitePool,
    engine: Arc<dyn AnalysisEngine>,
    pool_config: PoolConfig,
) -> Router {
    let config = test_config();
    let analysis = Arc::new(AnalysisPool::start(engine, pool_config));

    let state = AppState {
        pool,
        config: Arc::new(config),
        analysis,
    };

    router::routes()
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without credentials.
pub async fn get(app: &Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("request must build");
    app.clone().oneshot(request).await.expect("app must respond")
}

/// Send a GET request with a bearer credential.
pub async fn get_auth(app: &Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request must build");
    app.clone().oneshot(request).await.expect("app must respond")
}

/// Send a JSON POST without credentials.
pub async fn post_json(app: &Router, path: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request must build");
    app.clone().oneshot(request).await.expect("app must respond")
}

/// Send a JSON POST with a bearer credential.
pub async fn post_json_auth(
    app: &Router,
    path: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request must build");
    app.clone().oneshot(request).await.expect("app must respond")
}

/// Send a POST with a raw (possibly malformed) body.
pub async fn post_raw_auth(
    app: &Router,
    path: &str,
    body: &str,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request must build");
    app.clone().oneshot(request).await.expect("app must respond")
}

/// Send a bodyless POST with a bearer credential.
pub async fn post_auth(app: &Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request must build");
    app.clone().oneshot(request).await.expect("app must respond")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body must collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body must be JSON")
}
