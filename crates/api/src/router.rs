//! Route table.

use axum::routing::{get, post};
use axum::Router;

use lexd_core::error::CoreError;

use crate::error::AppError;
use crate::handlers::{analysis, stats, tokens};
use crate::state::AppState;

/// Build the route table. Middleware layers are applied by the caller
/// (binary entrypoint or test harness).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(analysis::root))
        .route("/tokenize", post(analysis::tokenize))
        .route("/word-frequency", post(analysis::word_frequency))
        .route("/token/request", post(tokens::request_token))
        .route("/token/delete", post(tokens::delete_token))
        .route("/stats", get(stats::stats).post(stats::stats))
        .fallback(not_found)
}

/// Any unknown path resolves to a JSON 404.
async fn not_found() -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Endpoint" })
}
