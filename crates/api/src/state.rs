use std::sync::Arc;

use lexd_analysis::pool::AnalysisPool;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (the token store).
    pub pool: lexd_db::DbPool,
    /// Server configuration (admin secret, pool sizing).
    pub config: Arc<ServerConfig>,
    /// Admission controller in front of the analysis engine.
    pub analysis: Arc<AnalysisPool>,
}
