use std::time::Duration;

use lexd_analysis::pool::{PoolConfig, DEFAULT_JOB_TIMEOUT, DEFAULT_WORKERS};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// The default `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Admin secret credential. When set, a bearer credential equal to it
    /// classifies as admin without a token-store lookup. Never stored.
    pub admin_token: Option<String>,
    /// Number of concurrent analysis worker slots (default: `5`).
    pub analysis_workers: usize,
    /// Per-job execution deadline in seconds (default: `180`).
    pub job_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default   |
    /// |--------------------|-----------|
    /// | `HOST`             | `0.0.0.0` |
    /// | `PORT`             | `8000`    |
    /// | `CORS_ORIGINS`     | `*`       |
    /// | `ADMIN_TOKEN`      | unset     |
    /// | `ANALYSIS_WORKERS` | `5`       |
    /// | `JOB_TIMEOUT_SECS` | `180`     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let admin_token = std::env::var("ADMIN_TOKEN")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let analysis_workers: usize = std::env::var("ANALYSIS_WORKERS")
            .unwrap_or_else(|_| DEFAULT_WORKERS.to_string())
            .parse()
            .expect("ANALYSIS_WORKERS must be a valid usize");

        let job_timeout_secs: u64 = std::env::var("JOB_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_JOB_TIMEOUT.as_secs().to_string())
            .parse()
            .expect("JOB_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            admin_token,
            analysis_workers,
            job_timeout_secs,
        }
    }

    /// Worker-pool sizing derived from this configuration.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            workers: self.analysis_workers,
            job_timeout: Duration::from_secs(self.job_timeout_secs),
        }
    }
}
