//! Analysis route handlers: `GET /`, `POST /tokenize`,
//! `POST /word-frequency`.
//!
//! Authentication and input validation happen before a job is ever
//! submitted, so a rejected request never consumes a worker slot. Usage
//! is recorded only after a job completes.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use lexd_analysis::engine::{FrequencyRequest, ProcessRequest};
use lexd_analysis::pool::{JobOutcome, JobPayload, JobResult};
use lexd_core::stopwords::build_stopword_set;
use lexd_core::tasks::resolve_tasks;
use lexd_db::repositories::TokenRepo;

use crate::auth::{self, Caller};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Default number of entries in a word-frequency response.
const DEFAULT_MAX_WORDS: i64 = 100;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// `stopword` accepts a single word or a list of words.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StopwordParam {
    One(String),
    Many(Vec<String>),
}

impl StopwordParam {
    fn into_vec(self) -> Vec<String> {
        match self {
            StopwordParam::One(word) => vec![word],
            StopwordParam::Many(words) => words,
        }
    }
}

/// Body for `POST /tokenize`.
#[derive(Debug, Deserialize)]
pub struct ProcessBody {
    pub text: Option<String>,
    pub tasks: Option<Vec<String>>,
    pub skip_tasks: Option<Vec<String>>,
    pub language: Option<String>,
    pub stopword: Option<StopwordParam>,
    /// When false, duplicate tokens collapse to their first occurrence.
    pub can_duplicate: Option<bool>,
}

/// Body for `POST /word-frequency`.
#[derive(Debug, Deserialize)]
pub struct FrequencyBody {
    pub text: Option<String>,
    pub max_words: Option<i64>,
    pub stopword: Option<StopwordParam>,
}

/// Query parameters for `GET /`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    pub text: Option<String>,
    /// Comma-separated task names.
    pub tasks: Option<String>,
    /// Comma-separated task names to skip.
    pub skip_tasks: Option<String>,
    pub language: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /
///
/// Without a `text` query parameter: the API documentation payload, no
/// authentication required. With one: query-driven analysis for an
/// authenticated caller.
pub async fn root(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let text = match query.text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => return Ok(Json(api_documentation())),
    };

    let caller = Caller::require(auth::classify(&state, &headers).await?)?;

    let tasks = query.tasks.as_deref().map(split_csv);
    let skip_tasks = query.skip_tasks.as_deref().map(split_csv);
    let resolved = resolve_tasks(tasks.as_deref(), skip_tasks.as_deref())?;

    let request = ProcessRequest {
        text: text.clone(),
        tasks: resolved,
        language: query.language,
        stopwords: build_stopword_set(&[]),
        unique_tokens: false,
    };

    run_analysis(&state, &caller, JobPayload::Process(request), &text).await
}

/// POST /tokenize
///
/// Task-composition analysis over a JSON body.
pub async fn tokenize(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(body): AppJson<ProcessBody>,
) -> AppResult<Json<Value>> {
    let text = require_text(body.text)?;
    let resolved = resolve_tasks(body.tasks.as_deref(), body.skip_tasks.as_deref())?;
    let extra_stopwords = body.stopword.map(StopwordParam::into_vec).unwrap_or_default();

    let request = ProcessRequest {
        text: text.clone(),
        tasks: resolved,
        language: body.language,
        stopwords: build_stopword_set(&extra_stopwords),
        unique_tokens: !body.can_duplicate.unwrap_or(true),
    };

    run_analysis(&state, &caller, JobPayload::Process(request), &text).await
}

/// POST /word-frequency
///
/// Most-frequent-words analysis over a JSON body.
pub async fn word_frequency(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(body): AppJson<FrequencyBody>,
) -> AppResult<Json<Value>> {
    let text = require_text(body.text)?;

    let max_words = match body.max_words.unwrap_or(DEFAULT_MAX_WORDS) {
        n if n >= 1 => n as usize,
        _ => {
            return Err(AppError::BadRequest(
                "max_words must be a positive integer".to_string(),
            ))
        }
    };

    let extra_stopwords = body.stopword.map(StopwordParam::into_vec).unwrap_or_default();

    let request = FrequencyRequest {
        text: text.clone(),
        max_words,
        stopwords: build_stopword_set(&extra_stopwords),
    };

    run_analysis(&state, &caller, JobPayload::WordFrequency(request), &text).await
}

// ---------------------------------------------------------------------------
// Shared flow
// ---------------------------------------------------------------------------

/// Submit a job, await its single outcome, record usage on completion.
async fn run_analysis(
    state: &AppState,
    caller: &Caller,
    payload: JobPayload,
    text: &str,
) -> AppResult<Json<Value>> {
    let handle = state.analysis.submit(payload);
    let job_id = handle.id();

    match handle.outcome().await {
        JobOutcome::Completed(result) => {
            // Usage accrues only against stored tokens; admin-secret
            // calls carry none and are exempt.
            if let Some(credential) = caller.0.credential() {
                let char_delta = text.chars().count() as i64;
                let recorded =
                    TokenRepo::record_usage(&state.pool, credential, char_delta).await?;
                if !recorded {
                    tracing::warn!(%job_id, "Credential no longer valid, usage not recorded");
                }
            }

            let body = match result {
                JobResult::Tasks(map) => Value::Object(map),
                JobResult::Frequency(counts) => json!({ "word_frequency": counts }),
            };
            Ok(Json(body))
        }
        JobOutcome::Failed(detail) => Err(AppError::Analysis(detail)),
        JobOutcome::TimedOut => Err(AppError::Timeout),
    }
}

/// Missing or empty `text` is rejected before submission.
fn require_text(text: Option<String>) -> Result<String, AppError> {
    match text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(AppError::BadRequest(
            "Missing \"text\" parameter".to_string(),
        )),
    }
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// The `GET /` documentation payload.
fn api_documentation() -> Value {
    json!({
        "message": "lexd text-analysis API server",
        "endpoints": {
            "GET /": "API documentation, or analysis via query parameters",
            "POST /tokenize": "Analyze text (supports stopword filtering)",
            "POST /word-frequency": "Count word frequencies (supports stopword filtering)",
            "POST /token/request": "Request a new token (admin only)",
            "POST /token/delete": "Delete a token (admin only)",
            "GET|POST /stats": "Usage statistics (admin only)",
        },
        "parameters": {
            "text": "Text to process (required)",
            "tasks": "Tasks to run: tok, pos, ner (optional)",
            "skip_tasks": "Tasks to skip (optional)",
            "language": "Language hint (optional)",
            "stopword": "Custom stopwords extending the default list (optional)",
        },
        "authentication": "Bearer token required in Authorization header",
    })
}
