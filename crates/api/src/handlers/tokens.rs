//! Admin handlers for token issuance and deletion.
//!
//! Both endpoints require admin classification via [`RequireAdmin`] and
//! operate on the token store directly -- they are not analysis jobs and
//! never touch the worker pool.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use lexd_core::error::CoreError;
use lexd_core::types::DbId;
use lexd_db::repositories::TokenRepo;

use crate::auth::RequireAdmin;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Body for `POST /token/request`.
#[derive(Debug, Deserialize)]
pub struct RequestTokenBody {
    pub user_id: Option<DbId>,
    /// Issue the new credential with the admin flag set.
    #[serde(default)]
    pub admin: bool,
}

/// Body for `POST /token/delete`.
#[derive(Debug, Deserialize)]
pub struct DeleteTokenBody {
    pub token: Option<String>,
}

/// POST /token/request
///
/// Issue a fresh credential for a user, invalidating any prior ones.
pub async fn request_token(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    AppJson(body): AppJson<RequestTokenBody>,
) -> AppResult<Json<Value>> {
    let Some(user_id) = body.user_id else {
        return Err(AppError::BadRequest(
            "Missing \"user_id\" parameter".to_string(),
        ));
    };

    let issued = if body.admin {
        TokenRepo::issue_admin(&state.pool, user_id).await?
    } else {
        TokenRepo::issue(&state.pool, user_id).await?
    };

    tracing::info!(
        user_id,
        reissued = issued.reissued,
        is_admin = issued.token.is_admin,
        "Token issued",
    );

    Ok(Json(json!({
        "token": issued.token.value,
        "reissued": issued.reissued,
        "message": "Token issued successfully",
    })))
}

/// POST /token/delete
///
/// Permanently delete a token record. Deleting an unknown token is a
/// not-found result, not a server error.
pub async fn delete_token(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    AppJson(body): AppJson<DeleteTokenBody>,
) -> AppResult<Json<Value>> {
    let Some(token) = body.token.filter(|t| !t.is_empty()) else {
        return Err(AppError::BadRequest(
            "Missing \"token\" parameter".to_string(),
        ));
    };

    let deleted = TokenRepo::delete(&state.pool, &token).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Token" }));
    }

    tracing::info!("Token deleted");

    Ok(Json(json!({
        "message": "Token deleted successfully",
    })))
}
