//! Admin statistics handler (`GET|POST /stats`).

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use lexd_core::types::{DbId, Timestamp};
use lexd_db::models::token::Token;
use lexd_db::repositories::TokenRepo;

use crate::auth::RequireAdmin;
use crate::error::AppResult;
use crate::state::AppState;

/// One row of the statistics response.
///
/// The stored credential value is reported under the wire name `token`.
#[derive(Debug, Serialize)]
struct TokenStats {
    token: String,
    user_id: DbId,
    created_at: Timestamp,
    usage_count: i64,
    char_count: i64,
    is_valid: bool,
    is_admin: bool,
}

impl From<Token> for TokenStats {
    fn from(token: Token) -> Self {
        Self {
            token: token.value,
            user_id: token.user_id,
            created_at: token.created_at,
            usage_count: token.usage_count,
            char_count: token.char_count,
            is_valid: token.is_valid,
            is_admin: token.is_admin,
        }
    }
}

/// GET|POST /stats
///
/// Usage statistics for every token row (valid and invalid), in creation
/// order.
pub async fn stats(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Value>> {
    let rows = TokenRepo::list_stats(&state.pool).await?;
    let stats: Vec<TokenStats> = rows.into_iter().map(TokenStats::from).collect();

    Ok(Json(json!({ "stats": stats })))
}
