//! Token entity model.

use lexd_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tokens` table.
///
/// `value` is the opaque bearer credential itself and the unique lookup
/// key; the surrogate `id` exists only for row identity and stable
/// ordering.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Token {
    pub id: DbId,
    pub value: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub is_valid: bool,
    pub is_admin: bool,
    pub usage_count: i64,
    pub char_count: i64,
}

/// Result of issuing a credential for a user.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: Token,
    /// Whether the user already had token rows (all now invalidated).
    pub reissued: bool,
}
