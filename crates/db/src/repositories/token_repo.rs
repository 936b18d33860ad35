//! Repository for the `tokens` table.
//!
//! The only durable state in the system. Every mutation is a single
//! statement or a single transaction, so concurrent callers never observe
//! a half-applied issue/revoke and counter updates never lose increments.

use chrono::Utc;
use lexd_core::credentials::generate_credential;
use lexd_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::token::{IssuedToken, Token};

/// Column list for `tokens` queries.
const COLUMNS: &str = "id, value, user_id, created_at, is_valid, is_admin, usage_count, char_count";

/// Insert attempts before giving up on credential generation.
///
/// A unique-constraint hit means the generated value collided with an
/// existing row; a second collision in a row is effectively impossible,
/// the bound just keeps a broken RNG from looping forever.
const MAX_ISSUE_ATTEMPTS: u32 = 4;

/// Provides all operations on stored bearer tokens.
pub struct TokenRepo;

impl TokenRepo {
    /// Find a token row by credential value, only if currently valid.
    ///
    /// This is the authentication primitive: revoked and reissued
    /// credentials miss here even though their rows may still exist.
    pub async fn find_valid(
        pool: &SqlitePool,
        credential: &str,
    ) -> Result<Option<Token>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tokens WHERE value = ?1 AND is_valid = 1");
        sqlx::query_as::<_, Token>(&query)
            .bind(credential)
            .fetch_optional(pool)
            .await
    }

    /// Find a token row by credential value, valid or not.
    pub async fn find_by_value(
        pool: &SqlitePool,
        credential: &str,
    ) -> Result<Option<Token>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tokens WHERE value = ?1");
        sqlx::query_as::<_, Token>(&query)
            .bind(credential)
            .fetch_optional(pool)
            .await
    }

    /// Issue a fresh credential for `user_id`, invalidating any prior ones.
    ///
    /// One transaction covers the prior-row check, the invalidation, and
    /// the insert, so no interleaving can leave a user with two valid
    /// tokens. `reissued` reports whether any prior row existed for the
    /// user (valid or not).
    pub async fn issue(pool: &SqlitePool, user_id: DbId) -> Result<IssuedToken, sqlx::Error> {
        Self::issue_token(pool, user_id, false).await
    }

    /// Issue an admin credential for `user_id`. Same flow as [`issue`],
    /// with `is_admin` set on the new row.
    ///
    /// [`issue`]: TokenRepo::issue
    pub async fn issue_admin(pool: &SqlitePool, user_id: DbId) -> Result<IssuedToken, sqlx::Error> {
        Self::issue_token(pool, user_id, true).await
    }

    async fn issue_token(
        pool: &SqlitePool,
        user_id: DbId,
        is_admin: bool,
    ) -> Result<IssuedToken, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let prior_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tokens WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        let reissued = prior_rows > 0;

        sqlx::query("UPDATE tokens SET is_valid = 0 WHERE user_id = ?1 AND is_valid = 1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO tokens (value, user_id, created_at, is_admin) \
             VALUES (?1, ?2, ?3, ?4) \
             RETURNING {COLUMNS}"
        );

        let mut attempt = 0;
        let token = loop {
            attempt += 1;
            let value = generate_credential();
            let result = sqlx::query_as::<_, Token>(&insert)
                .bind(&value)
                .bind(user_id)
                .bind(Utc::now())
                .bind(is_admin)
                .fetch_one(&mut *tx)
                .await;

            match result {
                Ok(token) => break token,
                Err(e) if is_unique_violation(&e) && attempt < MAX_ISSUE_ATTEMPTS => {
                    tracing::warn!(user_id, attempt, "Credential collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        };

        tx.commit().await?;

        Ok(IssuedToken { token, reissued })
    }

    /// Permanently delete a token row.
    ///
    /// Returns `false` when no row matched; the caller decides whether
    /// that is an error (admin delete surfaces it as a not-found result).
    pub async fn delete(pool: &SqlitePool, credential: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tokens WHERE value = ?1")
            .bind(credential)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record one completed analysis against a valid token.
    ///
    /// A single UPDATE increments both counters, so arbitrary
    /// interleavings from concurrent workers serialize at the row and no
    /// increment is ever lost. Returns whether a valid row matched.
    pub async fn record_usage(
        pool: &SqlitePool,
        credential: &str,
        char_delta: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tokens \
             SET usage_count = usage_count + 1, char_count = char_count + ?1 \
             WHERE value = ?2 AND is_valid = 1",
        )
        .bind(char_delta)
        .bind(credential)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Snapshot of all token rows, ordered by creation time ascending.
    ///
    /// Point-in-time per row; cross-row consistency is not required by
    /// callers (admin statistics view).
    pub async fn list_stats(pool: &SqlitePool) -> Result<Vec<Token>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tokens ORDER BY created_at ASC, id ASC");
        sqlx::query_as::<_, Token>(&query).fetch_all(pool).await
    }
}

/// Whether a sqlx error is a SQLite unique-constraint violation.
///
/// Extended result codes: 2067 = SQLITE_CONSTRAINT_UNIQUE,
/// 1555 = SQLITE_CONSTRAINT_PRIMARYKEY.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("2067") | Some("1555"))
        }
        _ => false,
    }
}
