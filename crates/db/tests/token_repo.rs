//! Integration tests for the token repository.
//!
//! Exercises issuance/reissuance atomicity, revocation, usage accounting
//! under concurrency, and the statistics snapshot ordering.

use lexd_db::repositories::TokenRepo;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

/// First issuance for a user reports `reissued = false` and validates.
#[sqlx::test(migrations = "./migrations")]
async fn test_first_issue(pool: SqlitePool) {
    let issued = TokenRepo::issue(&pool, 7).await.unwrap();

    assert!(!issued.reissued);
    assert_eq!(issued.token.user_id, 7);
    assert!(issued.token.is_valid);
    assert!(!issued.token.is_admin);
    assert_eq!(issued.token.usage_count, 0);
    assert_eq!(issued.token.char_count, 0);

    let found = TokenRepo::find_valid(&pool, &issued.token.value)
        .await
        .unwrap();
    assert!(found.is_some());
}

/// Reissuance invalidates the prior credential and reports `reissued = true`.
#[sqlx::test(migrations = "./migrations")]
async fn test_reissue_invalidates_prior(pool: SqlitePool) {
    let first = TokenRepo::issue(&pool, 7).await.unwrap();
    let second = TokenRepo::issue(&pool, 7).await.unwrap();

    assert!(second.reissued);
    assert_ne!(first.token.value, second.token.value);

    // The first credential no longer authenticates; the second does.
    assert!(TokenRepo::find_valid(&pool, &first.token.value)
        .await
        .unwrap()
        .is_none());
    assert!(TokenRepo::find_valid(&pool, &second.token.value)
        .await
        .unwrap()
        .is_some());

    // The invalidated row still exists in history.
    let old_row = TokenRepo::find_by_value(&pool, &first.token.value)
        .await
        .unwrap()
        .expect("invalidated row must survive reissue");
    assert!(!old_row.is_valid);
}

/// At most one valid token per user, even after several reissues.
#[sqlx::test(migrations = "./migrations")]
async fn test_single_valid_token_invariant(pool: SqlitePool) {
    for _ in 0..4 {
        TokenRepo::issue(&pool, 42).await.unwrap();
    }

    let valid_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM tokens WHERE user_id = 42 AND is_valid = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(valid_count, 1);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tokens WHERE user_id = 42")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(total, 4, "reissue must keep history rows");
}

/// Admin issuance sets the admin flag.
#[sqlx::test(migrations = "./migrations")]
async fn test_issue_admin(pool: SqlitePool) {
    let issued = TokenRepo::issue_admin(&pool, 0).await.unwrap();
    assert!(issued.token.is_admin);
}

/// Reissuance for one user does not touch another user's credential.
#[sqlx::test(migrations = "./migrations")]
async fn test_reissue_scoped_to_user(pool: SqlitePool) {
    let alice = TokenRepo::issue(&pool, 1).await.unwrap();
    let _bob = TokenRepo::issue(&pool, 2).await.unwrap();
    TokenRepo::issue(&pool, 2).await.unwrap();

    assert!(TokenRepo::find_valid(&pool, &alice.token.value)
        .await
        .unwrap()
        .is_some());
}

// ---------------------------------------------------------------------------
// Revocation
// ---------------------------------------------------------------------------

/// Deleting an existing token removes the row outright.
#[sqlx::test(migrations = "./migrations")]
async fn test_delete_existing(pool: SqlitePool) {
    let issued = TokenRepo::issue(&pool, 7).await.unwrap();

    let deleted = TokenRepo::delete(&pool, &issued.token.value).await.unwrap();
    assert!(deleted);

    assert!(TokenRepo::find_valid(&pool, &issued.token.value)
        .await
        .unwrap()
        .is_none());
    assert!(TokenRepo::find_by_value(&pool, &issued.token.value)
        .await
        .unwrap()
        .is_none());
}

/// Deleting a nonexistent token reports `false`, not an error.
#[sqlx::test(migrations = "./migrations")]
async fn test_delete_missing(pool: SqlitePool) {
    let deleted = TokenRepo::delete(&pool, "no-such-credential").await.unwrap();
    assert!(!deleted);
}

// ---------------------------------------------------------------------------
// Usage accounting
// ---------------------------------------------------------------------------

/// A single usage record increments both counters.
#[sqlx::test(migrations = "./migrations")]
async fn test_record_usage(pool: SqlitePool) {
    let issued = TokenRepo::issue(&pool, 7).await.unwrap();

    let recorded = TokenRepo::record_usage(&pool, &issued.token.value, 11)
        .await
        .unwrap();
    assert!(recorded);

    let row = TokenRepo::find_valid(&pool, &issued.token.value)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.usage_count, 1);
    assert_eq!(row.char_count, 11);
}

/// Concurrent usage records on the same token lose no increments.
#[sqlx::test(migrations = "./migrations")]
async fn test_record_usage_concurrent(pool: SqlitePool) {
    let issued = TokenRepo::issue(&pool, 7).await.unwrap();
    let value = issued.token.value.clone();

    const WRITERS: usize = 10;
    const CHAR_DELTA: i64 = 5;

    let mut handles = Vec::new();
    for _ in 0..WRITERS {
        let pool = pool.clone();
        let value = value.clone();
        handles.push(tokio::spawn(async move {
            TokenRepo::record_usage(&pool, &value, CHAR_DELTA)
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap());
    }

    let row = TokenRepo::find_valid(&pool, &value).await.unwrap().unwrap();
    assert_eq!(row.usage_count, WRITERS as i64);
    assert_eq!(row.char_count, WRITERS as i64 * CHAR_DELTA);
}

/// Usage against an invalidated credential records nothing.
#[sqlx::test(migrations = "./migrations")]
async fn test_record_usage_invalid_token(pool: SqlitePool) {
    let first = TokenRepo::issue(&pool, 7).await.unwrap();
    TokenRepo::issue(&pool, 7).await.unwrap();

    let recorded = TokenRepo::record_usage(&pool, &first.token.value, 99)
        .await
        .unwrap();
    assert!(!recorded);

    let row = TokenRepo::find_by_value(&pool, &first.token.value)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.usage_count, 0);
    assert_eq!(row.char_count, 0);
}

// ---------------------------------------------------------------------------
// Statistics snapshot
// ---------------------------------------------------------------------------

/// Stats list every row (valid and invalid) in creation order.
#[sqlx::test(migrations = "./migrations")]
async fn test_list_stats_ordering(pool: SqlitePool) {
    let a = TokenRepo::issue(&pool, 1).await.unwrap();
    let b = TokenRepo::issue(&pool, 2).await.unwrap();
    let c = TokenRepo::issue(&pool, 1).await.unwrap(); // invalidates `a`

    let stats = TokenRepo::list_stats(&pool).await.unwrap();
    assert_eq!(stats.len(), 3);

    let values: Vec<&str> = stats.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(
        values,
        vec![
            a.token.value.as_str(),
            b.token.value.as_str(),
            c.token.value.as_str()
        ]
    );

    assert!(!stats[0].is_valid);
    assert!(stats[1].is_valid);
    assert!(stats[2].is_valid);
}
