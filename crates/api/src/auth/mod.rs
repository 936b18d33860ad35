//! Bearer-credential authentication and route-policy extractors.
//!
//! Classification is pure: a request resolves to [`Identity::Anonymous`],
//! [`Identity::User`], or [`Identity::Admin`] without touching business
//! logic. The extractors enforce route policy at the type level:
//! [`Caller`] for analysis routes, [`RequireAdmin`] for admin routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use lexd_core::error::CoreError;
use lexd_db::models::token::Token;
use lexd_db::repositories::TokenRepo;

use crate::error::AppError;
use crate::state::AppState;

/// Who is making the request.
#[derive(Debug, Clone)]
pub enum Identity {
    /// No credential, or one matching no valid token.
    Anonymous,
    /// A valid non-admin token.
    User(Token),
    /// Admin: `None` for the configured admin secret (never stored),
    /// `Some` for a stored token with the admin flag.
    Admin(Option<Token>),
}

impl Identity {
    /// The stored credential to account usage against, if any.
    ///
    /// Admin-secret calls carry no stored token and are exempt from
    /// usage accounting.
    pub fn credential(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::User(token) => Some(&token.value),
            Identity::Admin(token) => token.as_ref().map(|t| t.value.as_str()),
        }
    }
}

/// Extract the credential from an `Authorization: Bearer <token>` header.
///
/// Absent, malformed, or empty credentials all classify as no credential.
fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let credential = value.strip_prefix("Bearer ")?.trim();
    (!credential.is_empty()).then_some(credential)
}

/// Classify a request's credential against the admin secret and the
/// token store.
///
/// The admin-secret comparison happens first and never touches storage.
/// Storage failures propagate; an unknown credential is `Anonymous`,
/// never an error.
pub async fn classify(state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let Some(credential) = bearer_credential(headers) else {
        return Ok(Identity::Anonymous);
    };

    if let Some(admin_secret) = state.config.admin_token.as_deref() {
        if credential == admin_secret {
            return Ok(Identity::Admin(None));
        }
    }

    match TokenRepo::find_valid(&state.pool, credential).await? {
        Some(token) if token.is_admin => Ok(Identity::Admin(Some(token))),
        Some(token) => Ok(Identity::User(token)),
        None => Ok(Identity::Anonymous),
    }
}

/// An authenticated caller (user or admin) for analysis routes.
///
/// ```ignore
/// async fn my_handler(Caller(identity): Caller) -> AppResult<Json<Value>> {
///     // identity is guaranteed non-anonymous here
/// }
/// ```
pub struct Caller(pub Identity);

impl Caller {
    /// Enforce the analysis-route policy on a classified identity.
    pub fn require(identity: Identity) -> Result<Self, AppError> {
        match identity {
            Identity::Anonymous => Err(AppError::Core(CoreError::Unauthorized(
                "Invalid or missing Bearer token".into(),
            ))),
            other => Ok(Caller(other)),
        }
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = classify(state, &parts.headers).await?;
        Caller::require(identity)
    }
}

/// Requires admin classification. Anonymous callers are rejected as
/// unauthenticated; valid non-admin callers as forbidden (both render
/// 401, see the error mapping).
pub struct RequireAdmin(pub Identity);

impl RequireAdmin {
    /// Enforce the admin-route policy on a classified identity.
    pub fn require(identity: Identity) -> Result<Self, AppError> {
        match identity {
            Identity::Admin(token) => Ok(RequireAdmin(Identity::Admin(token))),
            Identity::User(_) => Err(AppError::Core(CoreError::Forbidden(
                "Admin privileges required".into(),
            ))),
            Identity::Anonymous => Err(AppError::Core(CoreError::Unauthorized(
                "Invalid or missing Bearer token".into(),
            ))),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = classify(state, &parts.headers).await?;
        RequireAdmin::require(identity)
    }
}
