//! Request extractors with JSON error responses.

use axum::extract::{FromRequest, Request};

use crate::error::AppError;

/// JSON body extractor whose rejection is the project's JSON error shape.
///
/// Axum's own `Json` rejection renders plain text; every lexd response,
/// including malformed-body errors, must be JSON.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected request body");
                Err(AppError::BadRequest(
                    "Invalid JSON in request body".to_string(),
                ))
            }
        }
    }
}
