use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;

use cork_db::StoreError;

/// Errors the HTTP surface reports. Store failures keep their taxonomy so
/// the status mapping can tell a missing entity or broken relation from a
/// fault in the store itself.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Store(StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::Store(StoreError::Constraint(_)) => (StatusCode::CONFLICT, self.to_string()),
            ApiError::Store(e) => {
                error!("store error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Maps a blocking-pool join failure to a 500; the error itself only ever
/// means the task panicked or was cancelled, so log it here.
pub(crate) fn join_error(e: tokio::task::JoinError) -> ApiError {
    error!("spawn_blocking join error: {}", e);
    ApiError::Internal
}

/// Json extractor that reports a missing required field by name, as
/// `'title' is required`, instead of axum's default rejection body.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(ApiError::Validation(missing_field_message(&rejection.body_text()))),
        }
    }
}

fn missing_field_message(body: &str) -> String {
    match body
        .split("missing field `")
        .nth(1)
        .and_then(|rest| rest.split('`').next())
    {
        Some(field) => format!("'{field}' is required"),
        None => body.to_string(),
    }
}
