//! Custom error types for the API service
//!
//! Every failure leaves the service as `{ "success": false, "message": ... }`
//! with an optional `errors` list. Internal details are logged, never sent.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use campus_common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Several field-level validation failures
    #[error("Validation Error")]
    InvalidInput(Vec<String>),

    /// Missing, invalid or expired credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the role is not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Duplicate email or duplicate registration
    #[error("{0}")]
    Conflict(String),

    /// Login throttling
    #[error("{0}")]
    TooManyRequests(String),

    /// Underlying store failure
    #[error("{0}")]
    Database(DatabaseError),

    /// Failure in hashing, signing or another internal step
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidInput(_) | ApiError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Fallback mapping for store errors no handler translated itself
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation { constraint } => {
                ApiError::Conflict(format!("Duplicate value for {}", field_of(constraint)))
            }
            DatabaseError::ForeignKeyViolation { .. } => {
                ApiError::NotFound("Referenced resource not found".to_string())
            }
            other => ApiError::Database(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Best-effort field name from a constraint such as `users_email_key`
fn field_of(constraint: Option<String>) -> String {
    constraint
        .as_deref()
        .and_then(|name| name.strip_suffix("_key"))
        .and_then(|name| name.split_once('_'))
        .map(|(_, field)| field.to_string())
        .unwrap_or_else(|| "unique field".to_string())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = match &self {
            ApiError::InvalidInput(errors) => json!({
                "success": false,
                "message": self.to_string(),
                "errors": errors,
            }),
            _ => json!({
                "success": false,
                "message": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
