//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::db::repository::RepositoryError;
use crate::services::RegistrationError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest { message: String, field: Option<String> },
    /// The request collides with existing data
    Conflict(String),
    /// Missing or wrong admin key
    Forbidden,
    /// Repository error
    Repository(RepositoryError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            field: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest { message, field } => {
                let error = ApiError::new("BAD_REQUEST", message);
                let error = match field {
                    Some(field) => error.with_details(format!("field={}", field)),
                    None => error,
                };
                (StatusCode::BAD_REQUEST, error)
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                ApiError::new("FORBIDDEN", "Admin key missing or invalid"),
            ),
            AppError::Repository(e) => match e {
                RepositoryError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", e.to_string()))
                }
                RepositoryError::ConflictError { .. } => {
                    (StatusCode::CONFLICT, ApiError::new("CONFLICT", e.to_string()))
                }
                e => {
                    error!(error = %e, "repository error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("REPOSITORY_ERROR", e.to_string()),
                    )
                }
            },
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation { field } => AppError::BadRequest {
                message: err.to_string(),
                field: Some(field.to_string()),
            },
            RegistrationError::Duplicate { .. } => AppError::Conflict(err.to_string()),
            RegistrationError::Repository(e) => AppError::Repository(e),
        }
    }
}
