//! Application error type mapping to HTTP status codes and the
//! `{"detail": "..."}` body format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use parley_core::chat::service::CompletionError;
use parley_types::error::RepositoryError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// The named resource does not exist.
    NotFound(String),
    /// Malformed request input.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl AppError {
    /// Map a repository error for the given resource, turning `NotFound`
    /// into a 404 with a resource-specific detail message.
    pub fn repository(resource: &str, e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound(format!("{resource} not found")),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<CompletionError> for AppError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::ChatNotFound => AppError::NotFound(e.to_string()),
            CompletionError::NoModelConfig => AppError::Internal(e.to_string()),
            CompletionError::Repository(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
