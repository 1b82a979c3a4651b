//! API error type and its JSON envelope

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mirror::MirrorError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, ApiError>;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const PROJECT_NOT_FOUND: &str = "Project not found";
pub const ENDPOINT_NOT_FOUND: &str = "API endpoint not found";

/// Errors surfaced to API clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input (400)
    #[error("{0}")]
    Validation(String),

    /// Referenced resource absent (404)
    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure (500); the detail is logged, never returned
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the response body
    pub fn public_message(&self) -> &str {
        match self {
            ApiError::Validation(message) | ApiError::NotFound(message) => message,
            ApiError::Internal(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl From<MirrorError> for ApiError {
    fn from(err: MirrorError) -> Self {
        match err {
            MirrorError::Validation(message) => ApiError::Validation(message),
            e @ MirrorError::InvalidAmount(_) => ApiError::Validation(e.to_string()),
            MirrorError::ProjectNotFound(_) => ApiError::NotFound(PROJECT_NOT_FOUND.to_string()),
            MirrorError::Persistence(e) => {
                error!("❌ Persistence error: {}", e);
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
