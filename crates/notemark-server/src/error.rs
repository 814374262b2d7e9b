use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use notemark_render::error::RenderError;
use notemark_storage::error::StoreError;

use crate::pipeline::ValidationError;

/// Unified error type for all route handlers. Bodies are plain text so htmx
/// can show them as-is.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, message).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidId(_) => ApiError::BadRequest("Invalid note ID".to_string()),
            StoreError::NotFound { .. } => ApiError::NotFound("Note not found".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(e: RenderError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        match e {
            too_large @ ValidationError::TooLarge => {
                ApiError::PayloadTooLarge(too_large.to_string())
            }
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}
