//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mailsift_core::SiftError;
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Common error constructors
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

// Convert from mailsift-core errors
impl From<SiftError> for ApiError {
    fn from(err: SiftError) -> Self {
        let details = json!({
            "errorCode": err.code().as_str(),
            "suggestion": err.suggestion(),
        });

        let api_error = match &err {
            SiftError::LabelNotFound { label, .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "LABEL_NOT_FOUND", format!("Label '{}' does not exist", label))
            }
            SiftError::Validation { message, .. } => ApiError::validation(message.clone()),
            SiftError::NotFound { message, .. } => ApiError::not_found(message.clone()),
            SiftError::Authentication { message, .. } => ApiError::unauthorized(message.clone()),
            SiftError::RateLimit { message, .. } => ApiError::rate_limit(message.clone()),
            SiftError::Transport { message, .. } => {
                ApiError::internal(format!("Mailbox transport error: {}", message))
            }
            SiftError::Parse { message, .. } => {
                ApiError::internal(format!("Mailbox response error: {}", message))
            }
            SiftError::Configuration(msg) => {
                ApiError::internal(format!("Configuration error: {}", msg))
            }
            SiftError::Io(e) => ApiError::internal(format!("IO error: {}", e)),
        };

        api_error.with_details(details)
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
