//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
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
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

// Convert from trawl-core errors
impl From<trawl_core::error::TrawlError> for ApiError {
    fn from(err: trawl_core::error::TrawlError) -> Self {
        use trawl_core::error::TrawlError;

        match err {
            TrawlError::Configuration(msg) => ApiError::bad_request(msg),
            TrawlError::RateLimit { message } => ApiError::rate_limit(message),
            TrawlError::Index { message } => {
                ApiError::internal(format!("Index error: {}", message))
            }
            TrawlError::Snapshot { message, .. } => {
                ApiError::internal(format!("Snapshot error: {}", message))
            }
            TrawlError::VectorStore { message } => {
                ApiError::internal(format!("Vector store error: {}", message))
            }
            TrawlError::Embedding { message } => {
                ApiError::internal(format!("Embedding error: {}", message))
            }
            TrawlError::WebSearch { message } => {
                ApiError::internal(format!("Web search error: {}", message))
            }
            TrawlError::Rerank { message } => {
                ApiError::internal(format!("Rerank error: {}", message))
            }
            TrawlError::Parse { message } => {
                ApiError::internal(format!("Parse error: {}", message))
            }
            TrawlError::Serialization(e) => {
                ApiError::internal(format!("Serialization error: {}", e))
            }
            TrawlError::Io(e) => ApiError::internal(format!("IO error: {}", e)),
            TrawlError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
