//! Error Types for the Padtree API
//!
//! This module defines error handling for the HTTP layer:
//! - `ApiError` struct for structured error responses
//! - `ErrorCode` enum for categorizing errors
//! - `IntoResponse` implementation for Axum
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use padtree_core::{PathError, StoreError, SubscribeError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each code maps to a specific HTTP status and names a category of
/// failure an API operation can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Pad path failed normalization or validation
    InvalidPath,

    /// Request contains invalid input data
    InvalidInput,

    // ========================================================================
    // Payload Errors (413)
    // ========================================================================
    /// Pad content exceeds the configured maximum size
    ContentTooLarge,

    // ========================================================================
    // Capacity Errors (429)
    // ========================================================================
    /// Topic already holds the maximum number of live subscribers
    SubscriberLimitExceeded,

    /// Request rate limit exceeded
    TooManyRequests,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Storage operation failed
    StoreError,

    /// Storage backend is unreachable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidPath | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,

            ErrorCode::ContentTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            ErrorCode::SubscriberLimitExceeded | ErrorCode::TooManyRequests => {
                StatusCode::TOO_MANY_REQUESTS
            }

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError | ErrorCode::StoreError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPath => "Invalid pad path",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::ContentTooLarge => "Content exceeds maximum size",
            ErrorCode::SubscriberLimitExceeded => "Too many viewers on this pad",
            ErrorCode::TooManyRequests => "Rate limit exceeded",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StoreError => "Storage operation failed",
            ErrorCode::ServiceUnavailable => "Storage temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a ContentTooLarge error.
    pub fn content_too_large(max_bytes: usize) -> Self {
        Self::new(
            ErrorCode::ContentTooLarge,
            format!("Content exceeds maximum size of {} bytes", max_bytes),
        )
    }

    /// Create a TooManyRequests error, optionally naming the retry delay.
    pub fn too_many_requests(retry_after_secs: Option<u64>) -> Self {
        let mut error = Self::from_code(ErrorCode::TooManyRequests);
        if let Some(secs) = retry_after_secs {
            error.message = format!("Rate limit exceeded, retry after {}s", secs);
        }
        error
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl From<PathError> for ApiError {
    fn from(e: PathError) -> Self {
        Self::new(ErrorCode::InvalidPath, e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable { .. } => Self::new(ErrorCode::ServiceUnavailable, e.to_string()),
            _ => Self::new(ErrorCode::StoreError, e.to_string()),
        }
    }
}

impl From<SubscribeError> for ApiError {
    fn from(e: SubscribeError) -> Self {
        Self::new(ErrorCode::SubscriberLimitExceeded, e.to_string())
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
