//! Error Types for the Carousel API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.
//! The feed route itself never returns these: it degrades to a fail-soft
//! envelope. Administrative routes use them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use carousel_core::{CarouselError, StorageError};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request contains invalid input data
    InvalidInput,

    /// Field value is out of valid range
    InvalidRange,

    /// Requested rotation stream does not exist
    StreamNotFound,

    /// Concurrent modification detected (advancement contention)
    ConcurrentModification,

    /// Internal server error
    InternalError,

    /// Backing store is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput | ErrorCode::InvalidRange => StatusCode::BAD_REQUEST,

            ErrorCode::StreamNotFound => StatusCode::NOT_FOUND,

            ErrorCode::ConcurrentModification => StatusCode::CONFLICT,

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::InvalidRange => "Value is out of valid range",
            ErrorCode::StreamNotFound => "Rotation stream not found",
            ErrorCode::ConcurrentModification => "Concurrent modification detected",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Backing store temporarily unavailable",
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
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
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

    /// Create a StreamNotFound error for the given stream key.
    pub fn stream_not_found(key: &str) -> Self {
        Self::new(
            ErrorCode::StreamNotFound,
            format!("Rotation stream not found: {}", key),
        )
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<CarouselError> for ApiError {
    fn from(err: CarouselError) -> Self {
        match &err {
            CarouselError::Storage(StorageError::Unavailable { .. })
            | CarouselError::Storage(StorageError::LockPoisoned) => {
                Self::service_unavailable(err.to_string())
            }
            CarouselError::Storage(StorageError::NotFound { key }) => {
                Self::stream_not_found(key)
            }
            CarouselError::Storage(StorageError::VersionConflict { .. }) => {
                Self::new(ErrorCode::ConcurrentModification, err.to_string())
            }
            CarouselError::Rotation(rotation) => match rotation {
                carousel_core::RotationError::ContentionExhausted { .. } => {
                    Self::new(ErrorCode::ConcurrentModification, err.to_string())
                }
                _ => Self::invalid_input(err.to_string()),
            },
            CarouselError::Content(_) => Self::invalid_input(err.to_string()),
            CarouselError::Config(_) => Self::internal_error(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// TESTS
// ============================================================================
