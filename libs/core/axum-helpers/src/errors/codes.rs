//! Type-safe error codes for API responses.
//!
//! Each error code carries:
//! - String representation for client consumption (e.g., "VALIDATION_ERROR")
//! - Integer code for logging and monitoring (e.g., 1001)
//! - Default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Invalid path or query parameter
    InvalidParameter,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested resource was not found
    NotFound,

    /// Request could not be served as issued
    BadRequest,

    /// Request payload is semantically incorrect
    UnprocessableEntity,

    // Server errors (1000s)
    /// An unexpected internal server error occurred
    InternalError,

    // Database errors (2000-2999)
    /// Database command or query failed
    DatabaseError,
}

impl ErrorCode {
    /// Get the string representation for client consumption.
    ///
    /// # Example
    ///
    /// ```rust
    /// use axum_helpers::errors::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
    /// assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Get the integer code for logging and monitoring.
    ///
    /// Ranges:
    /// - 1000-1999: Client and generic server errors
    /// - 2000-2999: Database errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidParameter => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::UnprocessableEntity => 1009,
            Self::BadRequest => 1012,

            Self::DatabaseError => 2003,
        }
    }

    /// Get the default user-facing error message.
    ///
    /// Individual handlers can override these messages with more specific details.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidParameter => "Invalid request parameter",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::BadRequest => "Bad request",
            Self::UnprocessableEntity => "Request cannot be processed",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database error occurred",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_string_representation() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
        assert_eq!(ErrorCode::DatabaseError.as_str(), "DATABASE_ERROR");
    }

    #[test]
    fn test_error_code_integer_codes() {
        assert_eq!(ErrorCode::ValidationError.code(), 1001);
        assert_eq!(ErrorCode::BadRequest.code(), 1012);
        assert_eq!(ErrorCode::DatabaseError.code(), 2003);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::UnprocessableEntity.to_string(), "UNPROCESSABLE_ENTITY");
    }

    #[test]
    fn test_error_code_serde() {
        let json = serde_json::to_string(&ErrorCode::InvalidParameter).unwrap();
        assert_eq!(json, "\"INVALID_PARAMETER\"");

        let code: ErrorCode = serde_json::from_str("\"VALIDATION_ERROR\"").unwrap();
        assert_eq!(code, ErrorCode::ValidationError);
    }
}
