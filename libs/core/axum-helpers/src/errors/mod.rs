pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Standard error response structure.
///
/// Returned for all error responses:
/// - `code`: Integer error code for logging/monitoring (e.g., 1001)
/// - `error`: Machine-readable error identifier (e.g., "VALIDATION_ERROR")
/// - `message`: Human-readable error message
/// - `details`: Optional additional error details
///
/// # JSON Example
///
/// ```json
/// {
///   "code": 1012,
///   "error": "BAD_REQUEST",
///   "message": "No record found",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Path parameter error: {0}")]
    PathRejection(#[from] PathRejection),

    #[error("Query parameter error: {0}")]
    QueryRejection(#[from] QueryRejection),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unprocessable Entity: {0}")]
    UnprocessableEntity(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::JsonExtraction.code(),
                    "JSON extraction error: {:?}",
                    e
                );
                (e.status(), e.body_text(), ErrorCode::JsonExtraction)
            }
            AppError::PathRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::InvalidParameter.code(),
                    "Path parameter error: {:?}",
                    e
                );
                (e.status(), e.body_text(), ErrorCode::InvalidParameter)
            }
            AppError::QueryRejection(e) => {
                tracing::warn!(
                    error_code = ErrorCode::InvalidParameter.code(),
                    "Query parameter error: {:?}",
                    e
                );
                (e.status(), e.body_text(), ErrorCode::InvalidParameter)
            }
            AppError::Validation(msg) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {}",
                    msg
                );
                (StatusCode::BAD_REQUEST, msg, ErrorCode::ValidationError)
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg, ErrorCode::BadRequest)
            }
            AppError::UnprocessableEntity(msg) => {
                tracing::info!("Unprocessable entity: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    msg,
                    ErrorCode::UnprocessableEntity,
                )
            }
            AppError::Database(msg) => {
                tracing::error!(
                    error_code = ErrorCode::DatabaseError.code(),
                    "Database error: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DatabaseError.default_message().to_string(),
                    ErrorCode::DatabaseError,
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    msg
                );
                (StatusCode::INTERNAL_SERVER_ERROR, msg, ErrorCode::InternalError)
            }
        };

        error_response(status, message, code)
    }
}

/// Helper function to create error responses.
///
/// # Example
///
/// ```rust,ignore
/// use axum_helpers::errors::{error_response, ErrorCode};
/// use axum::http::StatusCode;
///
/// let response = error_response(
///     StatusCode::BAD_REQUEST,
///     "Invalid input".to_string(),
///     ErrorCode::ValidationError,
/// );
/// ```
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details: None,
    });

    (status, body).into_response()
}
