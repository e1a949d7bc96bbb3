//! Event domain error types

use axum_helpers::AppError;
use database::mongodb::StoreError;
use thiserror::Error;

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;

pub const NO_RECORD_FOUND: &str = "No record found";
pub const NO_RECORDS_FOUND: &str = "No records found";

/// Event domain errors
#[derive(Debug, Error)]
pub enum EventError {
    /// A submitted event is missing or mistypes a required field
    #[error("{0}")]
    Validation(String),

    /// A datetime pattern or time bound could not be used
    #[error("{0}")]
    InvalidFormat(String),

    /// Lookup produced no events
    #[error("{0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A stored document could not be mapped back to an event
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EventError {
    /// Validation failure naming the offending key, e.g. `'id'`
    pub fn missing_key(key: &str) -> Self {
        Self::Validation(format!(
            "Exception raised when attempting to create Event records, check body contains valid events: '{}'",
            key
        ))
    }

    /// Formatting failure for a user-supplied pattern
    pub fn invalid_datetime_format(pattern: &str) -> Self {
        Self::InvalidFormat(format!(
            "Error formatting retrieved record with the specified datetime_format: {}",
            pattern
        ))
    }
}

// Absent results answer 400, matching the public API contract
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Validation(message) => AppError::Validation(message),
            EventError::InvalidFormat(message) => AppError::UnprocessableEntity(message),
            EventError::NotFound(message) => AppError::BadRequest(message),
            EventError::Store(e) => AppError::Database(e.to_string()),
            EventError::Internal(message) => AppError::InternalServerError(message),
        }
    }
}

impl axum::response::IntoResponse for EventError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_missing_key_message() {
        let err = EventError::missing_key("id");
        assert_eq!(
            err.to_string(),
            "Exception raised when attempting to create Event records, check body contains valid events: 'id'"
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (EventError::missing_key("time"), StatusCode::BAD_REQUEST),
            (EventError::invalid_datetime_format("%Q"), StatusCode::UNPROCESSABLE_ENTITY),
            (EventError::NotFound(NO_RECORD_FOUND.into()), StatusCode::BAD_REQUEST),
            (
                EventError::Store(StoreError::WriteErrors("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (EventError::Internal("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
