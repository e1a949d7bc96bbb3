//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "code": 2003,
        "error": "DATABASE_ERROR",
        "message": "Database error occurred"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "code": 1001,
        "error": "VALIDATION_ERROR",
        "message": "Exception raised when attempting to create Event records, check body contains valid events: 'id'"
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - No Matching Record",
    content_type = "application/json",
    example = json!({
        "code": 1012,
        "error": "BAD_REQUEST",
        "message": "No record found"
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Unprocessable Entity",
    content_type = "application/json",
    example = json!({
        "code": 1009,
        "error": "UNPROCESSABLE_ENTITY",
        "message": "Error formatting retrieved record with the specified datetime_format: %Q"
    })
)]
pub struct UnprocessableEntityResponse(pub ErrorResponse);
