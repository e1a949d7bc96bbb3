//! Events Domain
//!
//! Calendar events keyed by an integer id, stored in MongoDB with upsert
//! semantics and queried by id or by time window.
//!
//! ```text
//! HTTP handlers ─► EventService ─► EventRepository ─► DocumentStore ─► MongoDB
//! ```
//!
//! - `POST /events` upserts a batch and reports which events were new
//! - `GET /event/{id}` fetches one event
//! - `GET /events` lists events in `[from_time, to_time)`, defaulting to today

use axum_helpers::errors::responses::{
    BadRequestResponse, BadRequestValidationResponse, InternalServerErrorResponse,
    UnprocessableEntityResponse,
};
use utoipa::OpenApi;

mod error;
mod handlers;
mod models;
mod mongodb;
mod repository;
mod service;
mod time_range;

pub use error::{EventError, NO_RECORD_FOUND, NO_RECORDS_FOUND, Result};
pub use handlers::{
    CREATED_MESSAGE, CreateEventsResponse, EventsState, FormatQuery, RETRIEVED_MESSAGE,
    RetrievedEventResponse, RetrievedEventsResponse, TimeRangeQuery, events_router,
};
pub use models::{
    DEFAULT_DATETIME_FORMAT, Event, EventDocument, FormattedEvent, parse_timestamp,
    to_bson_datetime,
};
pub use self::mongodb::MongoEventRepository;
pub use repository::EventRepository;
pub use service::EventService;
pub use time_range::TimeRange;

/// OpenAPI documentation for Events API
#[derive(OpenApi)]
#[openapi(
    paths(handlers::create_events, handlers::get_event, handlers::list_events),
    components(
        schemas(
            Event,
            FormattedEvent,
            CreateEventsResponse,
            RetrievedEventResponse,
            RetrievedEventsResponse,
            axum_helpers::ErrorResponse,
        ),
        responses(
            BadRequestValidationResponse,
            BadRequestResponse,
            UnprocessableEntityResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "events", description = "Calendar event storage and retrieval")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_registers_error_responses() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");

        for name in [
            "BadRequestValidationResponse",
            "BadRequestResponse",
            "UnprocessableEntityResponse",
            "InternalServerErrorResponse",
        ] {
            assert!(components.responses.contains_key(name), "missing {name}");
        }
        assert!(doc.paths.paths.contains_key("/event/{id}"));
    }
}
