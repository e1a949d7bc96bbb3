//! HTTP handlers for events API

use crate::models::FormattedEvent;
use crate::repository::EventRepository;
use crate::service::EventService;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_helpers::AppError;
use axum_helpers::errors::responses::{
    BadRequestResponse, BadRequestValidationResponse, InternalServerErrorResponse,
    UnprocessableEntityResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

pub const CREATED_MESSAGE: &str = "Successfully created events";
pub const RETRIEVED_MESSAGE: &str = "Successfully retrieved event";

/// Events router state
pub type EventsState<R> = Arc<EventService<R>>;

/// Create the events router
pub fn events_router<R: EventRepository + 'static>() -> Router<EventsState<R>> {
    Router::new()
        .route("/events", post(create_events::<R>).get(list_events::<R>))
        .route("/event/{id}", get(get_event::<R>))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventsResponse {
    pub created_events: Vec<FormattedEvent>,
    pub updated_events: Vec<FormattedEvent>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedEventResponse {
    pub retrieved_event: FormattedEvent,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedEventsResponse {
    pub retrieved_events: Vec<FormattedEvent>,
    pub message: String,
}

/// Output formatting options
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormatQuery {
    /// strftime-compatible pattern, default `%Y-%m-%dT%H:%M:%S`
    pub datetime_format: Option<String>,
}

/// Time window and output formatting options
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimeRangeQuery {
    /// Inclusive lower bound (`%Y-%m-%dT%H:%M:%S`), default start of today
    pub from_time: Option<String>,
    /// Exclusive upper bound (`%Y-%m-%dT%H:%M:%S`), default now
    pub to_time: Option<String>,
    /// strftime-compatible pattern, default `%Y-%m-%dT%H:%M:%S`
    pub datetime_format: Option<String>,
}

/// Create or replace events
#[utoipa::path(
    post,
    path = "/events",
    request_body(
        content = Vec<serde_json::Value>,
        description = "Events as `{id, description?, time}` with time in `%Y-%m-%dT%H:%M:%S`",
        example = json!([{ "id": 1, "description": "standup", "time": "2024-01-01T09:00:00" }])
    ),
    responses(
        (status = 200, description = "Events stored", body = CreateEventsResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state, body))]
pub async fn create_events<R: EventRepository>(
    State(state): State<EventsState<R>>,
    body: Result<Json<Vec<Value>>, JsonRejection>,
) -> Result<Json<CreateEventsResponse>, AppError> {
    let Json(items) = body?;
    let outcome = state.create_events(items).await?;

    Ok(Json(CreateEventsResponse {
        created_events: outcome.created,
        updated_events: outcome.updated,
        message: CREATED_MESSAGE.to_string(),
    }))
}

/// Get event by id
#[utoipa::path(
    get,
    path = "/event/{id}",
    params(
        ("id" = i64, Path, description = "Event id"),
        FormatQuery
    ),
    responses(
        (status = 200, description = "Event found", body = RetrievedEventResponse),
        (status = 400, response = BadRequestResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state, path, query))]
pub async fn get_event<R: EventRepository>(
    State(state): State<EventsState<R>>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<FormatQuery>, QueryRejection>,
) -> Result<Json<RetrievedEventResponse>, AppError> {
    let Path(id) = path?;
    let Query(query) = query?;

    let event = state.get_event(id, query.datetime_format.as_deref()).await?;

    Ok(Json(RetrievedEventResponse {
        retrieved_event: event,
        message: RETRIEVED_MESSAGE.to_string(),
    }))
}

/// List events in a time window
#[utoipa::path(
    get,
    path = "/events",
    params(TimeRangeQuery),
    responses(
        (status = 200, description = "Events found", body = RetrievedEventsResponse),
        (status = 400, response = BadRequestResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state, query))]
pub async fn list_events<R: EventRepository>(
    State(state): State<EventsState<R>>,
    query: Result<Query<TimeRangeQuery>, QueryRejection>,
) -> Result<Json<RetrievedEventsResponse>, AppError> {
    let Query(TimeRangeQuery {
        from_time,
        to_time,
        datetime_format,
    }) = query?;

    let events = state
        .list_events(from_time, to_time, datetime_format.as_deref())
        .await?;

    Ok(Json(RetrievedEventsResponse {
        retrieved_events: events,
        message: RETRIEVED_MESSAGE.to_string(),
    }))
}
