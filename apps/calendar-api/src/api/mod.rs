//! HTTP routes of the calendar service

pub mod events;
pub mod health;

use crate::state::AppState;
use axum::Router;

/// Create all API routes, already bound to their state
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(events::router(state))
        .merge(health::router(state.clone()))
        .merge(axum_helpers::health_router())
}
