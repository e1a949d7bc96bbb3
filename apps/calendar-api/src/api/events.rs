//! Events API routes

use crate::state::AppState;
use axum::Router;
use domain_events::{EventService, MongoEventRepository};
use std::sync::Arc;
use tracing::info;

/// Create the events router over the configured collection
pub fn router(state: &AppState) -> Router {
    let collection = &state.config.events_collection;
    let repository = MongoEventRepository::new(&state.db, collection);
    info!("Serving events from collection '{}'", collection);

    domain_events::events_router().with_state(Arc::new(EventService::new(repository)))
}
