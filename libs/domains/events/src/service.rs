//! Event service layer

use crate::error::{EventError, NO_RECORD_FOUND, NO_RECORDS_FOUND, Result};
use crate::models::{Event, FormattedEvent};
use crate::repository::EventRepository;
use database::mongodb::UpsertOutcome;
use serde_json::Value;
use tracing::{info, instrument};

/// Boundary between HTTP handlers and the repository
pub struct EventService<R: EventRepository> {
    repository: R,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Validate raw request items and upsert them
    ///
    /// Nothing is written unless every item is valid.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn create_events(&self, items: Vec<Value>) -> Result<UpsertOutcome<FormattedEvent>> {
        let events = items
            .iter()
            .map(Event::from_json)
            .collect::<Result<Vec<_>>>()?;

        let outcome = self.repository.create_events(events).await?;
        info!(
            created = outcome.created.len(),
            updated = outcome.updated.len(),
            "Events stored"
        );

        outcome.try_map(|event| event.format_time(None))
    }

    /// Get one event with its time rendered by `datetime_format`
    #[instrument(skip(self))]
    pub async fn get_event(&self, id: i64, datetime_format: Option<&str>) -> Result<FormattedEvent> {
        let event = self
            .repository
            .get_event_by_id(id)
            .await?
            .ok_or_else(|| EventError::NotFound(NO_RECORD_FOUND.to_string()))?;

        event.format_time(datetime_format)
    }

    /// List events in `[from_time, to_time)` with times rendered by `datetime_format`
    #[instrument(skip(self))]
    pub async fn list_events(
        &self,
        from_time: Option<String>,
        to_time: Option<String>,
        datetime_format: Option<&str>,
    ) -> Result<Vec<FormattedEvent>> {
        let events = self
            .repository
            .get_events_by_time_range(from_time, to_time)
            .await?;

        if events.is_empty() {
            return Err(EventError::NotFound(NO_RECORDS_FOUND.to_string()));
        }

        events
            .iter()
            .map(|event| event.format_time(datetime_format))
            .collect()
    }
}
