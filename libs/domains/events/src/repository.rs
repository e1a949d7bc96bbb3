//! Event repository trait

use crate::error::Result;
use crate::models::Event;
use async_trait::async_trait;
use database::mongodb::UpsertOutcome;

/// Repository trait for event storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Upsert events by id, reporting which were new and which replaced an existing record
    async fn create_events(&self, events: Vec<Event>) -> Result<UpsertOutcome<Event>>;

    /// Get event by id
    async fn get_event_by_id(&self, id: i64) -> Result<Option<Event>>;

    /// Events with `from_time <= time < to_time`
    ///
    /// Bounds use `%Y-%m-%dT%H:%M:%S`. A missing `from_time` defaults to the
    /// start of the current local day and a missing `to_time` to now.
    async fn get_events_by_time_range(
        &self,
        from_time: Option<String>,
        to_time: Option<String>,
    ) -> Result<Vec<Event>>;
}
