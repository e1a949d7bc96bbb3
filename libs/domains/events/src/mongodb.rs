//! MongoDB implementation of EventRepository

use crate::error::Result;
use crate::models::{Event, EventDocument, to_bson_datetime};
use crate::repository::EventRepository;
use crate::time_range::TimeRange;
use async_trait::async_trait;
use database::mongodb::{DocumentStore, MongoDocumentStore, UpsertOutcome};
use mongodb::Database;
use mongodb::bson::{Bson, doc};
use tracing::{debug, instrument};

const TIME_FIELD: &str = "time";

/// Event repository over a [`DocumentStore`] of [`EventDocument`]s
#[derive(Clone)]
pub struct MongoEventRepository<S = MongoDocumentStore<EventDocument>> {
    store: S,
}

impl MongoEventRepository {
    /// Create a repository over `collection` in `database`
    pub fn new(database: &Database, collection: &str) -> Self {
        Self::with_store(MongoDocumentStore::new(database, collection))
    }
}

impl<S> MongoEventRepository<S> {
    pub fn with_store(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> EventRepository for MongoEventRepository<S>
where
    S: DocumentStore<EventDocument>,
{
    #[instrument(skip(self, events), fields(count = events.len()))]
    async fn create_events(&self, events: Vec<Event>) -> Result<UpsertOutcome<Event>> {
        let documents = events.into_iter().map(EventDocument::from).collect();
        let outcome = self.store.insert_documents(documents).await?;

        debug!(
            created = outcome.created.len(),
            updated = outcome.updated.len(),
            "Events upserted"
        );
        outcome.try_map(Event::try_from)
    }

    #[instrument(skip(self))]
    async fn get_event_by_id(&self, id: i64) -> Result<Option<Event>> {
        self.store
            .get_document(doc! { "id": id })
            .await?
            .map(Event::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn get_events_by_time_range(
        &self,
        from_time: Option<String>,
        to_time: Option<String>,
    ) -> Result<Vec<Event>> {
        let range = TimeRange::resolve(from_time.as_deref(), to_time.as_deref())?;
        debug!(from = %range.from, to = %range.to, "Resolved time range");

        let documents = self
            .store
            .get_documents_by_range(
                TIME_FIELD,
                Some(Bson::DateTime(to_bson_datetime(range.from))),
                Some(Bson::DateTime(to_bson_datetime(range.to))),
            )
            .await?;

        documents.into_iter().map(Event::try_from).collect()
    }
}
