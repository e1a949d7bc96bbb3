//! Repository and store behaviour against a real MongoDB container

use database::mongodb::{
    DocumentStore, MongoDocumentStore, StoreError, UpsertOutcome,
    bson::{Bson, doc},
};
use domain_events::{
    Event, EventDocument, EventRepository, MongoEventRepository, parse_timestamp,
};
use test_utils::{TestDataBuilder, TestMongo, assertions::assert_same_elements};

const COLLECTION: &str = "events";

fn event(id: i64, description: &str, time: &str) -> Event {
    Event::new(id, Some(description.to_string()), parse_timestamp(time).unwrap())
}

fn ids(events: &[Event]) -> Vec<i64> {
    events.iter().map(|e| e.id).collect()
}

async fn setup(test_name: &str) -> (TestMongo, MongoEventRepository) {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name(test_name);
    let db = mongo.database(&builder.name("db", "events"));
    let repo = MongoEventRepository::new(&db, COLLECTION);
    (mongo, repo)
}

#[tokio::test]
async fn test_upsert_classifies_created_then_updated() {
    let (_mongo, repo) = setup("test_upsert_classifies_created_then_updated").await;

    let events = vec![
        event(1, "one", "2024-01-10T00:00:00"),
        event(2, "two", "2024-01-15T00:00:00"),
        event(3, "three", "2024-01-20T00:00:00"),
    ];

    let first = repo.create_events(events.clone()).await.unwrap();
    assert_eq!(first.created.len(), 3);
    assert!(first.updated.is_empty());

    let second = repo.create_events(events).await.unwrap();
    assert!(second.created.is_empty());
    assert_eq!(second.updated.len(), 3);
}

#[tokio::test]
async fn test_mixed_batch_and_replacement() {
    let (_mongo, repo) = setup("test_mixed_batch_and_replacement").await;

    repo.create_events(vec![event(1, "original", "2024-01-10T00:00:00")])
        .await
        .unwrap();

    let outcome = repo
        .create_events(vec![
            event(1, "replaced", "2024-01-11T08:00:00"),
            event(2, "new", "2024-01-12T00:00:00"),
        ])
        .await
        .unwrap();

    assert_eq!(ids(&outcome.created), vec![2]);
    assert_eq!(ids(&outcome.updated), vec![1]);

    let stored = repo.get_event_by_id(1).await.unwrap().unwrap();
    assert_eq!(stored, event(1, "replaced", "2024-01-11T08:00:00"));
}

#[tokio::test]
async fn test_repeated_new_id_in_one_batch() {
    let (_mongo, repo) = setup("test_repeated_new_id_in_one_batch").await;

    let outcome = repo
        .create_events(vec![
            event(1, "draft", "2024-01-10T00:00:00"),
            event(1, "final", "2024-01-10T09:00:00"),
        ])
        .await
        .unwrap();

    assert_eq!(ids(&outcome.created), vec![1, 1]);
    assert!(outcome.updated.is_empty());

    // Last statement wins
    let stored = repo.get_event_by_id(1).await.unwrap().unwrap();
    assert_eq!(stored, event(1, "final", "2024-01-10T09:00:00"));

    let again = repo
        .create_events(vec![event(1, "again", "2024-01-10T10:00:00")])
        .await
        .unwrap();
    assert!(again.created.is_empty());
    assert_eq!(ids(&again.updated), vec![1]);
}

#[tokio::test]
async fn test_empty_batch() {
    let (_mongo, repo) = setup("test_empty_batch").await;

    let outcome = repo.create_events(vec![]).await.unwrap();
    assert!(outcome.is_empty());
}

#[tokio::test]
async fn test_read_back_after_create() {
    let (_mongo, repo) = setup("test_read_back_after_create").await;
    let created = event(7, "retro", "2024-02-29T17:45:30");

    repo.create_events(vec![created.clone()]).await.unwrap();

    assert_eq!(repo.get_event_by_id(7).await.unwrap(), Some(created));
    assert!(repo.get_event_by_id(8).await.unwrap().is_none());
}

#[tokio::test]
async fn test_time_range_is_half_open() {
    let (_mongo, repo) = setup("test_time_range_is_half_open").await;

    repo.create_events(vec![
        event(1, "a", "2024-01-10T00:00:00"),
        event(2, "b", "2024-01-15T00:00:00"),
        event(3, "c", "2024-01-20T00:00:00"),
    ])
    .await
    .unwrap();

    let found = repo
        .get_events_by_time_range(
            Some("2024-01-10T00:00:00".into()),
            Some("2024-01-16T00:00:00".into()),
        )
        .await
        .unwrap();
    assert_same_elements(ids(&found), vec![1, 2], "[01-10, 01-16)");

    let found = repo
        .get_events_by_time_range(
            Some("2024-01-14T00:00:00".into()),
            Some("2024-01-21T00:00:00".into()),
        )
        .await
        .unwrap();
    assert_same_elements(ids(&found), vec![2, 3], "[01-14, 01-21)");

    let found = repo
        .get_events_by_time_range(
            Some("2024-01-15T00:00:00".into()),
            Some("2024-01-20T00:00:00".into()),
        )
        .await
        .unwrap();
    assert_same_elements(ids(&found), vec![2], "upper bound excluded");
}

#[tokio::test]
async fn test_document_layout() {
    let mongo = TestMongo::new().await;
    let db = mongo.database("layout");
    let repo = MongoEventRepository::new(&db, COLLECTION);

    repo.create_events(vec![event(11, "layout", "2024-01-10T06:30:00")])
        .await
        .unwrap();

    let raw = db
        .collection::<mongodb::bson::Document>(COLLECTION)
        .find_one(doc! { "_id": 11_i64 })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(raw.get_i64("id").unwrap(), 11);
    assert_eq!(raw.get_str("description").unwrap(), "layout");
    assert_eq!(
        raw.get_datetime("time").unwrap().timestamp_millis(),
        parse_timestamp("2024-01-10T06:30:00")
            .unwrap()
            .and_utc()
            .timestamp_millis()
    );
}

#[tokio::test]
async fn test_store_range_argument_checks() {
    let mongo = TestMongo::new().await;
    let store = MongoDocumentStore::<EventDocument>::new(&mongo.database("checks"), COLLECTION);

    let err = store
        .get_documents_by_range("time", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument { .. }));

    let err = store
        .get_documents_by_range("time", Some(Bson::String("2024-01-01".into())), None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::TypeMismatch { .. }));
}

#[tokio::test]
async fn test_store_upsert_outcome_carries_documents() {
    let mongo = TestMongo::new().await;
    let store = MongoDocumentStore::<EventDocument>::new(&mongo.database("outcome"), COLLECTION);

    let document = EventDocument::from(event(21, "x", "2024-01-10T00:00:00"));
    let outcome: UpsertOutcome<EventDocument> =
        store.insert_documents(vec![document.clone()]).await.unwrap();
    assert_eq!(outcome.created, vec![document.clone()]);

    let found = store.get_document(doc! { "id": 21_i64 }).await.unwrap();
    assert_eq!(found, Some(document));
}
