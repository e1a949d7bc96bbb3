//! Typed document store over a single MongoDB collection
//!
//! [`MongoDocumentStore`] exposes the three primitives the domain layers build
//! on: a batched upsert that reports which documents were created and which
//! replaced an existing one, a point lookup, and a half-open range scan.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{self, Bson, Document, doc, spec::ElementType},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashSet;
use std::hash::Hash;
use std::ops::Range;
use tracing::{debug, instrument};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by [`DocumentStore`] implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Range query issued without any bound
    #[error("One of the lower or upper bound must be provided for field '{field}'")]
    InvalidArgument { field: String },

    /// Range bound that is not a datetime
    #[error("The {bound} bound for field '{field}' must be a datetime, got {found:?}")]
    TypeMismatch {
        field: String,
        bound: &'static str,
        found: ElementType,
    },

    /// Batched upsert rejected some statements
    #[error("Bulk upsert failed: {0}")]
    WriteErrors(String),

    /// Batched upsert applied but the write concern was not satisfied
    #[error("Bulk upsert write concern failed: {0}")]
    WriteConcern(String),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("BSON serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("BSON deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),
}

/// A document that carries its own `_id`
///
/// The store never lets the server generate identifiers; every write is keyed
/// by the value returned here.
pub trait StoredDocument {
    fn document_id(&self) -> Bson;
}

/// Partition of a batched upsert
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome<T> {
    /// Documents whose `_id` did not exist before the write
    pub created: Vec<T>,
    /// Documents that replaced an existing `_id`
    pub updated: Vec<T>,
}

impl<T> Default for UpsertOutcome<T> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            updated: Vec::new(),
        }
    }
}

impl<T> UpsertOutcome<T> {
    /// Convert both partitions, stopping at the first conversion error
    pub fn try_map<U, E, F>(self, mut f: F) -> Result<UpsertOutcome<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(UpsertOutcome {
            created: self.created.into_iter().map(&mut f).collect::<Result<_, _>>()?,
            updated: self.updated.into_iter().map(&mut f).collect::<Result<_, _>>()?,
        })
    }

    pub fn len(&self) -> usize {
        self.created.len() + self.updated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Persistence primitives over one logical collection
#[async_trait]
pub trait DocumentStore<D>: Send + Sync
where
    D: Send + Sync + 'static,
{
    /// Upsert every document by `_id` in one batched write
    async fn insert_documents(&self, documents: Vec<D>) -> StoreResult<UpsertOutcome<D>>;

    /// Find the first document matching a field-equality filter
    async fn get_document(&self, query: Document) -> StoreResult<Option<D>>;

    /// Find documents with `lower <= field < upper`; at least one bound is required
    async fn get_documents_by_range(
        &self,
        field: &str,
        lower: Option<Bson>,
        upper: Option<Bson>,
    ) -> StoreResult<Vec<D>>;
}

/// Build the filter for a half-open datetime range on `field`
///
/// Fails before touching the server when both bounds are absent or when a
/// present bound is not a BSON datetime.
pub fn range_filter(field: &str, lower: Option<Bson>, upper: Option<Bson>) -> StoreResult<Document> {
    if lower.is_none() && upper.is_none() {
        return Err(StoreError::InvalidArgument {
            field: field.to_string(),
        });
    }

    let mut range = Document::new();
    if let Some(lower) = lower {
        range.insert("$gte", expect_datetime(field, "lower", lower)?);
    }
    if let Some(upper) = upper {
        range.insert("$lt", expect_datetime(field, "upper", upper)?);
    }

    let mut filter = Document::new();
    filter.insert(field, range);
    Ok(filter)
}

fn expect_datetime(field: &str, bound: &'static str, value: Bson) -> StoreResult<Bson> {
    match value {
        Bson::DateTime(_) => Ok(value),
        other => Err(StoreError::TypeMismatch {
            field: field.to_string(),
            bound,
            found: other.element_type(),
        }),
    }
}

/// Server limit on statements in one write command
const MAX_WRITE_BATCH_SIZE: usize = 100_000;

/// Statement bytes per command, kept under the 16 MiB document limit
const MAX_BATCH_BYTES: usize = 16 * 1024 * 1024 - 16 * 1024;

/// Array key and element type byte around each statement
const STATEMENT_OVERHEAD: usize = 8;

/// Split statements of the given encoded sizes into consecutive batches
///
/// A batch holds at most `max_count` statements and `max_bytes` bytes. A
/// single statement above `max_bytes` still gets its own batch so the server
/// reports the failure.
fn batch_ranges(sizes: &[usize], max_count: usize, max_bytes: usize) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut bytes = 0;

    for (index, &size) in sizes.iter().enumerate() {
        let full = index - start == max_count || (index > start && bytes + size > max_bytes);
        if full {
            ranges.push(start..index);
            start = index;
            bytes = 0;
        }
        bytes += size;
    }

    if start < sizes.len() {
        ranges.push(start..sizes.len());
    }
    ranges
}

/// Reply of the `update` command, reduced to what classification needs
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateReply {
    #[serde(default)]
    upserted: Vec<UpsertedEntry>,
    #[serde(default)]
    write_errors: Vec<WriteErrorEntry>,
    write_concern_error: Option<WriteConcernErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct UpsertedEntry {
    index: usize,
}

#[derive(Debug, Deserialize)]
struct WriteErrorEntry {
    index: usize,
    code: i32,
    errmsg: String,
}

#[derive(Debug, Deserialize)]
struct WriteConcernErrorEntry {
    code: i32,
    #[serde(default)]
    errmsg: String,
}

impl UpdateReply {
    /// Statement indices the server upserted, or the errors it reported
    fn into_upserted(self) -> StoreResult<Vec<usize>> {
        if !self.write_errors.is_empty() {
            let details = self
                .write_errors
                .iter()
                .map(|e| format!("statement {} (code {}): {}", e.index, e.code, e.errmsg))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StoreError::WriteErrors(details));
        }

        if let Some(e) = self.write_concern_error {
            return Err(StoreError::WriteConcern(format!("code {}: {}", e.code, e.errmsg)));
        }

        Ok(self.upserted.into_iter().map(|entry| entry.index).collect())
    }
}

/// Split `documents` into created and updated by `_id`
///
/// Every document sharing an `_id` with an upserted statement is created,
/// so repeats of a new id within one batch are all reported as created.
/// `keys[i]` identifies the `_id` of `documents[i]`.
fn classify<D, K>(documents: Vec<D>, keys: &[K], upserted: &HashSet<usize>) -> UpsertOutcome<D>
where
    K: Hash + Eq,
{
    let created_keys: HashSet<&K> = upserted.iter().filter_map(|&index| keys.get(index)).collect();

    let mut outcome = UpsertOutcome::default();
    for (document, key) in documents.into_iter().zip(keys) {
        if created_keys.contains(key) {
            outcome.created.push(document);
        } else {
            outcome.updated.push(document);
        }
    }
    outcome
}

/// Comparable encoding of an `_id` value
fn id_key(id: &Bson) -> StoreResult<Vec<u8>> {
    Ok(bson::to_vec(&doc! { "_id": id.clone() })?)
}

/// MongoDB-backed [`DocumentStore`]
///
/// The batched upsert is issued as ordered `update` commands with one
/// `{q: {_id}, u: <document>, upsert: true}` statement per document, split
/// only where the server's batch limits require it. Each command's `upserted`
/// array tells which statements inserted, so no existence pre-check is needed.
pub struct MongoDocumentStore<D>
where
    D: Send + Sync,
{
    database: Database,
    collection: Collection<D>,
}

impl<D> Clone for MongoDocumentStore<D>
where
    D: Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            collection: self.collection.clone(),
        }
    }
}

impl<D> MongoDocumentStore<D>
where
    D: Send + Sync,
{
    /// Create a store over `collection_name` in `database`
    pub fn new(database: &Database, collection_name: &str) -> Self {
        Self {
            database: database.clone(),
            collection: database.collection::<D>(collection_name),
        }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<D> {
        &self.collection
    }
}

#[async_trait]
impl<D> DocumentStore<D> for MongoDocumentStore<D>
where
    D: StoredDocument + Serialize + DeserializeOwned + Unpin + Send + Sync + 'static,
{
    #[instrument(skip(self, documents), fields(collection = %self.collection.name(), count = documents.len()))]
    async fn insert_documents(&self, documents: Vec<D>) -> StoreResult<UpsertOutcome<D>> {
        if documents.is_empty() {
            return Ok(UpsertOutcome::default());
        }

        let mut statements = Vec::with_capacity(documents.len());
        let mut sizes = Vec::with_capacity(documents.len());
        let mut keys = Vec::with_capacity(documents.len());
        for document in &documents {
            let id = document.document_id();
            keys.push(id_key(&id)?);

            let statement = doc! {
                "q": { "_id": id },
                "u": bson::to_document(document)?,
                "upsert": true,
                "multi": false,
            };
            sizes.push(bson::to_vec(&statement)?.len() + STATEMENT_OVERHEAD);
            statements.push(statement);
        }

        let mut upserted = HashSet::new();
        for range in batch_ranges(&sizes, MAX_WRITE_BATCH_SIZE, MAX_BATCH_BYTES) {
            debug!(start = range.start, end = range.end, "Sending upsert batch");
            let offset = range.start;
            let reply = self
                .database
                .run_command(doc! {
                    "update": self.collection.name(),
                    "updates": statements[range].to_vec(),
                    "ordered": true,
                })
                .await?;
            let reply: UpdateReply = bson::from_document(reply)?;
            upserted.extend(reply.into_upserted()?.into_iter().map(|index| index + offset));
        }

        let outcome = classify(documents, &keys, &upserted);

        debug!(
            created = outcome.created.len(),
            updated = outcome.updated.len(),
            "Bulk upsert completed"
        );
        Ok(outcome)
    }

    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    async fn get_document(&self, query: Document) -> StoreResult<Option<D>> {
        Ok(self.collection.find_one(query).await?)
    }

    #[instrument(skip(self, lower, upper), fields(collection = %self.collection.name()))]
    async fn get_documents_by_range(
        &self,
        field: &str,
        lower: Option<Bson>,
        upper: Option<Bson>,
    ) -> StoreResult<Vec<D>> {
        let filter = range_filter(field, lower, upper)?;
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }
}
