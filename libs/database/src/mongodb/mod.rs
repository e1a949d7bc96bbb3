//! MongoDB connector, health checks and typed document store

mod config;
mod connector;
mod health;
mod store;

pub use config::{DEFAULT_PORT, MongoConfig};
pub use connector::{MongoError, client_options, connect_from_config};
pub use health::{HealthStatus, check_health};
pub use store::{
    DocumentStore, MongoDocumentStore, StoreError, StoreResult, StoredDocument, UpsertOutcome,
    range_filter,
};

// Re-export MongoDB types for convenience
pub use ::mongodb::{Client, Collection, Database, bson};
