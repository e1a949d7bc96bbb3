//! Database library providing MongoDB connectivity and a typed document store
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connector, health checks and [`mongodb::DocumentStore`]
//! - `config` - Loading [`mongodb::MongoConfig`] through `core_config::FromEnv`
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, MongoDocumentStore, connect_from_config};
//!
//! let config = MongoConfig::new("localhost", "calendar");
//! let client = connect_from_config(&config).await?;
//! let db = client.database(config.database());
//! let store = MongoDocumentStore::<MyDocument>::new(&db, "events");
//! ```

#[cfg(feature = "mongodb")]
pub mod mongodb;
