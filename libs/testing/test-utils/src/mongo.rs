//! MongoDB test infrastructure
//!
//! Provides a `TestMongo` helper that starts a standalone MongoDB container.

use mongodb::{Client, Database, bson::doc};
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mongo::Mongo;

const MONGO_PORT: u16 = 27017;

/// Test MongoDB wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestMongo;
///
/// # async fn example() {
/// let mongo = TestMongo::new().await;
/// let db = mongo.database("calendar");
/// let events = db.collection::<mongodb::bson::Document>("events");
/// # }
/// ```
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    client: Client,
    pub host: String,
    pub port: u16,
}

impl TestMongo {
    /// Start a container and wait until it answers a ping
    pub async fn new() -> Self {
        let container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host = container
            .get_host()
            .await
            .expect("Failed to get MongoDB host")
            .to_string();
        let port = container
            .get_host_port_ipv4(MONGO_PORT)
            .await
            .expect("Failed to get MongoDB port");

        let client = Client::with_uri_str(format!("mongodb://{}:{}", host, port))
            .await
            .expect("Failed to create MongoDB client");

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .expect("MongoDB did not answer ping");

        tracing::info!(port, "Test MongoDB ready");

        Self {
            container,
            client,
            host,
            port,
        }
    }

    /// Get a cloned client
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Get a handle to `name` on the test server
    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    /// Connection string for manual client creation
    pub fn connection_string(&self) -> String {
        format!("mongodb://{}:{}", self.host, self.port)
    }
}

impl Drop for TestMongo {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test MongoDB container");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Document;

    #[tokio::test]
    async fn test_mongo_insert_find() {
        let mongo = TestMongo::new().await;
        let collection = mongo.database("test").collection::<Document>("items");

        collection
            .insert_one(doc! { "_id": 1_i64, "name": "first" })
            .await
            .unwrap();

        let found = collection
            .find_one(doc! { "_id": 1_i64 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("name").unwrap(), "first");
    }
}
