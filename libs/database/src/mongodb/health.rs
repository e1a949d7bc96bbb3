use mongodb::{Database, bson::doc};
use std::time::Instant;

/// Health check status for MongoDB
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the database answered
    pub healthy: bool,
    /// Error details when unhealthy
    pub message: Option<String>,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

/// Ping `database`, reporting latency and error details
pub async fn check_health(database: &Database) -> HealthStatus {
    let start = Instant::now();
    let result = database.run_command(doc! { "ping": 1 }).await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthStatus {
            healthy: true,
            message: None,
            response_time_ms,
        },
        Err(e) => HealthStatus {
            healthy: false,
            message: Some(e.to_string()),
            response_time_ms,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::Client;
    use mongodb::options::{ClientOptions, ServerAddress};
    use std::time::Duration;

    #[tokio::test]
    async fn test_check_health_unreachable_server() {
        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::parse("127.0.0.1:1").unwrap()];
        options.server_selection_timeout = Some(Duration::from_millis(200));
        let client = Client::with_options(options).unwrap();

        let status = check_health(&client.database("test")).await;
        assert!(!status.healthy);
        assert!(status.message.is_some());
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_check_health() {
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        let status = check_health(&client.database("test")).await;
        assert!(status.healthy);
        assert!(status.message.is_none());
    }
}
