use mongodb::{
    Client,
    bson::doc,
    options::{ClientOptions, Credential, ServerAddress},
};
use std::time::Duration;
use tracing::info;

use super::MongoConfig;

/// Error type for MongoDB connection setup
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Translate a [`MongoConfig`] into driver options
///
/// A credential is attached only when a username is configured.
pub fn client_options(config: &MongoConfig) -> Result<ClientOptions, MongoError> {
    let mut options = ClientOptions::default();

    options.hosts = vec![ServerAddress::parse(config.address())?];
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));
    options.app_name = config.app_name.clone();

    if let Some(ref username) = config.username {
        let mut credential = Credential::default();
        credential.username = Some(username.clone());
        credential.password = config.password.clone();
        credential.source = config.auth_source.clone();
        options.credential = Some(credential);
    }

    Ok(options)
}

/// Connect using a MongoConfig and verify the server answers a ping
///
/// There is no retry: a misconfigured or unreachable server fails startup.
///
/// # Example
/// ```ignore
/// use database::mongodb::{MongoConfig, connect_from_config};
///
/// let config = MongoConfig::new("localhost", "calendar");
/// let client = connect_from_config(&config).await?;
/// ```
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    info!(address = %config.address(), database = %config.database, "Connecting to MongoDB");

    let client = Client::with_options(client_options(config)?)?;

    client
        .database(&config.database)
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}
