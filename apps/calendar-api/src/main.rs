use axum_helpers::server::{create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.address());
    // Connect to MongoDB, failing fast if the server does not answer a ping
    let mongo_client = database::mongodb::connect_from_config(&config.mongodb).await?;

    // Get the database
    let db = mongo_client.database(config.mongodb.database());
    info!(
        "Connected to MongoDB database: {}",
        config.mongodb.database()
    );

    // Initialize the application state
    let state = AppState {
        config,
        mongo_client,
        db,
    };

    // Build router with API and health routes
    let api_routes = api::routes(&state);

    // Create a router with OpenAPI docs
    let app = create_router::<openapi::ApiDoc>(api_routes).await?;

    info!("Starting calendar service (30s shutdown timeout)");

    // Production-ready server with graceful shutdown
    let client = state.mongo_client.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            client.shutdown().await;
            info!("MongoDB connections closed");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Calendar service shutdown complete");
    Ok(())
}
