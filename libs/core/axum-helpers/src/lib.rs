//! # Axum Helpers
//!
//! Shared plumbing for the service's Axum application.
//!
//! ## Modules
//!
//! - **[`server`]**: Router setup, liveness/readiness helpers, graceful shutdown
//! - **[`http`]**: HTTP middleware (CORS, security headers)
//! - **[`errors`]**: Structured error responses with error codes
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let router = create_router::<ApiDoc>(Router::new()).await?;
//!     let config = ServerConfig::default();
//!     create_production_app(router, &config, Duration::from_secs(30), async {}).await
//! }
//! ```

pub mod errors;
pub mod http;
pub mod server;

// Re-export server types
pub use server::{
    HEALTH_MESSAGE, HealthCheckFuture, HealthResponse, ShutdownCoordinator,
    create_production_app, create_router, health_handler, health_router, run_health_checks,
};

// Re-export HTTP middleware
pub use http::{cors_layer_from_env, create_cors_layer, security_headers};

// Re-export error types
pub use errors::{AppError, ErrorCode, ErrorResponse};
