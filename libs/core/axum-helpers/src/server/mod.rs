//! Server infrastructure module.
//!
//! - Router setup with OpenAPI documentation and common middleware
//! - Liveness and readiness helpers
//! - Graceful shutdown coordination
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//!
//! let router = create_router::<ApiDoc>(api_routes.merge(health_router())).await?;
//! create_production_app(router, &server_config, Duration::from_secs(30), async {}).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router};
pub use health::{
    HEALTH_MESSAGE, HealthCheckFuture, HealthResponse, health_handler, health_router,
    run_health_checks,
};
pub use shutdown::ShutdownCoordinator;
