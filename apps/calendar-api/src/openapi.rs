//! OpenAPI documentation configuration

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Simple Calendar Service",
        version = "0.1.0",
        description = "Create calendar events and look them up by id or time range"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        axum_helpers::server::health::health_handler,
        crate::api::health::readiness_check
    ),
    components(schemas(axum_helpers::HealthResponse)),
    tags(
        (name = "health", description = "Liveness and readiness checks")
    )
)]
struct ServiceDoc;

/// Combined OpenAPI documentation for the service
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = ServiceDoc::openapi();
        doc.merge(domain_events::ApiDoc::openapi());
        doc
    }
}
