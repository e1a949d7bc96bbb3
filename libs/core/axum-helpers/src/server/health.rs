use axum::{Json, Router, http::StatusCode, routing::get};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;
use utoipa::ToSchema;

/// Body returned by the liveness endpoint
pub const HEALTH_MESSAGE: &str = "Health endpoint is reachable";

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[serde(rename = "Message")]
    pub message: String,
}

/// A boxed future for health checks with a string error
pub type HealthCheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Runs multiple readiness checks concurrently and aggregates the results.
///
/// The body is `{"status": "ready" | "not ready", "<name>": bool, ...}`; the
/// status code is 200 when every check passed and 503 otherwise.
///
/// # Example
/// ```ignore
/// let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
///     "mongodb",
///     Box::pin(async { ping(db).await.map_err(|e| e.to_string()) }),
/// )];
/// run_health_checks(checks).await
/// ```
pub async fn run_health_checks(checks: Vec<(&str, HealthCheckFuture<'_>)>) -> (StatusCode, Json<Value>) {
    let names: Vec<_> = checks.iter().map(|(name, _)| *name).collect();
    let futures: Vec<_> = checks.into_iter().map(|(_, check)| check).collect();
    let results = join_all(futures).await;

    let mut body = Map::new();
    let mut all_healthy = true;

    for (name, result) in names.into_iter().zip(results) {
        let healthy = match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Readiness check failed: {} error: {:?}", name, e);
                all_healthy = false;
                false
            }
        };
        body.insert(name.to_string(), json!(healthy));
    }

    body.insert(
        "status".to_string(),
        json!(if all_healthy { "ready" } else { "not ready" }),
    );

    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(Value::Object(body)))
}

/// Liveness endpoint. Always 200 while the process serves requests.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: HEALTH_MESSAGE.to_string(),
    })
}

/// Creates a router with the /health endpoint.
pub fn health_router() -> Router {
    Router::new().route("/health", get(health_handler))
}
