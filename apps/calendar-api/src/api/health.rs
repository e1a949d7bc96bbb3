//! Readiness endpoint

use crate::state::AppState;
use axum::response::IntoResponse;
use axum::{Router, extract::State, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::mongodb::check_health;
use tracing::debug;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// Readiness check. Pings MongoDB.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "All dependencies reachable", body = serde_json::Value,
            example = json!({ "status": "ready", "mongodb": true })),
        (status = 503, description = "A dependency is unreachable", body = serde_json::Value,
            example = json!({ "status": "not ready", "mongodb": false }))
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let mongodb: HealthCheckFuture<'_> = Box::pin(async {
        let status = check_health(&state.db).await;
        debug!(response_time_ms = status.response_time_ms, "MongoDB ping");
        if status.healthy {
            Ok(())
        } else {
            Err(status.message.unwrap_or_else(|| "ping failed".to_string()))
        }
    });

    run_health_checks(vec![("mongodb", mongodb)]).await
}
