use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::http::{cors::cors_layer_from_env, security::security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Creates a configured Axum router with common middleware and documentation.
///
/// This function sets up:
/// - Swagger UI at `/swagger-ui` backed by `/api-docs/openapi.json`
/// - The given routes, merged at the root
/// - Tracing, security headers and response compression
/// - CORS, only when `CORS_ALLOWED_ORIGIN` is set
/// - 404 fallback handler
///
/// Routes must already have their state applied.
///
/// # Errors
/// Returns an error if `CORS_ALLOWED_ORIGIN` contains an invalid header value.
///
/// # Example
/// ```ignore
/// #[derive(OpenApi)]
/// #[openapi(paths(/* your paths */))]
/// struct ApiDoc;
///
/// let routes = Router::new()
///     .route("/example", get(handler))
///     .with_state(my_state);
///
/// let router = create_router::<ApiDoc>(routes).await?;
/// ```
pub async fn create_router<T>(routes: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(routes)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers));

    let router = match cors_layer_from_env()? {
        Some(cors) => router.layer(cors),
        None => router,
    };

    // Compresses responses based on the Accept-Encoding header
    Ok(router.layer(CompressionLayer::new()))
}

/// Serve `router` until SIGINT/SIGTERM, then run `cleanup` bounded by `shutdown_timeout`.
///
/// In-flight requests are drained before `axum::serve` returns.
///
/// # Example
/// ```ignore
/// let cleanup = async move {
///     client.shutdown().await;
/// };
///
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, _rx) = ShutdownCoordinator::new();
    let mut shutdown_rx = coordinator.subscribe();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        let _ = shutdown_rx.recv().await;

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(_) => info!("Cleanup completed successfully"),
            Err(_) => {
                tracing::warn!(
                    "Cleanup exceeded timeout of {:?}, forcing shutdown",
                    shutdown_timeout
                );
            }
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { coordinator.wait_for_signal().await })
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    if serve_result.is_ok() {
        cleanup_handle.await.ok();
    } else {
        cleanup_handle.abort();
    }

    serve_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    #[derive(OpenApi)]
    #[openapi(paths())]
    struct EmptyDoc;

    async fn router() -> Router {
        temp_env::async_with_vars([("CORS_ALLOWED_ORIGIN", None::<&str>)], async {
            create_router::<EmptyDoc>(Router::new().route("/ping", get(|| async { "pong" })))
                .await
                .unwrap()
        })
        .await
    }

    #[tokio::test]
    async fn test_routes_are_merged_at_root() {
        let response = router()
            .await
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_unknown_route_falls_back_to_404() {
        let response = router()
            .await
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let response = router()
            .await
            .oneshot(
                Request::get("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
