use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Environment variable holding comma-separated allowed origins
pub const CORS_ALLOWED_ORIGIN: &str = "CORS_ALLOWED_ORIGIN";

/// Creates a CORS layer for the given origins.
///
/// - Methods: GET, POST, OPTIONS
/// - Headers: Content-Type, Accept
/// - 1 hour max age
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Parse a comma-separated origin list, skipping blank entries.
pub fn parse_allowed_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid {} value: {}", CORS_ALLOWED_ORIGIN, e),
            )
        })
}

/// Build the CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// Returns `Ok(None)` when the variable is unset or lists no origins, in which
/// case no CORS headers are emitted at all.
pub fn cors_layer_from_env() -> io::Result<Option<CorsLayer>> {
    let Ok(raw) = std::env::var(CORS_ALLOWED_ORIGIN) else {
        return Ok(None);
    };

    let origins = parse_allowed_origins(&raw)?;
    if origins.is_empty() {
        return Ok(None);
    }

    tracing::info!("CORS configured with allowed origins: {}", raw);
    Ok(Some(create_cors_layer(origins)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins() {
        let origins =
            parse_allowed_origins("http://localhost:3000, https://example.com,,").unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "https://example.com");
    }

    #[test]
    fn test_parse_allowed_origins_rejects_invalid_header() {
        assert!(parse_allowed_origins("http://bad\norigin").is_err());
    }

    #[test]
    fn test_cors_layer_from_env_unset() {
        temp_env::with_var(CORS_ALLOWED_ORIGIN, None::<&str>, || {
            assert!(cors_layer_from_env().unwrap().is_none());
        });
    }

    #[test]
    fn test_cors_layer_from_env_set() {
        temp_env::with_var(CORS_ALLOWED_ORIGIN, Some("http://localhost:3000"), || {
            assert!(cors_layer_from_env().unwrap().is_some());
        });
    }
}
