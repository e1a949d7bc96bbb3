//! HTTP middleware module.
//!
//! - CORS configuration from `CORS_ALLOWED_ORIGIN`
//! - Security headers
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::{cors_layer_from_env, security_headers};
//!
//! let mut app = Router::new().layer(axum::middleware::from_fn(security_headers));
//! if let Some(cors) = cors_layer_from_env()? {
//!     app = app.layer(cors);
//! }
//! ```

pub mod cors;
pub mod security;

pub use cors::{CORS_ALLOWED_ORIGIN, cors_layer_from_env, create_cors_layer, parse_allowed_origins};
pub use security::security_headers;
