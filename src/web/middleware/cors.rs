//! CORS configuration.

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

/// Create a CORS layer from the configured origins.
///
/// With no configured origins any origin is allowed, which is only
/// appropriate for development setups.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}
