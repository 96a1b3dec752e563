//! CORS middleware.
//!
//! Wrapper around tower-http CORS. Cross-origin access is limited to the one
//! configured origin.

use crate::domain::config::{ConfigError, CorsConfig};
use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Create CORS layer from gateway config
pub fn create_cors_layer(config: &CorsConfig) -> Result<CorsLayer, ConfigError> {
    if !config.enabled {
        // No allowed origin: browsers refuse every cross-origin call
        return Ok(CorsLayer::new());
    }

    let origin: HeaderValue = config.allowed_origin.parse().map_err(|_| {
        ConfigError::Invalid(format!("invalid CORS origin: {}", config.allowed_origin))
    })?;

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    let headers: Vec<HeaderName> = config
        .allowed_headers
        .iter()
        .filter_map(|h| h.parse().ok())
        .collect();

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods(methods)
        .allow_headers(headers)
        .max_age(Duration::from_secs(config.max_age)))
}
