//! Configuration validation.
//!
//! Semantic checks only; serde already handled syntax. All errors are
//! collected rather than stopping at the first one.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("invalid URL for {field}: '{value}'")]
    Url { field: &'static str, value: String },

    #[error("max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("timeout_secs must be greater than zero when set")]
    ZeroTimeout,

    #[error("invalid allow_origin '{0}'")]
    InvalidOrigin(String),
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let google = &config.google;
    for (field, value) in [
        ("token_url", &google.token_url),
        ("analytics_base_url", &google.analytics_base_url),
    ] {
        if url::Url::parse(value).is_err() {
            errors.push(ValidationError::Url {
                field,
                value: value.clone(),
            });
        }
    }
    if google.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }

    let origin = &config.cors.allow_origin;
    if origin.trim().is_empty() || axum::http::HeaderValue::from_str(origin).is_err() {
        errors.push(ValidationError::InvalidOrigin(origin.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
