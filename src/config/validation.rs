//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that prefixes are absolute paths
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("backend.url `{0}` is not an http(s) URL")]
    BackendUrl(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("auth.jwt_secret must not be empty")]
    EmptySecret,

    #[error("auth.cookie_name must not be empty")]
    EmptyCookieName,

    #[error("{field} entry `{value}` must start with '/'")]
    RelativePath { field: &'static str, value: String },

    #[error("proxy.api_prefix must name a path below '/'")]
    RootApiPrefix,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "listener.request_timeout_secs" });
    }

    match Url::parse(&config.backend.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::BackendUrl(config.backend.url.clone())),
    }
    if config.backend.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "backend.timeout_secs" });
    }
    if config.backend.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "backend.connect_timeout_secs" });
    }

    check_absolute(&mut errors, "proxy.api_prefix", std::slice::from_ref(&config.proxy.api_prefix));
    if config.proxy.api_prefix.trim_end_matches('/').is_empty() {
        errors.push(ValidationError::RootApiPrefix);
    }
    if config.proxy.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "proxy.max_body_bytes" });
    }

    let auth = &config.auth;
    if auth.jwt_secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    if auth.cookie_name.is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    }
    check_absolute(&mut errors, "auth.login_path", std::slice::from_ref(&auth.login_path));
    check_absolute(&mut errors, "auth.public_paths", &auth.public_paths);
    check_absolute(&mut errors, "auth.exempt_prefixes", &auth.exempt_prefixes);
    check_absolute(&mut errors, "auth.admin_prefixes", &auth.admin_prefixes);
    check_absolute(&mut errors, "auth.employee_prefixes", &auth.employee_prefixes);

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

fn check_absolute(errors: &mut Vec<ValidationError>, field: &'static str, values: &[String]) {
    for value in values {
        if !value.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                field,
                value: value.clone(),
            });
        }
    }
}
