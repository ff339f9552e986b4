//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `backend.url`.
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";
/// Environment variable overriding `backend.insecure_tls`.
pub const ENV_BACKEND_INSECURE_TLS: &str = "BACKEND_INSECURE_TLS";
/// Environment variable overriding `auth.jwt_secret`.
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND";
/// Environment variable overriding `site.root`.
pub const ENV_SITE_ROOT: &str = "SITE_ROOT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{name} has an invalid value `{value}`")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply process environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides through `lookup`, so tests can supply their own
/// variables without touching the process environment.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = non_empty(lookup(ENV_BACKEND_URL)) {
        config.backend.url = url;
    }
    if let Some(raw) = non_empty(lookup(ENV_BACKEND_INSECURE_TLS)) {
        config.backend.insecure_tls = parse_flag(&raw).ok_or(ConfigError::Env {
            name: ENV_BACKEND_INSECURE_TLS,
            value: raw,
        })?;
    }
    if let Some(secret) = non_empty(lookup(ENV_JWT_SECRET)) {
        config.auth.jwt_secret = secret;
    }
    if let Some(bind) = non_empty(lookup(ENV_BIND_ADDRESS)) {
        config.listener.bind_address = bind;
    }
    if let Some(root) = non_empty(lookup(ENV_SITE_ROOT)) {
        config.site.root = root;
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_BACKEND_URL, "http://localhost:3000"),
                (ENV_BACKEND_INSECURE_TLS, "true"),
                (ENV_JWT_SECRET, "s3cret"),
            ]),
        )
        .unwrap();

        assert_eq!(config.backend.url, "http://localhost:3000");
        assert!(config.backend.insecure_tls);
        assert_eq!(config.auth.jwt_secret, "s3cret");
    }

    #[test]
    fn test_blank_env_keeps_default() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, env(&[(ENV_BACKEND_URL, "  ")])).unwrap();
        assert_eq!(config.backend.url, "https://api.jesstherapy.cloud");
    }

    #[test]
    fn test_bad_flag_is_rejected() {
        let mut config = GatewayConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_BACKEND_INSECURE_TLS, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: ENV_BACKEND_INSECURE_TLS, .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nbind_address = \"127.0.0.1:9000\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_invalid_file_reports_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[proxy]\napi_prefix = \"api\"").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("proxy.api_prefix"));
    }
}
