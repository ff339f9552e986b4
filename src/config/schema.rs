//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Placeholder shared secret. Startup warns while it is still in use.
pub const PLACEHOLDER_JWT_SECRET: &str = "secret_dev_key_change_in_prod";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend origin that `/api` traffic is forwarded to.
    pub backend: BackendConfig,

    /// Proxy route settings.
    pub proxy: ProxySettings,

    /// Session gate settings.
    pub auth: AuthConfig,

    /// Static site served behind the gate.
    pub site: SiteConfig,

    /// Consent document settings.
    pub consent: ConsentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4321").
    pub bind_address: String,

    /// Total time allowed for a single inbound request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4321".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Backend origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Origin URL; the inbound path and query are re-based onto it.
    pub url: String,

    /// Accept certificates the default trust store rejects.
    /// Only for internal backends with self-signed certificates.
    pub insecure_tls: bool,

    /// Outbound request timeout in seconds.
    pub timeout_secs: u64,

    /// Outbound connect timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "https://api.jesstherapy.cloud".to_string(),
            insecure_tls: false,
            timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}

/// Proxy route configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Reserved path prefix forwarded to the backend.
    pub api_prefix: String,

    /// Largest request body buffered for forwarding, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Session gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret shared with the backend that issues session tokens.
    pub jwt_secret: String,

    /// Cookie carrying the session token.
    pub cookie_name: String,

    /// Where unauthenticated or unauthorized requests are sent.
    pub login_path: String,

    /// Pages reachable without a session (exact match).
    pub public_paths: Vec<String>,

    /// Framework asset prefixes that bypass the gate.
    pub exempt_prefixes: Vec<String>,

    /// Prefixes reserved for administrators (roles 1 and 2).
    pub admin_prefixes: Vec<String>,

    /// Prefixes open to employees and administrators (roles 1, 2 and 3).
    pub employee_prefixes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Set JWT_SECRET in production.
            jwt_secret: PLACEHOLDER_JWT_SECRET.to_string(),
            cookie_name: "auth_token".to_string(),
            login_path: "/".to_string(),
            public_paths: strings(&["/", "/LogPaciente", "/favicon.ico", "/LogoJess.png"]),
            exempt_prefixes: strings(&["/_image", "/_astro"]),
            admin_prefixes: strings(&[
                "/dashboardAdmin",
                "/configuracion",
                "/Empleado",
                "/Agenda",
                "/HistorialCita",
                "/Pago",
                "/Paciente",
                "/ProductoServicio",
                "/Roles",
                "/RolesPermiso",
            ]),
            employee_prefixes: strings(&[
                "/dashboardEmpleado",
                "/Paciente",
                "/Agenda",
                "/ProductoServicio",
            ]),
        }
    }
}

/// Static site configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory holding the built front end.
    pub root: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: "dist".to_string(),
        }
    }
}

/// Consent document configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsentConfig {
    /// Clinic name printed in the document header.
    pub clinic_name: String,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            clinic_name: "JessTherapy".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) used when RUST_LOG is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [backend]
            url = "http://localhost:3000"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.url, "http://localhost:3000");
        assert!(!config.backend.insecure_tls);
        assert_eq!(config.auth.cookie_name, "auth_token");
        assert_eq!(config.proxy.api_prefix, "/api");
        assert_eq!(config.listener.bind_address, "0.0.0.0:4321");
    }

    #[test]
    fn test_log_format_parses_lowercase() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
