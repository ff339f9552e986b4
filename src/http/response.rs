//! Error responses produced by the gateway itself.
//!
//! # Design Decisions
//! - Backend transport failures map to 502 with a JSON body
//! - The body names the target URL so operators can see what was attempted

use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use url::Url;

/// Error tag for backend transport failures.
pub const BACKEND_UNAVAILABLE: &str = "Backend unavailable";

/// Body of the 502 returned when the backend cannot be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyFailure {
    pub error: String,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    pub target: String,
}

impl ProxyFailure {
    pub fn from_error(err: &(dyn StdError + 'static), target: &Url) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(inner) = source {
            chain.push(inner.to_string());
            source = inner.source();
        }

        Self {
            error: BACKEND_UNAVAILABLE.to_string(),
            details: err.to_string(),
            cause: (!chain.is_empty()).then(|| chain.join(": ")),
            target: target.to_string(),
        }
    }
}

impl IntoResponse for ProxyFailure {
    fn into_response(self) -> Response {
        (StatusCode::BAD_GATEWAY, Json(self)).into_response()
    }
}
