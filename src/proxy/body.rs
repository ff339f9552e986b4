//! Request body buffering for forwarding.
//!
//! The inbound body is read exactly once into an owned buffer, then
//! classified by content type. JSON stays text, anything else is forwarded
//! byte for byte.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method};
use serde::de::IgnoredAny;
use tracing::warn;

/// Characters of a JSON body shown in debug logs.
const PREVIEW_CHARS: usize = 100;

/// A buffered request body, ready to send upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundBody {
    /// No body is sent (GET, HEAD, or an unreadable inbound body).
    Empty,
    /// JSON text.
    Json(Bytes),
    /// Opaque bytes, forwarded unchanged.
    Binary(Bytes),
}

impl OutboundBody {
    /// Buffer the inbound body for `method`. Read failures are logged and
    /// the request goes out without a body.
    pub async fn read(method: &Method, headers: &HeaderMap, body: Body, limit: usize) -> Self {
        if method == Method::GET || method == Method::HEAD {
            return OutboundBody::Empty;
        }

        match axum::body::to_bytes(body, limit).await {
            Ok(bytes) => Self::classify(content_type(headers), bytes),
            Err(err) => {
                warn!(error = %err, limit, "Failed to read request body, forwarding without it");
                OutboundBody::Empty
            }
        }
    }

    /// Decide how a buffered body is sent.
    ///
    /// - declared JSON: sent as text; an empty body becomes `{}`
    /// - no content type, but the bytes parse as JSON: sent as JSON
    /// - anything else: raw bytes
    pub fn classify(content_type: Option<&str>, bytes: Bytes) -> Self {
        match content_type {
            Some(ct) if is_json(ct) => {
                if bytes.is_empty() {
                    OutboundBody::Json(Bytes::from_static(b"{}"))
                } else {
                    OutboundBody::Json(bytes)
                }
            }
            None if !bytes.is_empty() && serde_json::from_slice::<IgnoredAny>(&bytes).is_ok() => {
                OutboundBody::Json(bytes)
            }
            _ => OutboundBody::Binary(bytes),
        }
    }

    /// Short text preview for logs. Only JSON bodies are previewed.
    pub fn preview(&self) -> Option<String> {
        match self {
            OutboundBody::Json(bytes) => {
                Some(String::from_utf8_lossy(bytes).chars().take(PREVIEW_CHARS).collect())
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OutboundBody::Empty => 0,
            OutboundBody::Json(bytes) | OutboundBody::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand the payload to the outbound request, defaulting the content
    /// type of JSON bodies that arrived without one.
    pub fn into_payload(self, headers: &mut HeaderMap) -> Option<Bytes> {
        match self {
            OutboundBody::Empty => None,
            OutboundBody::Json(bytes) => {
                if !headers.contains_key(header::CONTENT_TYPE) {
                    headers.insert(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    );
                }
                Some(bytes)
            }
            OutboundBody::Binary(bytes) => Some(bytes),
        }
    }
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
}

fn is_json(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("application/json")
}
