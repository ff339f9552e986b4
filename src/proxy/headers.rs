//! Header manipulation for forwarded traffic.
//!
//! # Responsibilities
//! - Strip headers that describe the inbound hop before forwarding
//! - Strip hop-by-hop headers from the backend response
//!
//! # Design Decisions
//! - `host` is dropped so the backend sees its own virtual host
//! - `content-length` is dropped; the client recomputes it from the buffered body
//! - Everything else (cookies, authorization, x-request-id) passes through

use axum::http::{header, HeaderMap, HeaderName};

/// Request headers never sent to the backend.
pub const STRIPPED_REQUEST_HEADERS: [HeaderName; 3] =
    [header::HOST, header::CONNECTION, header::CONTENT_LENGTH];

/// Response headers scoped to the backend connection.
const HOP_BY_HOP_RESPONSE_HEADERS: [&str; 3] = ["connection", "keep-alive", "transfer-encoding"];

/// Copy inbound request headers minus the ones bound to this hop.
pub fn forward_request_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = incoming.clone();
    for name in &STRIPPED_REQUEST_HEADERS {
        headers.remove(name);
    }
    headers
}

/// Copy backend response headers minus hop-by-hop ones.
pub fn relay_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    for name in HOP_BY_HOP_RESPONSE_HEADERS {
        headers.remove(name);
    }
    headers
}
