//! API proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Request under the API prefix
//!     → forward.rs (re-base path + query onto the backend origin)
//!     → headers.rs (drop host, connection, content-length)
//!     → body.rs (buffer once; JSON text or raw bytes)
//!     → upstream client (optional insecure TLS, timeouts)
//!     → relay status, headers and streamed body
//!     → on transport error: 502 JSON (http/response.rs)
//! ```
//!
//! # Design Decisions
//! - Single attempt: no retry, backoff or circuit breaking
//! - Redirects from the backend are relayed, not followed
//! - Response bodies stream through without buffering

pub mod body;
pub mod forward;
pub mod headers;

pub use body::OutboundBody;
pub use forward::{forward, BackendProxy, ProxyError};
