//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → auth gate, then one of:
//!         proxy (API prefix) | documents.rs (consent PDF) | static site
//!     → response.rs (gateway-generated error bodies)
//! ```

pub mod documents;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
