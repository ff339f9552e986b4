//! Clinic front-end gateway library.
//!
//! Serves the built site, relays `/api/*` to the backend origin, gates
//! pages on the role carried by the session cookie, and renders signed
//! consent documents as PDF.

pub mod auth;
pub mod config;
pub mod consent;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
