//! Session gate subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → routes.rs (classify path: public / admin / staff / protected)
//!     → [public] continue untouched
//!     → token.rs (verify `auth_token` cookie, extract `idrol`)
//!     → routes.rs (does the role permit this class?)
//!     → continue with Session extension, or 302 to the login path
//! ```
//!
//! # Design Decisions
//! - Classification is a pure function of the path
//! - A cookie that fails verification is deleted on the redirect
//! - Denials never explain themselves to the client

pub mod middleware;
pub mod routes;
pub mod token;

pub use middleware::{require_session, AuthGate, Decision, Denial};
pub use routes::{Role, RouteClass, RoutePolicy};
pub use token::{Session, TokenError, TokenVerifier};
