//! Path matching shared by the session gate and the proxy.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → matcher.rs (exact, prefix and mount matchers)
//!     → auth::routes (classifies the path for the session gate)
//!     → proxy (decides whether the path belongs to the backend)
//! ```
//!
//! # Design Decisions
//! - Matchers compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Path matching is case-sensitive

pub mod matcher;

pub use matcher::{AnyMatcher, ExactMatcher, Matcher, MountMatcher, PathPrefixMatcher};
