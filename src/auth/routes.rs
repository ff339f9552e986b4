//! Route classification for the session gate.
//!
//! Every path falls into exactly one [`RouteClass`]. Classification does not
//! look at the session, so the rules can be checked without any HTTP types.

use std::borrow::Cow;
use std::fmt;

use percent_encoding::percent_decode_str;

use crate::config::AuthConfig;
use crate::routing::{AnyMatcher, ExactMatcher, Matcher, MountMatcher, PathPrefixMatcher};

/// Numeric role carried in the `idrol` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Role(pub i64);

impl Role {
    pub const SUPER_ADMIN: Role = Role(1);
    pub const ADMIN: Role = Role(2);
    pub const EMPLOYEE: Role = Role(3);

    pub fn is_admin(self) -> bool {
        self == Self::SUPER_ADMIN || self == Self::ADMIN
    }

    /// Employees and administrators.
    pub fn is_staff(self) -> bool {
        self.is_admin() || self == Self::EMPLOYEE
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a path requires from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable without a session.
    Public,
    /// Administrators only.
    AdminOnly,
    /// Employees and administrators.
    Staff,
    /// Any authenticated user.
    Protected,
}

impl RouteClass {
    /// Whether a caller holding `role` may reach a route of this class.
    /// Callers must already be authenticated for every class but `Public`.
    pub fn permits(self, role: Option<Role>) -> bool {
        match self {
            RouteClass::Public | RouteClass::Protected => true,
            RouteClass::AdminOnly => role.is_some_and(Role::is_admin),
            RouteClass::Staff => role.is_some_and(Role::is_staff),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RouteClass::Public => "public",
            RouteClass::AdminOnly => "admin",
            RouteClass::Staff => "staff",
            RouteClass::Protected => "protected",
        }
    }
}

/// Compiled path rules, built once at startup.
#[derive(Debug)]
pub struct RoutePolicy {
    exempt: AnyMatcher,
    admin: PathPrefixMatcher,
    staff: PathPrefixMatcher,
}

impl RoutePolicy {
    /// Build the policy from config. Paths under `api_prefix` are exempt
    /// because the backend enforces its own authorization.
    pub fn new(config: &AuthConfig, api_prefix: &str) -> Self {
        let exempt = AnyMatcher::new(vec![
            Box::new(ExactMatcher::new(config.public_paths.iter().cloned())),
            Box::new(MountMatcher::new(api_prefix)),
            Box::new(PathPrefixMatcher::new(config.exempt_prefixes.iter().cloned())),
        ]);

        Self {
            exempt,
            admin: PathPrefixMatcher::new(config.admin_prefixes.iter().cloned()),
            staff: PathPrefixMatcher::new(config.employee_prefixes.iter().cloned()),
        }
    }

    /// Classify a request path. Paths on both the admin and employee lists
    /// are staff routes.
    ///
    /// The path is normalized first, so that encoded or doubled separators
    /// classify the same as the file the static site would serve.
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize_path(path);
        let path = path.as_ref();
        if self.exempt.matches(path) {
            RouteClass::Public
        } else if self.staff.matches(path) {
            RouteClass::Staff
        } else if self.admin.matches(path) {
            RouteClass::AdminOnly
        } else {
            RouteClass::Protected
        }
    }
}

/// Percent-decode `raw`, drop empty and `.` segments and resolve `..`.
/// The result always starts with `/` and has no trailing slash.
pub fn normalize_path(raw: &str) -> Cow<'_, str> {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    let normalized = format!("/{}", segments.join("/"));
    if normalized == raw {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(normalized)
    }
}
