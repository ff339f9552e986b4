//! Session gate middleware.
//! Enforces a valid session cookie and role-based path rules.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{debug, warn};

use crate::auth::routes::{Role, RouteClass, RoutePolicy};
use crate::auth::token::{Session, TokenError, TokenVerifier};
use crate::config::GatewayConfig;
use crate::observability::metrics;

/// Why a request was turned away.
#[derive(Debug)]
pub enum Denial {
    /// No session cookie on a gated path.
    MissingToken,
    /// The cookie failed verification; it gets cleared.
    InvalidToken(TokenError),
    /// The session's role may not reach this route class.
    Forbidden { class: RouteClass, role: Option<Role> },
}

impl Denial {
    fn clears_cookie(&self) -> bool {
        matches!(self, Denial::InvalidToken(_))
    }

    fn outcome(&self) -> &'static str {
        match self {
            Denial::MissingToken => "missing_token",
            Denial::InvalidToken(_) => "invalid_token",
            Denial::Forbidden { .. } => "forbidden",
        }
    }
}

/// Outcome of running the gate on one request.
#[derive(Debug)]
pub enum Decision {
    /// Continue; `None` for exempt paths where no session was inspected.
    Allow(Option<Session>),
    Deny(Denial),
}

/// State shared by every invocation of [`require_session`].
#[derive(Debug)]
pub struct AuthGate {
    policy: RoutePolicy,
    verifier: TokenVerifier,
    cookie_name: String,
    login_path: String,
}

impl AuthGate {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            policy: RoutePolicy::new(&config.auth, &config.proxy.api_prefix),
            verifier: TokenVerifier::new(config.auth.jwt_secret.as_bytes()),
            cookie_name: config.auth.cookie_name.clone(),
            login_path: config.auth.login_path.clone(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Decide what to do with a request for `path` carrying `token`.
    pub fn decide(&self, path: &str, token: Option<&str>) -> Decision {
        let class = self.policy.classify(path);
        if class == RouteClass::Public {
            return Decision::Allow(None);
        }

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Decision::Deny(Denial::MissingToken);
        };

        let session = match self.verifier.verify(token) {
            Ok(session) => session,
            Err(err) => return Decision::Deny(Denial::InvalidToken(err)),
        };

        if class.permits(session.role) {
            Decision::Allow(Some(session))
        } else {
            Decision::Deny(Denial::Forbidden {
                class,
                role: session.role,
            })
        }
    }

    fn redirect(&self) -> Response {
        (
            StatusCode::FOUND,
            [(header::LOCATION, self.login_path.clone())],
        )
            .into_response()
    }
}

/// Middleware run before every page. Denied requests are redirected to the
/// login path; an invalid cookie is also deleted.
pub async fn require_session(
    State(gate): State<Arc<AuthGate>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let token = jar.get(gate.cookie_name()).map(|c| c.value().to_owned());

    match gate.decide(&path, token.as_deref()) {
        Decision::Allow(session) => {
            if let Some(session) = session {
                debug!(path = %path, role = ?session.role, "Session accepted");
                metrics::record_auth_decision("allowed");
                req.extensions_mut().insert(session);
            }
            next.run(req).await
        }
        Decision::Deny(denial) => {
            match &denial {
                Denial::MissingToken => debug!(path = %path, "No session cookie, redirecting"),
                Denial::InvalidToken(err) => {
                    warn!(path = %path, error = %err, "Session token verification failed")
                }
                Denial::Forbidden { class, role } => warn!(
                    path = %path,
                    route_class = class.as_str(),
                    role = ?role,
                    "Access denied for role"
                ),
            }
            metrics::record_auth_decision(denial.outcome());

            if denial.clears_cookie() {
                let removal = Cookie::build((gate.cookie_name.clone(), "")).path("/");
                (jar.remove(removal), gate.redirect()).into_response()
            } else {
                gate.redirect()
            }
        }
    }
}
