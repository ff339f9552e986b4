//! Session token verification.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::auth::routes::Role;

/// Why a session token was rejected.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("session token expired")]
    Expired,

    #[error("session token rejected: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err),
        }
    }
}

/// Claims the gate reads. Everything else in the payload is ignored.
#[derive(Debug, Deserialize)]
struct SessionClaims {
    #[serde(default)]
    idrol: Option<Value>,

    #[serde(default)]
    exp: Option<u64>,
}

/// A verified session, attached to the request for downstream handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// `None` when the token carries no usable role.
    pub role: Option<Role>,

    /// Expiry as a unix timestamp, when the token has one.
    pub expires_at: Option<u64>,
}

/// Verifies HMAC-signed session tokens against the shared secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        // `exp` is checked when present; tokens without it are accepted.
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Check signature and time claims, then extract the role.
    pub fn verify(&self, token: &str) -> Result<Session, TokenError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)?;
        Ok(Session {
            role: data.claims.idrol.as_ref().and_then(parse_role),
            expires_at: data.claims.exp,
        })
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

/// `idrol` is issued as a number, but some backends serialize it as a string.
fn parse_role(value: &Value) -> Option<Role> {
    let id = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    Some(Role(id))
}
