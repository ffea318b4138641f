//! Bearer token verification.
//!
//! Every surface (REST and WebSocket) requires `Authorization: Bearer <token>`.
//! Token verification is abstracted behind [`TokenVerifier`] so the scheme can
//! be swapped without touching handlers. The bundled [`PrefixTokenVerifier`]
//! accepts `<prefix><identity>` tokens and is intended for development and
//! tests only.

use thiserror::Error;

use axum::http::{HeaderMap, header};

use crate::domain::Identity;

/// Errors returned by token verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No Authorization header, or not a Bearer scheme
    #[error("missing bearer token")]
    MissingToken,

    /// Token could not be verified
    #[error("invalid bearer token")]
    InvalidToken,
}

/// Verifies a bearer token and resolves the authenticated identity.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Development verifier: accepts tokens of the form `<prefix><identity>`.
///
/// The identity is everything after the configured prefix, validated with
/// the usual [`Identity`] rules.
pub struct PrefixTokenVerifier {
    prefix: String,
}

impl PrefixTokenVerifier {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl TokenVerifier for PrefixTokenVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let identity = token
            .strip_prefix(self.prefix.as_str())
            .ok_or(AuthError::InvalidToken)?;
        Identity::new(identity.to_string()).map_err(|_| AuthError::InvalidToken)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
