//! Authentication and authorization error types.

use pony_core::error::PonyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing bearer token")]
    MissingToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("token subject is unknown")]
    UnknownSubject,

    #[error("identity does not belong to this restaurant")]
    TenantMismatch,

    #[error("insufficient permissions")]
    InsufficientPermissions,

    #[error("invalid restaurant id")]
    InvalidTenant(String),

    #[error("too many requests")]
    RateLimited,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for PonyError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::InvalidSignature
            | AuthError::MalformedToken(_)
            | AuthError::UnknownSubject => PonyError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::TenantMismatch | AuthError::InsufficientPermissions => {
                PonyError::AuthorizationDenied {
                    reason: err.to_string(),
                }
            }
            AuthError::InvalidTenant(raw) => PonyError::InvalidTenant(raw),
            AuthError::RateLimited => PonyError::RateLimited,
            AuthError::Crypto(msg) => PonyError::Crypto(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_are_unauthenticated() {
        for err in [
            AuthError::MissingToken,
            AuthError::TokenExpired,
            AuthError::InvalidSignature,
            AuthError::MalformedToken("x".into()),
            AuthError::UnknownSubject,
        ] {
            assert!(matches!(
                PonyError::from(err),
                PonyError::AuthenticationFailed { .. }
            ));
        }
    }

    #[test]
    fn scope_failures_are_forbidden() {
        assert!(matches!(
            PonyError::from(AuthError::TenantMismatch),
            PonyError::AuthorizationDenied { .. }
        ));
        assert!(matches!(
            PonyError::from(AuthError::InsufficientPermissions),
            PonyError::AuthorizationDenied { .. }
        ));
    }
}
