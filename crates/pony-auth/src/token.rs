//! HS256 session token issuance and verification.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: user ID (UUID string).
    pub sub: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Issues and verifies session tokens with a shared secret.
///
/// The keys are derived once at construction; the service is cheap to
/// clone and holds no global state.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime_secs: config.token_lifetime_secs as i64,
        }
    }

    /// Token lifetime in seconds.
    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime_secs as u64
    }

    /// Issue a signed token for `user_id` that expires after the
    /// configured lifetime.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        self.encode(&SessionClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.lifetime_secs,
        })
    }

    /// Sign arbitrary claims with this service's key.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
    }

    /// Verify signature and expiry, returning the subject id.
    ///
    /// A token is expired once `now >= exp`.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken(e.to_string()),
            })?;

        if Utc::now().timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Uuid::parse_str(&claims.sub)
            .map_err(|e| AuthError::MalformedToken(format!("subject is not a UUID: {e}")))
    }
}
