//! Authentication configuration.

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HMAC secret for HS256 session tokens.
    pub jwt_secret: String,
    /// Session token lifetime in seconds (default: 86_400 = 24 hours).
    pub token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id verification.
    pub pepper: Option<String>,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
}

impl AuthConfig {
    /// Defaults with the given signing secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ..Self::default()
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_lifetime_secs: 86_400,
            pepper: None,
            min_password_length: 8,
        }
    }
}
