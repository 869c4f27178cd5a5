//! Server configuration loaded from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use pony_auth::AuthConfig;
use pony_db::DbConfig;
use thiserror::Error;

/// Errors raised while loading configuration. All of them are fatal at
/// startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Who may create, update and delete restaurants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestaurantWritePolicy {
    /// Create requires `admin`; update and delete run the full pipeline
    /// with the restaurant as tenant.
    #[default]
    Protected,
    /// No authentication on restaurant writes.
    Open,
}

impl FromStr for RestaurantWritePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protected" => Ok(Self::Protected),
            "open" => Ok(Self::Open),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub rate_limit_window: Duration,
    pub rate_limit_max_requests: usize,
    pub cache_ttl: Duration,
    pub cache_max_entries: u64,
    pub image_dir: PathBuf,
    pub image_base_url: String,
    /// Largest accepted request body, which bounds image uploads.
    pub max_upload_bytes: usize,
    pub restaurant_write_policy: RestaurantWritePolicy,
}

impl ServerConfig {
    /// Load an optional `.env` file, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let defaults = DbConfig::default();
        let db = DbConfig {
            url: get("DB_URL").unwrap_or(defaults.url),
            namespace: get("DB_NAMESPACE").unwrap_or(defaults.namespace),
            database: get("DB_DATABASE").unwrap_or(defaults.database),
            username: get("DB_USER"),
            password: get("DB_PASSWORD"),
        };

        let auth = AuthConfig {
            pepper: get("PASSWORD_PEPPER"),
            ..AuthConfig::with_secret(jwt_secret)
        };

        let port = parse(&get, "PORT", 8080)?;
        let image_dir = get("IMAGE_DIR").unwrap_or_else(|| "./uploads".into());
        let image_base_url =
            get("IMAGE_BASE_URL").unwrap_or_else(|| format!("http://localhost:{port}/uploads"));

        let restaurant_write_policy = match get("RESTAURANT_WRITE_POLICY") {
            None => RestaurantWritePolicy::default(),
            Some(value) => value.parse().map_err(|()| ConfigError::Invalid {
                key: "RESTAURANT_WRITE_POLICY",
                value,
            })?,
        };

        let rate_limit_max_requests = parse(&get, "RATE_LIMIT_MAX_REQUESTS", 5)?;
        if rate_limit_max_requests == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_MAX_REQUESTS",
                value: "0".into(),
            });
        }

        Ok(Self {
            port,
            db,
            auth,
            rate_limit_window: Duration::from_secs(parse(&get, "RATE_LIMIT_WINDOW_SECS", 10)?),
            rate_limit_max_requests,
            cache_ttl: Duration::from_secs(parse(&get, "CACHE_TTL_SECS", 600)?),
            cache_max_entries: parse(&get, "CACHE_MAX_ENTRIES", 10_000)?,
            image_dir: PathBuf::from(image_dir),
            image_base_url,
            max_upload_bytes: parse(&get, "MAX_UPLOAD_BYTES", 32 << 20)?,
            restaurant_write_policy,
        })
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.token_lifetime_secs, 86_400);
        assert_eq!(config.rate_limit_window, Duration::from_secs(10));
        assert_eq!(config.rate_limit_max_requests, 5);
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.image_dir, PathBuf::from("./uploads"));
        assert_eq!(config.db.url, "ws://127.0.0.1:8000");
        assert!(config.db.username.is_none());
        assert_eq!(
            config.restaurant_write_policy,
            RestaurantWritePolicy::Protected
        );
    }

    #[test]
    fn missing_secret_is_fatal() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
        assert!(matches!(
            load(&[("JWT_SECRET", "  ")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("JWT_SECRET", "k"),
            ("PORT", "9000"),
            ("DB_URL", "mem://"),
            ("DB_USER", "root"),
            ("DB_PASSWORD", "pw"),
            ("RATE_LIMIT_WINDOW_SECS", "60"),
            ("RATE_LIMIT_MAX_REQUESTS", "100"),
            ("RESTAURANT_WRITE_POLICY", "Open"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.db.url, "mem://");
        assert_eq!(config.db.username.as_deref(), Some("root"));
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert_eq!(config.rate_limit_max_requests, 100);
        assert_eq!(config.restaurant_write_policy, RestaurantWritePolicy::Open);
        assert_eq!(config.image_base_url, "http://localhost:9000/uploads");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = load(&[("JWT_SECRET", "k"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = load(&[("JWT_SECRET", "k"), ("RESTAURANT_WRITE_POLICY", "maybe")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "RESTAURANT_WRITE_POLICY",
                ..
            }
        ));

        let err = load(&[("JWT_SECRET", "k"), ("RATE_LIMIT_MAX_REQUESTS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
