//! Cache error types.

use pony_core::error::PonyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("failed to encode cache value: {0}")]
    Encode(String),

    #[error("corrupt cache entry {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

impl From<CacheError> for PonyError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Corrupt { .. } => PonyError::Internal(err.to_string()),
            other => PonyError::Cache(other.to_string()),
        }
    }
}
