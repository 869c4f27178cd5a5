//! HTTP route handlers.

pub mod auth;
pub mod dishes;
pub mod health;
pub mod restaurants;

use pony_core::error::PonyError;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;

/// `?page=&limit=` with defaults; clamping is left to the services.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageParams {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

/// Parse a UUID path segment, naming the entity on failure.
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError(PonyError::validation(format!("invalid {entity} id"))))
}
