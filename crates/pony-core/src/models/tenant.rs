//! Tenant identifier.
//!
//! A tenant is an isolated restaurant namespace. Every user, dish and
//! rating belongs to exactly one tenant, and the tenant id of a
//! restaurant's data is the restaurant's own id.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolved tenant (restaurant) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
