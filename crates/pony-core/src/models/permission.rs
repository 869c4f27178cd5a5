//! Permission domain model.
//!
//! Permissions come from a fixed set. `admin` is a super-scope that
//! also bypasses tenant isolation.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PonyError;

/// A named capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionName {
    Customer,
    Restaurant,
    Admin,
}

impl PermissionName {
    pub const ALL: [PermissionName; 3] = [
        PermissionName::Customer,
        PermissionName::Restaurant,
        PermissionName::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionName::Customer => "customer",
            PermissionName::Restaurant => "restaurant",
            PermissionName::Admin => "admin",
        }
    }
}

impl fmt::Display for PermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionName {
    type Err = PonyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(PermissionName::Customer),
            "restaurant" => Ok(PermissionName::Restaurant),
            "admin" => Ok(PermissionName::Admin),
            other => Err(PonyError::validation(format!("unknown permission: {other}"))),
        }
    }
}

/// Ordered set of permissions held by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<PermissionName>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: PermissionName) -> bool {
        self.0.insert(name)
    }

    pub fn contains(&self, name: PermissionName) -> bool {
        self.0.contains(&name)
    }

    /// Holders of `admin` may act in any tenant.
    pub fn is_admin(&self) -> bool {
        self.contains(PermissionName::Admin)
    }

    /// True if at least one of `required` is held. An empty `required`
    /// slice is satisfied by any set.
    pub fn satisfies_any(&self, required: &[PermissionName]) -> bool {
        required.is_empty() || required.iter().any(|p| self.contains(*p))
    }

    pub fn iter(&self) -> impl Iterator<Item = PermissionName> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Permission names as strings, in set order.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl FromIterator<PermissionName> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = PermissionName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A permission record as stored in the permission table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub name: PermissionName,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        for name in PermissionName::ALL {
            assert_eq!(name.as_str().parse::<PermissionName>().unwrap(), name);
        }
    }

    #[test]
    fn rejects_unknown_name() {
        let err = "superuser".parse::<PermissionName>().unwrap_err();
        assert!(matches!(err, PonyError::Validation { .. }));
    }

    #[test]
    fn set_is_ordered_and_deduplicated() {
        let set: PermissionSet = [
            PermissionName::Admin,
            PermissionName::Customer,
            PermissionName::Admin,
        ]
        .into_iter()
        .collect();
        assert_eq!(set.names(), vec!["customer", "admin"]);
    }

    #[test]
    fn satisfies_any_of_required() {
        let set: PermissionSet = [PermissionName::Customer].into_iter().collect();
        assert!(set.satisfies_any(&[PermissionName::Customer, PermissionName::Admin]));
        assert!(!set.satisfies_any(&[PermissionName::Restaurant, PermissionName::Admin]));
        assert!(set.satisfies_any(&[]));
        assert!(!set.is_admin());
    }

    #[test]
    fn serializes_as_lowercase_array() {
        let set: PermissionSet = [PermissionName::Restaurant].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["restaurant"]"#);
    }
}
