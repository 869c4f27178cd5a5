//! SurrealDB implementation of [`PermissionRepository`].

use chrono::{DateTime, Utc};
use pony_core::error::PonyResult;
use pony_core::models::permission::{Permission, PermissionName};
use pony_core::repository::PermissionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PermissionRowWithId {
    record_id: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl PermissionRowWithId {
    fn try_into_permission(self) -> Result<Permission, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let name = self
            .name
            .parse::<PermissionName>()
            .map_err(|e| DbError::Decode(e.to_string()))?;
        Ok(Permission {
            id,
            name,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn get_by_name(&self, name: PermissionName) -> PonyResult<Permission> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE name = $name",
            )
            .bind(("name", name.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: format!("name={name}"),
        })?;

        Ok(row.try_into_permission()?)
    }

    async fn list(&self) -> PonyResult<Vec<Permission>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM permission ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
