//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Permission names are stored as strings
//! with ASSERT constraints for validation.

use pony_core::models::permission::PermissionName;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Permissions (global, fixed set)
-- =======================================================================
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD name ON TABLE permission TYPE string \
    ASSERT $value IN ['customer', 'restaurant', 'admin'];
DEFINE FIELD created_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_name ON TABLE permission \
    COLUMNS name UNIQUE;

-- =======================================================================
-- Restaurants (global scope; a restaurant id is a tenant id)
-- =======================================================================
DEFINE TABLE restaurant SCHEMAFULL;
DEFINE FIELD name ON TABLE restaurant TYPE string;
DEFINE FIELD description ON TABLE restaurant TYPE string;
DEFINE FIELD location ON TABLE restaurant TYPE string;
DEFINE FIELD image_url ON TABLE restaurant TYPE string;
DEFINE FIELD created_at ON TABLE restaurant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE restaurant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE restaurant TYPE option<datetime>;

-- =======================================================================
-- Users (tenant scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD permissions ON TABLE user TYPE array<string>;
DEFINE FIELD permissions.* ON TABLE user TYPE string \
    ASSERT $value IN ['customer', 'restaurant', 'admin'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_tenant_email ON TABLE user \
    COLUMNS tenant_id, email UNIQUE;

-- =======================================================================
-- Dishes (tenant scope)
-- =======================================================================
DEFINE TABLE dish SCHEMAFULL;
DEFINE FIELD restaurant_id ON TABLE dish TYPE string;
DEFINE FIELD name ON TABLE dish TYPE string;
DEFINE FIELD description ON TABLE dish TYPE string;
DEFINE FIELD price ON TABLE dish TYPE float ASSERT $value > 0;
DEFINE FIELD image_url ON TABLE dish TYPE string;
DEFINE FIELD created_by ON TABLE dish TYPE string;
DEFINE FIELD last_updated_by ON TABLE dish TYPE option<string>;
DEFINE FIELD created_at ON TABLE dish TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE dish TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE dish TYPE option<datetime>;
DEFINE INDEX idx_dish_restaurant ON TABLE dish \
    COLUMNS restaurant_id;

-- =======================================================================
-- Ratings (tenant scope, append-only)
-- =======================================================================
DEFINE TABLE rating SCHEMAFULL;
DEFINE FIELD restaurant_id ON TABLE rating TYPE string;
DEFINE FIELD dish_id ON TABLE rating TYPE string;
DEFINE FIELD user_id ON TABLE rating TYPE string;
DEFINE FIELD score ON TABLE rating TYPE int \
    ASSERT $value >= 1 AND $value <= 5;
DEFINE FIELD created_at ON TABLE rating TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_rating_dish ON TABLE rating \
    COLUMNS restaurant_id, dish_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client, then
/// make sure the fixed permission set is present.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// Re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    seed_permissions(db).await
}

#[derive(Debug, SurrealValue)]
struct NameRow {
    name: String,
}

/// Insert every [`PermissionName`] not yet present in the permission
/// table. Existing rows are left untouched.
pub async fn seed_permissions<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    let mut result = db.query("SELECT name FROM permission").await?;
    let existing: Vec<NameRow> = result.take(0)?;

    for name in PermissionName::ALL {
        if existing.iter().any(|row| row.name == name.as_str()) {
            continue;
        }
        db.query("CREATE type::record('permission', $id) SET name = $name")
            .bind(("id", Uuid::new_v4().to_string()))
            .bind(("name", name.as_str()))
            .await?
            .check()
            .map_err(|e| DbError::Migration(format!("Failed to seed permission {name}: {e}")))?;
        info!(permission = %name, "Seeded permission");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_every_table() {
        for table in ["permission", "restaurant", "user", "dish", "rating"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
