//! Database-specific error types and conversions.

use pony_core::error::PonyError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },
}

impl DbError {
    /// Classify a failed statement. Unique-index violations become
    /// [`DbError::AlreadyExists`], everything else [`DbError::Query`].
    pub(crate) fn from_statement(entity: &str, err: impl ToString) -> Self {
        let msg = err.to_string();
        if msg.contains("already contains") {
            DbError::AlreadyExists {
                entity: entity.into(),
            }
        } else {
            DbError::Query(msg)
        }
    }
}

impl From<DbError> for PonyError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => PonyError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => PonyError::AlreadyExists { entity },
            DbError::Hash(msg) => PonyError::Crypto(msg),
            other => PonyError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_is_classified() {
        let err = DbError::from_statement(
            "user",
            "Database index `idx_user_tenant_email` already contains ['t', 'a@b.c']",
        );
        assert!(matches!(err, DbError::AlreadyExists { .. }));
        assert!(matches!(PonyError::from(err), PonyError::AlreadyExists { .. }));
    }

    #[test]
    fn other_failures_are_database_errors() {
        let err = DbError::from_statement("dish", "Found NONE for field `price`");
        assert!(matches!(PonyError::from(err), PonyError::Database(_)));
    }
}
