//! Dancing Pony database: SurrealDB connection management and
//! repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization, migrations and permission seeding
//!   ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Implementations of the `pony-core` repository traits
//!   ([`repository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1, seed_permissions};
