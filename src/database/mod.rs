/// Persistence layer
///
/// A `TargetStore` trait abstracts the storage the engine depends on,
/// with a libsql-backed implementation behind a connection pool.
pub mod migrations;
pub mod models;
pub mod repository;

pub use repository::{LibsqlTargetStore, TargetStore};

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
