//! Throwaway databases for tests

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// An in-memory SQLite database with the schema applied.
///
/// The pool is pinned to one connection, since every SQLite memory
/// connection opens its own empty database.
pub async fn memory_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("failed to open sqlite memory database");
    Migrator::up(&db, None)
        .await
        .expect("failed to apply migrations");
    db
}
