//! Database access
//!
//! Thin helpers around the sea-orm connection. Schema migrations are managed
//! outside this service; `synchronize` only creates missing tables.

use crate::config::DatabaseConfig;
use crate::entities;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Schema,
    Statement,
};
use std::time::Duration;
use tracing::info;

/// Open a lazily-connected pool.
///
/// No connection is made until the first query, so the service starts (and
/// reports an unreachable database on `/health`) while the database is down.
pub async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .sqlx_logging(cfg.sql_logging)
        .connect_lazy(true);

    Database::connect(opts).await
}

/// Round-trip `SELECT 1`
pub async fn ping<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, "SELECT 1")).await?;
    Ok(())
}

/// Create entity tables that do not exist yet
pub async fn synchronize<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    db.execute(create_user_table(backend)).await?;
    info!("Schema synchronized");
    Ok(())
}

fn create_user_table(backend: DatabaseBackend) -> Statement {
    let mut stmt = Schema::new(backend).create_table_from_entity(entities::User);
    stmt.if_not_exists();
    backend.build(&stmt)
}
