use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn not_found(what: &str) -> Self {
        DatabaseError::NotFound(format!("{} not found", what))
    }

    /// Map constraint violations on a write to `Conflict`, passing other errors through
    pub fn on_write(err: sqlx::Error, unique_message: &str) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return DatabaseError::Conflict(unique_message.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::Conflict("record is still referenced by other records".to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Open the connection pool and verify it answers a trivial query
pub async fn connect(config: &AppConfig) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&config.database_url())
        .await?;

    health_check(&pool).await?;

    info!(
        host = %config.database.host,
        database = %config.database.name,
        "Connected to PostgreSQL"
    );
    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply every pending migration
pub async fn migrate_up(pool: &PgPool) -> Result<(), DatabaseError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Revert the most recently applied migration. Returns its version, or
/// `None` when nothing is applied.
pub async fn migrate_down(pool: &PgPool) -> Result<Option<i64>, DatabaseError> {
    let applied: Vec<(i64,)> = match sqlx::query_as(
        "SELECT version FROM _sqlx_migrations WHERE success ORDER BY version DESC LIMIT 2",
    )
    .fetch_all(pool)
    .await
    {
        Ok(rows) => rows,
        // Migrations table not created yet
        Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("42P01") => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let Some((latest,)) = applied.first().copied() else {
        return Ok(None);
    };
    let target = applied.get(1).map(|(v,)| *v).unwrap_or(0);

    MIGRATOR.undo(pool, target).await?;
    info!(version = latest, "Database migration reverted");
    Ok(Some(latest))
}
