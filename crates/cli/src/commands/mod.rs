//! Maintenance command implementations.
//!
//! Each command opens its own pool, does one job and returns. Failures
//! bubble up as `CommandError` and become a non-zero exit status.

pub mod admin;
pub mod inspect;
pub mod migrate;
pub mod seed;
pub mod stock;

use sqlx::PgPool;
use thiserror::Error;

use bazaar_api::config::{ConfigError, get_database_url};
use bazaar_api::db::{self, RepositoryError};
use bazaar_api::services::auth::AuthError;

/// Errors that can occur while running a maintenance command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Account operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Reading an input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed file is not valid YAML for the expected shape.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Argument rejected before touching the database.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Connect to the application database.
///
/// Reads `BAZAAR_DATABASE_URL`, falling back to `DATABASE_URL`.
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    let database_url = get_database_url("BAZAAR_DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;
    Ok(pool)
}
