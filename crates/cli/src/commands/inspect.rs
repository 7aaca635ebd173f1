//! Read-only database inspection commands.
//!
//! ```bash
//! bazaar-cli inspect summary
//! bazaar-cli inspect users --limit 50
//! bazaar-cli inspect legacy --path ./data/ecommerce.db
//! ```

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row};

use bazaar_api::db::{ProductRepository, UserRepository};

use super::{CommandError, connect};

/// Default location of the legacy `SQLite` database.
pub const DEFAULT_LEGACY_PATH: &str = "./data/ecommerce.db";

/// Print account and catalog totals.
///
/// # Errors
///
/// Returns `CommandError::Database` if a query fails.
pub async fn summary() -> Result<(), CommandError> {
    let pool = connect().await?;

    let roles = UserRepository::new(&pool).count_by_role().await?;
    let catalog = ProductRepository::new(&pool).stats().await?;

    tracing::info!("Users");
    tracing::info!("  customers: {}", roles.customers);
    tracing::info!("  admins:    {}", roles.admins);
    tracing::info!("Products");
    tracing::info!("  total:          {}", catalog.total);
    tracing::info!("  active:         {}", catalog.active);
    tracing::info!("  units in stock: {}", catalog.units_in_stock);
    tracing::info!("  out of stock:   {}", catalog.out_of_stock);

    if roles.admins == 0 {
        tracing::warn!("No admin account exists; create one with `bazaar-cli admin create`");
    }
    Ok(())
}

/// List accounts, oldest first.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for a non-positive limit.
pub async fn users(limit: i64) -> Result<(), CommandError> {
    if limit < 1 {
        return Err(CommandError::InvalidArgument(format!(
            "limit must be at least 1, got {limit}"
        )));
    }
    let pool = connect().await?;

    let users = UserRepository::new(&pool).list(limit, 0).await?;
    for user in &users {
        tracing::info!(
            "  #{:<6} {:<9} {:<40} {}",
            user.id,
            user.role,
            user.email,
            user.name
        );
    }
    tracing::info!("{} user(s) shown", users.len());
    Ok(())
}

/// Dump the `users` table of the legacy `SQLite` database.
///
/// The file is opened read-only; password columns are redacted.
///
/// # Errors
///
/// Returns `CommandError::NotFound` if the file doesn't exist.
pub async fn legacy(path: &Path) -> Result<(), CommandError> {
    if !path.exists() {
        return Err(CommandError::NotFound(format!(
            "legacy database {}",
            path.display()
        )));
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    tracing::info!("Legacy database: {}", path.display());
    let result = dump_users(&pool).await;
    pool.close().await;
    result
}

async fn dump_users(pool: &SqlitePool) -> Result<(), CommandError> {
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    tracing::info!("Tables: {}", tables.join(", "));

    if !tables.iter().any(|t| t == "users") {
        tracing::warn!("No users table found");
        return Ok(());
    }

    let rows = sqlx::query("SELECT * FROM users").fetch_all(pool).await?;
    tracing::info!("users: {} row(s)", rows.len());
    for row in &rows {
        tracing::info!("  {}", describe_row(row));
    }
    Ok(())
}

fn describe_row(row: &SqliteRow) -> String {
    row.columns()
        .iter()
        .map(|column| {
            let value = if is_secret_column(column.name()) {
                "<redacted>".to_string()
            } else {
                sqlite_value(row, column.ordinal())
            };
            format!("{}={}", column.name(), value)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_secret_column(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.contains("password") || name.contains("hash") || name.contains("token")
}

/// Render a dynamically typed `SQLite` value.
fn sqlite_value(row: &SqliteRow, index: usize) -> String {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.map_or_else(|| "NULL".to_string(), |v| format!("{v:?}"));
    }
    "<blob>".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_columns() {
        assert!(is_secret_column("password"));
        assert!(is_secret_column("Password_Hash"));
        assert!(is_secret_column("reset_token"));
        assert!(!is_secret_column("email"));
        assert!(!is_secret_column("role"));
    }

    #[tokio::test]
    async fn test_describe_row_redacts_passwords() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT, password TEXT, role TEXT)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO users (email, password, role) VALUES ('a@example.com', 'hunter2', NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let row = sqlx::query("SELECT * FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        let line = describe_row(&row);

        assert!(line.contains("id=1"));
        assert!(line.contains("email=\"a@example.com\""));
        assert!(line.contains("password=<redacted>"));
        assert!(line.contains("role=NULL"));
        assert!(!line.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_legacy_missing_file() {
        let err = legacy(Path::new("./definitely/not/here.db"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_legacy_without_users_table() {
        let path = std::env::temp_dir().join(format!("bazaar-legacy-{}.db", std::process::id()));
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::query("CREATE TABLE orders (id INTEGER PRIMARY KEY)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let result = legacy(&path).await;
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_ok());
    }
}
