//! Database initialization
//!
//! Opens (or creates) the SQLite file and makes sure every registered
//! summary table exists. Safe to call on every start.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::{Dimension, Error, Result};

/// Open the database read-write, creating it when missing
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let db_exists = db_path.exists();

    if !db_exists {
        info!("Database not found, creating new database at: {}", db_path.display());
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    for dimension in Dimension::ALL {
        create_summary_table(&pool, dimension).await?;
    }

    Ok(pool)
}

/// Create one dimension's summary table if absent
pub async fn create_summary_table(pool: &SqlitePool, dimension: Dimension) -> Result<()> {
    // Table names come from the compiled registry, never from user input
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            year        INTEGER NOT NULL,
            item        TEXT    NOT NULL,
            have_count  INTEGER NOT NULL,
            want_count  INTEGER NOT NULL,
            base_count  INTEGER NOT NULL,
            PRIMARY KEY (year, item)
        )
        "#,
        dimension.summary_table()
    );
    sqlx::query(&sql).execute(pool).await?;

    Ok(())
}

/// Connect with read-only mode for the serving side
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::Storage(sqlx::Error::Configuration(
            format!(
                "Database not found: {}. Run devtrend-agg first to build the summary tables.",
                db_path.display()
            )
            .into(),
        )));
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_creates_all_summary_tables() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("devtrend.db");

        let pool = init_database(&db_path).await.unwrap();
        assert!(db_path.exists());

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        for dimension in Dimension::ALL {
            assert!(
                tables.iter().any(|t| t == dimension.summary_table()),
                "missing {}",
                dimension.summary_table()
            );
        }
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("devtrend.db");

        let first = init_database(&db_path).await;
        assert!(first.is_ok());
        drop(first);

        let second = init_database(&db_path).await;
        assert!(second.is_ok(), "reopen failed: {:?}", second.err());
    }

    #[tokio::test]
    async fn test_readonly_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = connect_readonly(&dir.path().join("missing.db")).await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_readonly_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("devtrend.db");
        init_database(&db_path).await.unwrap().close().await;

        let pool = connect_readonly(&db_path).await.unwrap();
        let result = sqlx::query("CREATE TABLE _test_write (id INTEGER)")
            .execute(&pool)
            .await;
        assert!(result.is_err(), "Write operation should fail in read-only mode");
    }
}
