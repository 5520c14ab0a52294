//! Database access for revsa-proxy
//!
//! One SQLite file holds every classification outcome. The pool is created
//! once at startup and shared by all request handlers.

pub mod records;

pub use records::{PersistedRecord, PersistenceError, RecordStore, SqliteRecordStore};

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool, creating the file and tables if needed
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the `sentiments` table if it doesn't exist
pub async fn init_tables(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sentiments (
            id TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            prediction TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (sentiments)");
    Ok(())
}
