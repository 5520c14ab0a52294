//! Classification record persistence
//!
//! Records are written once and never updated or deleted here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

/// Stored outcome of one `/analyze` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub id: Uuid,
    pub text: String,
    pub prediction: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded
    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Storage for classification outcomes
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Write one record and return it as stored, identifiers included
    async fn persist(&self, text: &str, prediction: &str) -> Result<PersistedRecord, PersistenceError>;

    /// Read back a previously stored record
    async fn load(&self, id: Uuid) -> Result<Option<PersistedRecord>, PersistenceError>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> Result<(), PersistenceError>;
}

/// [`RecordStore`] backed by the `sentiments` SQLite table
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn persist(&self, text: &str, prediction: &str) -> Result<PersistedRecord, PersistenceError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        let row = sqlx::query(
            r#"
            INSERT INTO sentiments (id, text, prediction, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, text, prediction, created_at
            "#,
        )
        .bind(&id)
        .bind(text)
        .bind(prediction)
        .bind(&created_at)
        .fetch_one(&self.pool)
        .await?;

        let record = row_to_record(&row)?;
        tracing::debug!(id = %record.id, prediction = %record.prediction, "Stored classification record");
        Ok(record)
    }

    async fn load(&self, id: Uuid) -> Result<Option<PersistedRecord>, PersistenceError> {
        let row = sqlx::query(
            r#"
            SELECT id, text, prediction, created_at
            FROM sentiments
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn row_to_record(row: &SqliteRow) -> Result<PersistedRecord, PersistenceError> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;

    let corrupt = |reason: String| PersistenceError::Corrupt {
        id: id.clone(),
        reason,
    };

    let uuid = Uuid::parse_str(&id).map_err(|e| corrupt(format!("bad id: {}", e)))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| corrupt(format!("bad created_at: {}", e)))?
        .with_timezone(&Utc);

    Ok(PersistedRecord {
        id: uuid,
        text: row.try_get("text")?,
        prediction: row.try_get("prediction")?,
        created_at,
    })
}
