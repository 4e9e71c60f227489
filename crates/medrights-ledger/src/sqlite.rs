//! SqliteHistory - SQLite-based interaction history

use crate::entry::{AuditEntry, EventType};
use crate::error::{Error, Result};
use crate::sink::AuditSink;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Interaction history persisted to SQLite
#[derive(Clone)]
pub struct SqliteHistory {
    pool: SqlitePool,
}

impl SqliteHistory {
    /// Create a history store with the given connection pool
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a history database, creating the file and table if needed
    pub async fn from_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Database(format!("failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        info!("SQLite history initialized at {}", db_path.display());
        Ok(store)
    }

    /// Create an in-memory history (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        debug!("In-memory SQLite history initialized");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS interactions (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                event_type TEXT NOT NULL,
                user_input TEXT NOT NULL,
                extracted_facts TEXT,
                verdict TEXT,
                refusal TEXT,
                trail TEXT NOT NULL DEFAULT '{}',
                system_version TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_interactions_timestamp
            ON interactions(timestamp DESC)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        debug!("History migrations completed");
        Ok(())
    }

    /// Get a reference to the underlying connection pool
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert one interaction
    #[instrument(skip(self, entry), fields(entry_id = %entry.id))]
    pub async fn insert(&self, entry: &AuditEntry) -> Result<()> {
        let facts = entry.facts.as_ref().map(serde_json::Value::to_string);
        let verdict = entry.verdict.as_ref().map(serde_json::Value::to_string);

        sqlx::query(
            r#"
            INSERT INTO interactions (
                id, timestamp, event_type, user_input,
                extracted_facts, verdict, refusal, trail, system_version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.timestamp.to_rfc3339())
        .bind(entry.event_type.as_str())
        .bind(&entry.raw_text)
        .bind(facts)
        .bind(verdict)
        .bind(&entry.refusal)
        .bind(entry.trail.to_string())
        .bind(&entry.system_version)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        debug!("Interaction recorded");
        Ok(())
    }

    /// Most recent interactions, newest first
    #[instrument(skip(self))]
    pub async fn recent(&self, limit: i64) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, event_type, user_input,
                   extracted_facts, verdict, refusal, trail, system_version
            FROM interactions
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(row_to_entry).collect()
    }

    /// Total number of recorded interactions
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM interactions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row.get("total"))
    }
}

#[async_trait::async_trait]
impl AuditSink for SqliteHistory {
    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        self.insert(entry).await
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

fn parse_json(text: &str) -> Result<serde_json::Value> {
    serde_json::from_str(text).map_err(|e| Error::Serialization(format!("invalid json: {e}")))
}

fn row_to_entry(row: SqliteRow) -> Result<AuditEntry> {
    let id_str: String = row.get("id");
    let timestamp_str: String = row.get("timestamp");
    let event_type_str: String = row.get("event_type");
    let facts_str: Option<String> = row.get("extracted_facts");
    let verdict_str: Option<String> = row.get("verdict");
    let trail_str: String = row.get("trail");

    let id =
        Uuid::parse_str(&id_str).map_err(|e| Error::Serialization(format!("invalid uuid: {e}")))?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map_err(|e| Error::Serialization(format!("invalid timestamp: {e}")))?
        .with_timezone(&Utc);
    let event_type: EventType = event_type_str.parse().map_err(Error::Serialization)?;

    Ok(AuditEntry {
        id,
        timestamp,
        event_type,
        raw_text: row.get("user_input"),
        facts: facts_str.as_deref().map(parse_json).transpose()?,
        verdict: verdict_str.as_deref().map(parse_json).transpose()?,
        refusal: row.get("refusal"),
        trail: parse_json(&trail_str)?,
        system_version: row.get("system_version"),
    })
}
