//! SQLite snapshot store
//!
//! ## Features
//!
//! - **Embedded**: No separate database server required
//! - **WAL mode**: Reads proceed while an upsert commits
//! - **Connection pooling**: One pool shared by all request handlers
//!
//! The table holds one row per machine; every ingest is a single
//! `INSERT ... ON CONFLICT DO UPDATE` statement, so per-record atomicity
//! comes from the database and concurrent pushes for the same machine
//! resolve to the last complete write.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument};

use super::backend::SnapshotStore;
use super::error::{StorageError, StorageResult};
use super::schema::StoreRecord;

/// SQLite-backed snapshot store
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    db_path: String,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `db_path` and ensure the
    /// schema exists.
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StorageResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        info!("initializing SQLite store at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS servers (
                name      TEXT PRIMARY KEY,
                ip        TEXT NOT NULL,
                last_seen INTEGER NOT NULL,
                data      TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        debug!("servers table ready");

        Ok(Self {
            pool,
            db_path: db_path_str,
        })
    }

    fn timestamp_to_millis(dt: &DateTime<Utc>) -> i64 {
        dt.timestamp_millis()
    }

    fn millis_to_timestamp(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
    }

    fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> StorageResult<StoreRecord> {
        let data_str: String = row.get("data");
        let data = serde_json::from_str(&data_str)?;

        Ok(StoreRecord {
            name: row.get("name"),
            ip: row.get("ip"),
            last_seen: Self::millis_to_timestamp(row.get("last_seen")),
            data,
        })
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    #[instrument(skip(self, record), fields(name = %record.name))]
    async fn upsert(&self, record: StoreRecord) -> StorageResult<()> {
        let last_seen = Self::timestamp_to_millis(&record.last_seen);
        let data_json = serde_json::to_string(&record.data)?;

        sqlx::query(
            r#"
            INSERT INTO servers (name, ip, last_seen, data)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (name) DO UPDATE SET
                ip = excluded.ip,
                last_seen = excluded.last_seen,
                data = excluded.data
            "#,
        )
        .bind(&record.name)
        .bind(&record.ip)
        .bind(last_seen)
        .bind(data_json)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        debug!("snapshot upserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_all(&self) -> StorageResult<Vec<StoreRecord>> {
        let rows = sqlx::query("SELECT name, ip, last_seen, data FROM servers")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let records: StorageResult<Vec<StoreRecord>> =
            rows.iter().map(Self::record_from_row).collect();

        let records = records?;
        debug!("query returned {} machines", records.len());
        Ok(records)
    }

    #[instrument(skip(self))]
    async fn get_one(&self, name: &str) -> StorageResult<Option<StoreRecord>> {
        let row = sqlx::query("SELECT name, ip, last_seen, data FROM servers WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        row.as_ref().map(Self::record_from_row).transpose()
    }

    async fn stats(&self) -> StorageResult<String> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM servers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let count: i64 = row.get("count");
        Ok(format!("SQLite ({}): {} machines", self.db_path, count))
    }

    async fn close(&self) -> StorageResult<()> {
        debug!("closing SQLite pool");
        self.pool.close().await;
        Ok(())
    }
}
