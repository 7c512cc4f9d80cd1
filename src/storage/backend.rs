//! Storage backend trait definition

use async_trait::async_trait;

use super::error::StorageResult;
use super::schema::StoreRecord;

/// Trait for latest-snapshot stores
///
/// All backends (SQLite, in-memory, future PostgreSQL) must implement this
/// trait. The trait is designed to be:
///
/// - **Async**: All methods are async for compatibility with Tokio
/// - **Upsert-oriented**: `upsert` is the only write; last writer per name wins
/// - **Queryable**: Serve the dashboard's one-machine and all-machines reads
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` as they are shared across the
/// server's request handlers.
///
/// ## Atomicity
///
/// `upsert` must be atomic per record: concurrent upserts for the same name
/// resolve to one of the two complete records, never a mix of both.
/// Upserts for different names must not contend beyond the backend's own
/// internal locking.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert or overwrite the record for `record.name`
    async fn upsert(&self, record: StoreRecord) -> StorageResult<()>;

    /// All records, payload included, in no particular order
    async fn get_all(&self) -> StorageResult<Vec<StoreRecord>>;

    /// The record for one machine, or `None` if it never pushed
    async fn get_one(&self, name: &str) -> StorageResult<Option<StoreRecord>>;

    /// Human-readable backend statistics
    async fn stats(&self) -> StorageResult<String>;

    /// Release resources and flush pending writes
    async fn close(&self) -> StorageResult<()>;
}
