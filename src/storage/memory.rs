//! In-memory snapshot store (no persistence)
//!
//! One map entry per machine, guarded by an async `RwLock`. The write lock
//! scopes each upsert, so same-name writes serialize and a reader never
//! observes a half-written record. All data is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::backend::SnapshotStore;
use super::error::StorageResult;
use super::schema::StoreRecord;

/// In-memory snapshot store
pub struct MemoryStore {
    records: RwLock<HashMap<String, StoreRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn upsert(&self, record: StoreRecord) -> StorageResult<()> {
        debug!("upserting snapshot for {}", record.name);

        let mut records = self.records.write().await;
        records.insert(record.name.clone(), record);
        Ok(())
    }

    async fn get_all(&self) -> StorageResult<Vec<StoreRecord>> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn get_one(&self, name: &str) -> StorageResult<Option<StoreRecord>> {
        let records = self.records.read().await;
        Ok(records.get(name).cloned())
    }

    async fn stats(&self) -> StorageResult<String> {
        let records = self.records.read().await;
        Ok(format!("In-Memory: {} machines", records.len()))
    }

    async fn close(&self) -> StorageResult<()> {
        debug!("closing in-memory store (no-op)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_creates_then_overwrites() {
        let store = MemoryStore::new();

        store
            .upsert(StoreRecord::new(
                "web1".to_string(),
                "10.0.0.1".to_string(),
                json!({"rev": 1}),
            ))
            .await
            .unwrap();

        store
            .upsert(StoreRecord::new(
                "web1".to_string(),
                "10.0.0.2".to_string(),
                json!({"rev": 2}),
            ))
            .await
            .unwrap();

        let record = store.get_one("web1").await.unwrap().unwrap();
        assert_eq!(record.ip, "10.0.0.2");
        assert_eq!(record.data, json!({"rev": 2}));

        // Still one row for the machine
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_one_unknown_machine() {
        let store = MemoryStore::new();
        assert!(store.get_one("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_returns_every_machine() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store
                .upsert(StoreRecord::new(
                    name.to_string(),
                    "10.0.0.1".to_string(),
                    json!({}),
                ))
                .await
                .unwrap();
        }

        let mut names: Vec<String> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
