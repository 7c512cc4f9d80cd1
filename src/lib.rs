pub mod actors;
pub mod api;
pub mod config;
pub mod notifier;
pub mod providers;
pub mod storage;
pub mod util;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One point-in-time telemetry document for a machine.
///
/// The envelope (capture time + heartbeat) is typed; everything the sample
/// providers produce lives in `facts`, keyed by provider. The hub never
/// looks inside those values, so providers can grow new fields without a
/// schema change on the wire or in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// When the snapshot was assembled (always UTC)
    pub timestamp: DateTime<Utc>,

    /// Provider facts, keyed by provider (`services`, `storage`, `nginx`, ...)
    #[serde(flatten)]
    pub facts: Map<String, Value>,

    /// Always true on an assembled snapshot; its arrival is the liveness signal
    pub heartbeat: bool,
}

impl SnapshotDocument {
    pub fn new(timestamp: DateTime<Utc>, facts: Map<String, Value>) -> Self {
        Self {
            timestamp,
            facts,
            heartbeat: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_document_wire_shape() {
        let mut facts = Map::new();
        facts.insert("services".to_string(), json!([{"name": "sshd.service"}]));
        facts.insert("nginx".to_string(), json!({"isRunning": false}));

        let doc = SnapshotDocument::new(Utc::now(), facts);
        let value = serde_json::to_value(&doc).unwrap();

        // Facts are flattened next to the envelope fields
        assert_eq!(value["heartbeat"], json!(true));
        assert_eq!(value["services"][0]["name"], json!("sshd.service"));
        assert_eq!(value["nginx"]["isRunning"], json!(false));
        assert!(value["timestamp"].is_string());
        assert!(value.get("facts").is_none());
    }

    #[test]
    fn test_snapshot_document_round_trips() {
        let mut facts = Map::new();
        facts.insert("storage".to_string(), json!({"filesystems": []}));

        let doc = SnapshotDocument::new(Utc::now(), facts);
        let text = serde_json::to_string(&doc).unwrap();
        let back: SnapshotDocument = serde_json::from_str(&text).unwrap();

        assert_eq!(back, doc);
    }
}
