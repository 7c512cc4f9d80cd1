//! Property-based tests for store invariants using proptest
//!
//! These tests verify that for all inputs:
//! - An upsert sequence converges to the last write per machine
//! - The store holds exactly one record per distinct machine
//! - Payloads come back exactly as stored

use std::collections::HashMap;

use fleetwatch::storage::{MemoryStore, SnapshotStore, StoreRecord};
use proptest::prelude::*;
use serde_json::json;

/// A small name pool forces plenty of same-machine collisions
fn machine_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("web1".to_string()),
        Just("web2".to_string()),
        Just("db1".to_string()),
        Just("cache1".to_string()),
    ]
}

// Property: after any sequence of upserts, each machine holds exactly the
// payload of its last write - order-sensitive, never a merge
proptest! {
    #[test]
    fn prop_upsert_sequence_converges_to_last_write(
        writes in prop::collection::vec((machine_name(), 0u64..1000), 1..40),
    ) {
        tokio_test::block_on(async {
            let store = MemoryStore::new();

            let mut expected: HashMap<String, u64> = HashMap::new();
            for (name, rev) in &writes {
                expected.insert(name.clone(), *rev);
                store
                    .upsert(StoreRecord::new(
                        name.clone(),
                        "10.0.0.1".to_string(),
                        json!({"rev": rev, "heartbeat": true}),
                    ))
                    .await
                    .unwrap();
            }

            // One record per distinct machine
            let records = store.get_all().await.unwrap();
            assert_eq!(records.len(), expected.len());

            // Each record carries its machine's final payload
            for record in records {
                let want = expected[&record.name];
                assert_eq!(record.data, json!({"rev": want, "heartbeat": true}));
            }
        });
    }
}

// Property: a stored payload is returned structurally identical
proptest! {
    #[test]
    fn prop_payload_round_trips_unmodified(
        name in machine_name(),
        logs in prop::collection::vec(".{0,40}", 0..10),
        running in any::<bool>(),
    ) {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let payload = json!({
                "nginx": {"isRunning": running, "errorLogs": logs},
                "heartbeat": true,
            });

            store
                .upsert(StoreRecord::new(name.clone(), "10.0.0.1".to_string(), payload.clone()))
                .await
                .unwrap();

            let record = store.get_one(&name).await.unwrap().unwrap();
            assert_eq!(record.data, payload);
        });
    }
}

// Property: writes to one machine never disturb another machine's record
proptest! {
    #[test]
    fn prop_upserts_isolated_between_machines(revs in prop::collection::vec(0u64..1000, 1..20)) {
        tokio_test::block_on(async {
            let store = MemoryStore::new();

            store
                .upsert(StoreRecord::new(
                    "stable".to_string(),
                    "10.0.0.1".to_string(),
                    json!({"fixed": true}),
                ))
                .await
                .unwrap();

            for rev in &revs {
                store
                    .upsert(StoreRecord::new(
                        "churner".to_string(),
                        "10.0.0.2".to_string(),
                        json!({"rev": rev}),
                    ))
                    .await
                    .unwrap();
            }

            let stable = store.get_one("stable").await.unwrap().unwrap();
            assert_eq!(stable.data, json!({"fixed": true}));
        });
    }
}
