//! The persisted per-machine row
//!
//! ## Design Philosophy
//!
//! The store keeps exactly one row per machine: the addressing fields
//! (`name`, `ip`, `last_seen`) are typed columns, the snapshot itself is an
//! opaque JSON document. The hub never validates the document's internal
//! schema, so agents can add provider fields without a migration here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The latest-snapshot row for one machine
///
/// Created on the first successful push for a new name, overwritten in
/// place on every later push. Never deleted by the hub; a machine that
/// stops pushing is visible only through an aging `last_seen`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Operator-assigned machine name; the upsert key
    pub name: String,

    /// Address the push arrived from
    pub ip: String,

    /// When the most recent push was accepted (always UTC)
    pub last_seen: DateTime<Utc>,

    /// The pushed snapshot document, stored verbatim
    pub data: Value,
}

impl StoreRecord {
    pub fn new(name: String, ip: String, data: Value) -> Self {
        Self {
            name,
            ip,
            last_seen: Utc::now(),
            data,
        }
    }
}
