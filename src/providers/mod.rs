//! Sample providers - the agent's local data sources
//!
//! Each provider produces one category of facts about the local machine as
//! an opaque JSON value. The collector treats providers as black boxes: it
//! only needs `sample()` to be callable repeatedly and `fallback()` to
//! supply the value that stands in for a failed sampling attempt.
//!
//! ## Failure Contract
//!
//! A provider that fails degrades only its own field of the snapshot. The
//! collector substitutes `fallback()` and keeps going - one bad data source
//! never blocks delivery of the others.

pub mod disks;
pub mod nginx;
pub mod services;

use async_trait::async_trait;
use serde_json::Value;

pub use disks::DiskUsageProvider;
pub use nginx::NginxProvider;
pub use services::SystemdServiceProvider;

/// A black-box producer of one category of local facts
///
/// Implementations must be `Send + Sync` as the collector holds them across
/// await points inside a spawned task.
#[async_trait]
pub trait SampleProvider: Send + Sync {
    /// Field name this provider's facts are stored under in the snapshot
    fn key(&self) -> &'static str;

    /// Produce the current facts for this category
    async fn sample(&self) -> anyhow::Result<Value>;

    /// Value substituted when `sample()` fails
    fn fallback(&self) -> Value {
        Value::Null
    }
}

/// The standard provider set matching what the dashboard expects
pub fn default_providers() -> Vec<Box<dyn SampleProvider>> {
    vec![
        Box::new(SystemdServiceProvider::new()),
        Box::new(DiskUsageProvider::new()),
        Box::new(NginxProvider::new()),
    ]
}
