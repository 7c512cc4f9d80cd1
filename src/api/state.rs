//! API shared state

use std::sync::Arc;

use crate::notifier::ViewerRegistry;
use crate::storage::SnapshotStore;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// The latest-snapshot store
    pub store: Arc<dyn SnapshotStore>,

    /// Registry of live dashboard viewers
    pub notifier: Arc<ViewerRegistry>,

    /// Shared credential pushing agents must present
    pub api_key: String,
}

impl ApiState {
    pub fn new(store: Arc<dyn SnapshotStore>, notifier: Arc<ViewerRegistry>, api_key: String) -> Self {
        Self {
            store,
            notifier,
            api_key,
        }
    }
}
