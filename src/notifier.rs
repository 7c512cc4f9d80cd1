//! Change-notification fan-out to connected dashboard viewers
//!
//! The hub tells every connected viewer when a machine's snapshot changed;
//! viewers then re-query the REST API for the data itself. Events carry
//! only the machine name, never the payload, which keeps broadcast frames
//! small no matter how large snapshots grow.
//!
//! ## Delivery Discipline
//!
//! Every viewer gets a bounded queue. `broadcast` never awaits a viewer:
//! a queue that is full (slow reader) or closed (mid-disconnect) is
//! skipped, so one stuck connection cannot stall delivery to the rest.
//! Dropped events are fine - the viewer re-syncs on its next query.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, trace};

/// Queue depth per viewer; a viewer this far behind starts losing events
const VIEWER_QUEUE_DEPTH: usize = 32;

/// Identifies one live viewer connection for the registry's lifetime
pub type ViewerId = u64;

/// Events pushed to every connected viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerEvent {
    /// A machine's stored snapshot changed; re-query to see it
    ServerUpdated {
        #[serde(rename = "serverName")]
        server_name: String,
    },

    /// A viewer asked for a refresh of this machine
    RefreshStarted {
        #[serde(rename = "serverName")]
        server_name: String,
    },
}

/// Requests viewers may send over the realtime channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerRequest {
    RefreshRequest {
        #[serde(rename = "serverName")]
        server_name: String,
    },
}

/// Registry of live viewer connections
///
/// Owned by the API state; connections register on upgrade and unregister
/// on teardown. Add/remove/broadcast are all safe to call concurrently.
pub struct ViewerRegistry {
    viewers: RwLock<HashMap<ViewerId, mpsc::Sender<ViewerEvent>>>,
    next_id: AtomicU64,
}

impl ViewerRegistry {
    pub fn new() -> Self {
        Self {
            viewers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a new viewer; returns its id and the event queue to drain
    pub async fn register(&self) -> (ViewerId, mpsc::Receiver<ViewerEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(VIEWER_QUEUE_DEPTH);

        let mut viewers = self.viewers.write().await;
        viewers.insert(id, tx);
        debug!("viewer {id} connected ({} total)", viewers.len());

        (id, rx)
    }

    /// Drop a viewer from the live set
    pub async fn unregister(&self, id: ViewerId) {
        let mut viewers = self.viewers.write().await;
        viewers.remove(&id);
        debug!("viewer {id} disconnected ({} remaining)", viewers.len());
    }

    pub async fn viewer_count(&self) -> usize {
        self.viewers.read().await.len()
    }

    /// Send `event` to every live viewer; returns how many accepted it.
    ///
    /// The sender list is snapshotted under the read lock, then sends
    /// happen outside it so a registration never waits on a broadcast.
    pub async fn broadcast(&self, event: ViewerEvent) -> usize {
        let senders: Vec<(ViewerId, mpsc::Sender<ViewerEvent>)> = {
            let viewers = self.viewers.read().await;
            viewers.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };

        let mut delivered = 0;
        for (id, tx) in senders {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    trace!("viewer {id} queue full, dropping event");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    trace!("viewer {id} gone, skipping");
                }
            }
        }

        trace!("broadcast {event:?} delivered to {delivered} viewers");
        delivered
    }
}

impl Default for ViewerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
