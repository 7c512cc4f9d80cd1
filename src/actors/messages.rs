//! Message types for actor communication

use tokio::sync::oneshot;

/// Commands that can be sent to a SnapshotCollectorActor
#[derive(Debug)]
pub enum CollectorCommand {
    /// Run a full sample-and-push cycle immediately (bypassing the timer)
    ///
    /// Used for testing and manual refresh operations.
    PushNow {
        /// Channel to send the result back
        respond_to: oneshot::Sender<anyhow::Result<()>>,
    },

    /// Update the sampling interval
    ///
    /// The new interval takes effect immediately.
    UpdateInterval {
        /// New interval in seconds
        interval_secs: u64,
    },

    /// Gracefully shut down the collector
    ///
    /// The actor will finish any in-flight cycle and then exit.
    Shutdown,
}
