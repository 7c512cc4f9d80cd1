//! Actor-based collection pipeline
//!
//! The agent side of the system runs as a single long-lived actor task
//! communicating via Tokio channels.
//!
//! ```text
//! Timer tick → sample providers → assemble snapshot → push to hub
//!     ↑
//!     └─── Commands (PushNow, UpdateInterval, Shutdown)
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: an mpsc command channel for control messages
//! 2. **Request/Response**: oneshot channels for synchronous results

pub mod collector;
pub mod messages;
