//! Snapshot persistence for the hub
//!
//! This module provides a trait-based abstraction over where the latest
//! snapshot per machine is kept.
//!
//! ## Design
//!
//! - **Trait-based**: `SnapshotStore` allows swapping implementations
//! - **Async**: All operations are async for compatibility with the Tokio server
//! - **Upsert-oriented**: One row per machine, overwritten in place; the
//!   store never accumulates history and never expires rows on its own
//!
//! ## Backends
//!
//! - **SQLite** (default): Embedded database, survives hub restarts
//! - **In-Memory**: No persistence, for testing or throwaway deployments

pub mod backend;
pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use backend::SnapshotStore;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use schema::StoreRecord;
pub use sqlite::SqliteStore;
