// src/storage/mod.rs

//! Snapshot persistence.
//!
//! One snapshot per source key, superseded on every write. Two backends:
//! MongoDB for batch deployments that must survive restarts, and process
//! memory for the long-running daemon, seeded with an initial fetch.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Snapshot;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Trait for snapshot storage backends.
///
/// Neither operation retries internally; transient failures are the
/// caller's to handle. An absent snapshot is `Ok(None)`, distinct from a
/// failed read.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last stored snapshot for a source key.
    async fn load(&self, key: &str) -> Result<Option<Snapshot>>;

    /// Store a new snapshot for a source key, replacing any previous one.
    async fn save(&self, key: &str, snapshot: &Snapshot) -> Result<()>;
}
