// src/storage/memory.rs

//! In-memory snapshot store for the daemon deployment mode.
//!
//! Nothing survives a restart; the daemon re-seeds every source with a
//! fresh fetch at startup, which is the accepted trade-off of this mode.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::Snapshot;
use crate::storage::SnapshotStore;

/// Process-memory snapshot store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Snapshot>> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned().map(Snapshot::parse))
    }

    async fn save(&self, key: &str, snapshot: &Snapshot) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(key.to_string(), snapshot.as_html().to_string());
        Ok(())
    }
}
