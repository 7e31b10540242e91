//! In-memory key-value store

use super::KeyValueStore;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local [`KeyValueStore`]
///
/// Nothing survives a restart. Batches are applied under one write lock, so
/// readers never see half of a batch.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: Value) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn write_batch(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let mut guard = self.entries.write().await;
        for (key, value) in entries {
            guard.insert(key, value);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
