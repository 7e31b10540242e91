//! Key-value persistence seam
//!
//! The registry persists two whole mappings (subscriptions and collections)
//! as JSON values under fixed keys. Any backend that can read and write a
//! JSON value by key can host them:
//! - [`Database`](crate::db::Database) — SQLite, used in production
//! - [`MemoryStore`] — process-local, used in tests and embedding

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

mod memory;

pub use memory::MemoryStore;

/// Key holding the subscription mapping
pub const SUBS_KEY: &str = "subs";

/// Key holding the collection mapping
pub const COLLECTIONS_KEY: &str = "collections";

/// Generic persisted JSON mapping
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent
    async fn read(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value
    async fn write(&self, key: &str, value: Value) -> Result<()>;

    /// Store several values at once
    ///
    /// Backends that support transactions apply all entries or none.
    async fn write_batch(&self, entries: Vec<(String, Value)>) -> Result<()> {
        for (key, value) in entries {
            self.write(&key, value).await?;
        }
        Ok(())
    }

    /// Human-readable name for logging
    fn name(&self) -> &str;
}

/// Read a name-keyed mapping, treating an absent or null value as empty
///
/// Entries that do not decode as `T` are logged and left out, so one bad
/// record cannot block access to the rest. A value that is not an object at
/// all is reported as [`StoreError::CorruptValue`].
pub async fn read_map<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<BTreeMap<String, T>> {
    let entries = match store.read(key).await? {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            return Err(StoreError::CorruptValue {
                key: key.to_string(),
                reason: format!(
                    "expected an object keyed by name, found {}",
                    json_kind(&other)
                ),
            }
            .into());
        }
    };

    let mut map = BTreeMap::new();
    for (name, raw) in entries {
        match serde_json::from_value(raw) {
            Ok(item) => {
                map.insert(name, item);
            }
            Err(e) => {
                tracing::warn!(key, entry = %name, error = %e, "skipping undecodable entry");
            }
        }
    }
    Ok(map)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Encode a mapping for storage
pub fn encode_map<T: Serialize>(map: &BTreeMap<String, T>) -> Result<Value> {
    Ok(serde_json::to_value(map)?)
}

/// Write an empty mapping under each registry key that has no value yet
pub async fn ensure_initialized(store: &dyn KeyValueStore) -> Result<()> {
    for key in [SUBS_KEY, COLLECTIONS_KEY] {
        if matches!(store.read(key).await?, None | Some(Value::Null)) {
            tracing::info!(key, store = store.name(), "initializing empty mapping");
            store.write(key, Value::Object(Default::default())).await?;
        }
    }
    Ok(())
}
