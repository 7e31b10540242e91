//! Subscription registry
//!
//! Owns the name → [`Subscription`] mapping and keeps the sibling collection
//! mapping consistent across the renames and deletes it performs itself.
//!
//! Every mutation is a read-modify-write of the whole persisted mapping, so
//! mutations are serialized behind `write_lock`. Reads do not take the lock.

use crate::error::{Error, Result};
use crate::kv::{self, COLLECTIONS_KEY, KeyValueStore, SUBS_KEY};
use crate::types::{Collection, CollectionMap, Subscription, SubscriptionMap, SubscriptionPatch};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Check a subscription name: non-empty, ASCII letters, digits, `_` and `-` only
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation(
            "subscription name must not be empty".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::Validation(format!(
            "subscription name '{}' contains illegal characters; only letters, digits, '_' and '-' are allowed",
            name
        )));
    }
    Ok(())
}

/// Create/read/update/rename/delete for subscriptions
pub struct SubscriptionRegistry {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl SubscriptionRegistry {
    /// Create a registry over `store`
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn load_subs(&self) -> Result<SubscriptionMap> {
        kv::read_map(self.store.as_ref(), SUBS_KEY).await
    }

    async fn load_collections(&self) -> Result<CollectionMap> {
        kv::read_map(self.store.as_ref(), COLLECTIONS_KEY).await
    }

    /// Insert a new subscription
    ///
    /// Name validation and the collision check both run before anything is
    /// written; the first failure is returned and nothing is persisted.
    pub async fn create(&self, sub: Subscription) -> Result<Subscription> {
        tracing::info!(name = %sub.name, "creating subscription");
        validate_name(&sub.name)?;

        let _guard = self.write_lock.lock().await;
        let mut subs = self.load_subs().await?;
        if subs.contains_key(&sub.name) {
            return Err(Error::Conflict(format!(
                "subscription '{}' already exists",
                sub.name
            )));
        }

        subs.insert(sub.name.clone(), sub.clone());
        self.store.write(SUBS_KEY, kv::encode_map(&subs)?).await?;
        Ok(sub)
    }

    /// Look up a subscription by name
    pub async fn get(&self, name: &str) -> Result<Subscription> {
        self.load_subs()
            .await?
            .remove(name)
            .ok_or_else(|| Error::NotFound(format!("subscription '{}'", name)))
    }

    /// All subscriptions
    pub async fn list(&self) -> Result<SubscriptionMap> {
        self.load_subs().await
    }

    /// All collections, as last written by the cascades or their owner
    pub async fn collections(&self) -> Result<CollectionMap> {
        self.load_collections().await
    }

    /// Merge `patch` onto the subscription called `name`
    ///
    /// A patch carrying a different `name` renames the record. Each collection
    /// has its first reference to the old name rewritten to the new one.
    pub async fn update(&self, name: &str, patch: SubscriptionPatch) -> Result<Subscription> {
        let _guard = self.write_lock.lock().await;
        let mut subs = self.load_subs().await?;
        let existing = subs
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("subscription '{}'", name)))?;

        tracing::info!(name, "updating subscription");
        let merged = existing.merged(&patch);

        let Some(new_name) = patch.rename_target(name) else {
            subs.insert(name.to_string(), merged.clone());
            self.store.write(SUBS_KEY, kv::encode_map(&subs)?).await?;
            return Ok(merged);
        };

        validate_name(new_name)?;
        if subs.contains_key(new_name) {
            return Err(Error::Conflict(format!(
                "cannot rename '{}': subscription '{}' already exists",
                name, new_name
            )));
        }

        let mut collections = self.load_collections().await?;
        let touched = rename_in_collections(&mut collections, name, new_name);
        tracing::info!(
            from = name,
            to = new_name,
            collections = touched,
            "renaming subscription"
        );

        subs.remove(name);
        subs.insert(new_name.to_string(), merged.clone());
        self.store
            .write_batch(vec![
                (SUBS_KEY.to_string(), kv::encode_map(&subs)?),
                (COLLECTIONS_KEY.to_string(), kv::encode_map(&collections)?),
            ])
            .await?;

        Ok(merged)
    }

    /// Remove a subscription and every collection reference to it
    ///
    /// Deleting an unknown name is not an error.
    pub async fn delete(&self, name: &str) -> Result<()> {
        tracing::info!(name, "deleting subscription");

        let _guard = self.write_lock.lock().await;
        let mut subs = self.load_subs().await?;
        let mut collections = self.load_collections().await?;

        if subs.remove(name).is_none() {
            tracing::debug!(name, "subscription already absent");
        }
        let removed = remove_from_collections(&mut collections, name);
        if removed > 0 {
            tracing::debug!(name, references = removed, "removed collection references");
        }

        self.store
            .write_batch(vec![
                (SUBS_KEY.to_string(), kv::encode_map(&subs)?),
                (COLLECTIONS_KEY.to_string(), kv::encode_map(&collections)?),
            ])
            .await
    }
}

/// Rewrite the first `old` reference in each collection; returns how many changed
fn rename_in_collections(collections: &mut CollectionMap, old: &str, new: &str) -> usize {
    collections
        .values_mut()
        .map(|col: &mut Collection| col.rename_member(old, new))
        .filter(|changed| *changed)
        .count()
}

/// Drop every `name` reference from every collection; returns the total removed
fn remove_from_collections(collections: &mut CollectionMap, name: &str) -> usize {
    collections
        .values_mut()
        .map(|col| col.remove_member(name))
        .sum()
}
