//! Core domain types: subscriptions, patches and collections

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// All subscriptions keyed by name
pub type SubscriptionMap = BTreeMap<String, Subscription>;

/// All collections keyed by name
pub type CollectionMap = BTreeMap<String, Collection>;

/// A named pointer to a remote proxy-node list
///
/// Fields other than `name` and `url` (display options, tags, processors...)
/// are kept verbatim in `extra` and written back unchanged. Stored records
/// missing `name` or `url` decode with an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    /// Unique name, restricted to letters, digits, `_` and `-`
    #[serde(default)]
    pub name: String,

    /// Upstream URL of the node list
    #[serde(default)]
    pub url: String,

    /// Caller-defined fields the registry does not interpret
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

impl Subscription {
    /// Create a subscription with no extra fields
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            extra: Map::new(),
        }
    }

    /// Shallow-merge a patch onto this record
    ///
    /// Fields present in the patch overwrite same-named fields; everything
    /// else is preserved.
    pub fn merged(&self, patch: &SubscriptionPatch) -> Subscription {
        let mut merged = self.clone();
        if let Some(name) = &patch.name {
            merged.name = name.clone();
        }
        if let Some(url) = &patch.url {
            merged.url = url.clone();
        }
        for (key, value) in &patch.extra {
            merged.extra.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// Partial update for a [`Subscription`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionPatch {
    /// New name; differs from the current one for a rename
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New upstream URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Extra fields to overwrite
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

impl SubscriptionPatch {
    /// The target name if this patch renames `current`
    pub fn rename_target(&self, current: &str) -> Option<&str> {
        self.name.as_deref().filter(|new_name| *new_name != current)
    }
}

/// A named, ordered aggregation of subscription names
///
/// Collections are owned elsewhere; the registry only edits `subscriptions`
/// during rename/delete cascades and leaves every other field alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Collection {
    /// Collection name
    #[serde(default)]
    pub name: String,

    /// Member subscription names, in order
    #[serde(default)]
    pub subscriptions: Vec<String>,

    /// Fields owned by the collections registry
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

impl Collection {
    /// Create a collection with no extra fields
    pub fn new(name: impl Into<String>, subscriptions: Vec<String>) -> Self {
        Self {
            name: name.into(),
            subscriptions,
            extra: Map::new(),
        }
    }

    /// Replace the first occurrence of `old` with `new`
    ///
    /// Returns true if a substitution happened.
    pub fn rename_member(&mut self, old: &str, new: &str) -> bool {
        match self.subscriptions.iter().position(|s| s == old) {
            Some(idx) => {
                self.subscriptions[idx] = new.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove every occurrence of `name`
    ///
    /// Returns the number of entries removed.
    pub fn remove_member(&mut self, name: &str) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s != name);
        before - self.subscriptions.len()
    }
}
