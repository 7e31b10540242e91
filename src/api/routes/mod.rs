//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`subscriptions`] — Subscription CRUD under `/api/sub` and `/api/subs`
//! - [`collections`] — Read-only view of the collection mapping
//! - [`download`] — `/download/:name`
//! - [`system`] — Health and OpenAPI

use crate::types::{CollectionMap, Subscription, SubscriptionMap};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

mod collections;
mod download;
mod subscriptions;
mod system;

pub use collections::*;
pub use download::*;
pub use subscriptions::*;
pub use system::*;

// ============================================================================
// Response envelopes
// ============================================================================

/// `{"status": "success", "data": ...}` body
pub(crate) fn success<T: Serialize>(data: T) -> Value {
    json!({ "status": "success", "data": data })
}

/// Success envelope carrying one subscription
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubscriptionResponse {
    /// Always `"success"`
    pub status: String,
    /// The subscription
    pub data: Subscription,
}

/// Success envelope carrying the full subscription mapping
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubscriptionListResponse {
    /// Always `"success"`
    pub status: String,
    /// Subscriptions keyed by name
    #[schema(value_type = Object)]
    pub data: SubscriptionMap,
}

/// Success envelope carrying the full collection mapping
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CollectionListResponse {
    /// Always `"success"`
    pub status: String,
    /// Collections keyed by name
    #[schema(value_type = Object)]
    pub data: CollectionMap,
}

/// Success envelope with no payload
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StatusResponse {
    /// Always `"success"`
    pub status: String,
}
