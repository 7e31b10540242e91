//! Artifact production seam
//!
//! An [`ArtifactProducer`] turns a stored subscription into the textual
//! configuration a particular client expects. The conversion and filtering
//! rules live behind this trait; the download path only needs the result.

use crate::error::Result;
use crate::platform::Platform;
use crate::types::Subscription;
use async_trait::async_trait;
use serde::Serialize;

mod remote;

pub use remote::RemoteArtifactProducer;

/// What kind of item is being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// A single subscription
    Subscription,
}

/// Input to an [`ArtifactProducer`]
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactRequest {
    /// Item kind
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    /// The subscription to render
    pub item: Subscription,
    /// Target client format
    pub platform: Platform,
    /// Skip the subscription's processors and emit the node list as fetched
    pub no_processor: bool,
}

impl ArtifactRequest {
    /// Request for a subscription artifact
    pub fn subscription(item: Subscription, platform: Platform, no_processor: bool) -> Self {
        Self {
            kind: ArtifactKind::Subscription,
            item,
            platform,
            no_processor,
        }
    }
}

/// Converts a subscription into a client-specific artifact
#[async_trait]
pub trait ArtifactProducer: Send + Sync {
    /// Produce the artifact text for `request`
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream list cannot be fetched or the
    /// conversion fails. The download path turns it into a 500 response.
    async fn produce(&self, request: ArtifactRequest) -> Result<String>;

    /// Human-readable name for logging
    fn name(&self) -> &str;
}
