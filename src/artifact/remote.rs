//! Default producer: fetch the upstream list and hand it back unconverted

use super::{ArtifactProducer, ArtifactRequest};
use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::upstream::UpstreamClient;
use async_trait::async_trait;
use serde_json::json;

/// Producer that returns the upstream node list as fetched
///
/// Used when no converting producer is plugged in. For `JSON` the body is
/// wrapped in an object so the response is valid JSON; every other platform
/// gets the raw text.
#[derive(Clone, Debug)]
pub struct RemoteArtifactProducer {
    client: UpstreamClient,
}

impl RemoteArtifactProducer {
    /// Create a producer sharing `client`
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactProducer for RemoteArtifactProducer {
    async fn produce(&self, request: ArtifactRequest) -> Result<String> {
        let sub = &request.item;
        let response = self.client.get(&sub.url).await?;
        let content = response.text().await.map_err(|e| {
            Error::Upstream(format!(
                "Failed to read response body from '{}': {}",
                sub.url, e
            ))
        })?;

        tracing::debug!(
            name = %sub.name,
            platform = %request.platform,
            no_processor = request.no_processor,
            bytes = content.len(),
            "fetched upstream subscription"
        );

        match &request.platform {
            Platform::Json => Ok(serde_json::to_string(&json!({
                "name": sub.name,
                "url": sub.url,
                "platform": request.platform,
                "content": content,
            }))?),
            _ => Ok(content),
        }
    }

    fn name(&self) -> &str {
        "remote"
    }
}
