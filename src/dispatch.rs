//! Download dispatch
//!
//! Resolves the client platform, looks up the subscription, asks the
//! [`ArtifactProducer`] for the artifact and, in parallel, fetches the
//! upstream usage header so it can be passed through to the client.

use crate::artifact::{ArtifactProducer, ArtifactRequest};
use crate::error::{Error, Result};
use crate::notify::{Notification, Notifier};
use crate::platform::{self, Platform};
use crate::registry::SubscriptionRegistry;
use crate::upstream::UpstreamHeaderForwarder;
use axum::http::HeaderMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

const NOTIFY_TITLE: &str = "Sub-Store download failed";

/// Query parameters for `GET /download/:name`
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadQuery {
    /// Skip processors; `0`, `false`, `no` and `off` mean no, any other value
    /// (or the bare key) means yes
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub raw: bool,
    /// Explicit target platform; overrides user-agent detection
    #[serde(default)]
    pub target: Option<String>,
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("0") | Some("false") | Some("no") | Some("off") => false,
        Some(_) => true,
    })
}

/// A produced artifact ready to be sent to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    /// Artifact text
    pub body: String,
    /// Platform the artifact was produced for
    pub platform: Platform,
    /// Upstream `subscription-userinfo` value, if one was obtained
    pub usage: Option<String>,
}

impl DownloadArtifact {
    /// Content type for the response body
    pub fn content_type(&self) -> &'static str {
        match &self.platform {
            Platform::Json => "application/json;charset=utf-8",
            _ => "text/plain;charset=utf-8",
        }
    }
}

/// Serves subscription downloads
pub struct DownloadDispatcher {
    registry: Arc<SubscriptionRegistry>,
    producer: Arc<dyn ArtifactProducer>,
    forwarder: UpstreamHeaderForwarder,
    notifier: Arc<dyn Notifier>,
}

impl DownloadDispatcher {
    /// Wire a dispatcher from its collaborators
    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        producer: Arc<dyn ArtifactProducer>,
        forwarder: UpstreamHeaderForwarder,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            producer,
            forwarder,
            notifier,
        }
    }

    /// Produce the artifact for subscription `name`
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no subscription has that name (the producer is
    ///   not called)
    /// - [`Error::Artifact`] if the producer fails, whatever the cause
    ///
    /// A `target` with no built-in meaning is passed to the producer as
    /// [`Platform::Other`]. Usage-header failures are logged and never fail
    /// the download.
    pub async fn download(
        &self,
        name: &str,
        query: &DownloadQuery,
        headers: &HeaderMap,
    ) -> Result<DownloadArtifact> {
        let platform = match query.target.as_deref() {
            Some(target) => Platform::from_target(target),
            None => platform::detect(headers).unwrap_or_default(),
        };

        let sub = match self.registry.get(name).await {
            Ok(sub) => sub,
            Err(Error::NotFound(msg)) => {
                tracing::error!(name, "download requested for unknown subscription");
                self.notifier.notify(Notification::new(
                    NOTIFY_TITLE,
                    format!("subscription not found: {}", name),
                    None,
                ));
                return Err(Error::NotFound(msg));
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            name,
            %platform,
            raw = query.raw,
            producer = self.producer.name(),
            "producing subscription artifact"
        );

        let url = sub.url.clone();
        let request = ArtifactRequest::subscription(sub, platform.clone(), query.raw);
        let (produced, usage) = tokio::join!(
            self.producer.produce(request),
            self.forwarder.fetch_usage_header(&url)
        );

        let body = match produced {
            Ok(body) => body,
            Err(e) => {
                let message = e.to_string();
                tracing::error!(name, error = %message, "artifact production failed");
                self.notifier.notify(Notification::new(
                    NOTIFY_TITLE,
                    format!("failed to produce subscription: {}", name),
                    Some(message.clone()),
                ));
                return Err(Error::Artifact(message));
            }
        };

        let usage = match usage {
            Ok(usage) => usage,
            Err(e) => {
                tracing::warn!(name, url = %url, error = %e, "could not fetch usage header");
                None
            }
        };

        Ok(DownloadArtifact {
            body,
            platform,
            usage,
        })
    }
}
