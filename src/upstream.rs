//! Upstream subscription fetching and usage-header forwarding

use crate::config::UpstreamConfig;
use crate::error::{Error, Result};
use std::time::Duration;

/// Response header carrying upstream traffic/quota metadata
pub const USAGE_HEADER: &str = "subscription-userinfo";

/// HTTP client for upstream subscription servers
///
/// Sends the configured client identifier and enforces the configured timeout
/// on every request.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl UpstreamClient {
    /// Build a client from configuration
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Upstream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    /// GET `url`, failing on transport errors and non-2xx statuses
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await.map_err(|e| {
            let error_msg = if e.is_timeout() {
                format!(
                    "Timeout fetching '{}' (exceeded {} seconds)",
                    url,
                    self.timeout.as_secs()
                )
            } else if e.is_connect() {
                format!("Connection failed for '{}': {}", url, e)
            } else {
                format!("Failed to fetch '{}': {}", url, e)
            };
            Error::Upstream(error_msg)
        })?;

        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "HTTP error fetching subscription: {} {}",
                response.status(),
                url
            )));
        }

        Ok(response)
    }
}

/// Fetches the `subscription-userinfo` header from a subscription's upstream
#[derive(Clone, Debug)]
pub struct UpstreamHeaderForwarder {
    client: UpstreamClient,
}

impl UpstreamHeaderForwarder {
    /// Create a forwarder sharing `client`
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    /// Return the upstream usage header, or `None` if upstream sends none
    ///
    /// Errors are returned to the caller, which is expected to log and drop
    /// them rather than fail the download.
    pub async fn fetch_usage_header(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.get(url).await?;

        // reqwest header lookup is case-insensitive
        let value = response
            .headers()
            .get(USAGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if value.is_none() {
            tracing::debug!(url, "upstream sent no usage header");
        }
        Ok(value)
    }
}
