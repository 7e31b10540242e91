//! Side-channel notifications
//!
//! Notifications are fire-and-forget: [`Notifier::notify`] never blocks the
//! caller and never reports failure back.

use crate::config::WebhookConfig;
use serde::Serialize;
use std::sync::Arc;

/// A single notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Short headline
    pub title: String,
    /// Secondary line
    pub subtitle: String,
    /// Optional detail text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Unix timestamp (seconds) when the notification was raised
    pub timestamp: i64,
}

impl Notification {
    /// Build a notification stamped with the current time
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>, body: Option<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            body,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Destination for notifications
pub trait Notifier: Send + Sync {
    /// Emit `notification` without waiting for delivery
    fn notify(&self, notification: Notification);
}

/// Notifier that only writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            title = %notification.title,
            subtitle = %notification.subtitle,
            body = notification.body.as_deref().unwrap_or(""),
            "notification"
        );
    }
}

/// Notifier that logs and POSTs the notification to every configured webhook
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    webhooks: Arc<[WebhookConfig]>,
}

impl WebhookNotifier {
    /// Create a notifier for `webhooks`
    pub fn new(webhooks: Vec<WebhookConfig>) -> Self {
        Self {
            webhooks: webhooks.into(),
        }
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, notification: Notification) {
        LogNotifier.notify(notification.clone());

        if self.webhooks.is_empty() {
            return;
        }

        let webhooks = Arc::clone(&self.webhooks);
        let payload = Arc::new(notification);

        tokio::spawn(async move {
            let client = reqwest::Client::new();

            for webhook in webhooks.iter() {
                let mut request = client
                    .post(&webhook.url)
                    .json(payload.as_ref())
                    .timeout(webhook.timeout);

                if let Some(auth) = &webhook.auth_header {
                    request = request.header("Authorization", auth);
                }

                let url = &webhook.url;
                match tokio::time::timeout(webhook.timeout, request.send()).await {
                    Ok(Ok(response)) if response.status().is_success() => {
                        tracing::debug!(url = %url, "webhook sent successfully");
                    }
                    Ok(Ok(response)) => {
                        let status = response.status();
                        let body = response.text().await.unwrap_or_default();
                        tracing::warn!(
                            url = %url,
                            error = %format!("Webhook returned status {}: {}", status, body),
                            "webhook failed"
                        );
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(
                            url = %url,
                            error = %format!("Failed to send webhook: {}", e),
                            "webhook failed"
                        );
                    }
                    Err(_) => {
                        tracing::warn!(
                            url = %url,
                            error = %format!("Webhook timed out after {:?}", webhook.timeout),
                            "webhook timeout"
                        );
                    }
                }
            }
        });
    }
}
