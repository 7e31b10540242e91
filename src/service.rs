//! Service assembly
//!
//! [`SubStore`] owns the store and the components built on top of it. The API
//! layer only ever talks to it through [`crate::api::AppState`].

use crate::artifact::{ArtifactProducer, RemoteArtifactProducer};
use crate::config::Config;
use crate::db::Database;
use crate::dispatch::DownloadDispatcher;
use crate::error::Result;
use crate::kv::{self, KeyValueStore};
use crate::notify::{LogNotifier, Notifier, WebhookNotifier};
use crate::registry::SubscriptionRegistry;
use crate::upstream::{UpstreamClient, UpstreamHeaderForwarder};
use std::sync::Arc;

/// The assembled subscription service
pub struct SubStore {
    /// Configuration the service was built from
    pub(crate) config: Arc<Config>,
    /// Backing key-value store
    pub(crate) store: Arc<dyn KeyValueStore>,
    /// Subscription CRUD
    pub registry: Arc<SubscriptionRegistry>,
    /// `/download/:name` handling
    pub dispatcher: Arc<DownloadDispatcher>,
}

impl SubStore {
    /// Open the SQLite store from `config` and wire the default components
    ///
    /// Creates the database file if needed, runs migrations and seeds the
    /// `subs` and `collections` keys.
    pub async fn new(config: Config) -> Result<Self> {
        let db = Database::new(&config.persistence.database_path).await?;
        tracing::info!(
            path = %config.persistence.database_path.display(),
            "opened subscription store"
        );
        Self::with_store(config, Arc::new(db)).await
    }

    /// Wire the default components over an existing store
    ///
    /// The remote producer and the usage-header forwarder share one
    /// upstream client.
    pub async fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let client = UpstreamClient::new(&config.upstream)?;
        let producer: Arc<dyn ArtifactProducer> =
            Arc::new(RemoteArtifactProducer::new(client.clone()));

        let notifier: Arc<dyn Notifier> = if config.notifications.webhooks.is_empty() {
            Arc::new(LogNotifier)
        } else {
            Arc::new(WebhookNotifier::new(config.notifications.webhooks.clone()))
        };

        Self::assemble(config, store, client, producer, notifier).await
    }

    /// Wire the service from explicit collaborators
    pub async fn with_components(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        producer: Arc<dyn ArtifactProducer>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let client = UpstreamClient::new(&config.upstream)?;
        Self::assemble(config, store, client, producer, notifier).await
    }

    async fn assemble(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        client: UpstreamClient,
        producer: Arc<dyn ArtifactProducer>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        kv::ensure_initialized(store.as_ref()).await?;

        let forwarder = UpstreamHeaderForwarder::new(client);
        let registry = Arc::new(SubscriptionRegistry::new(store.clone()));
        let dispatcher = Arc::new(DownloadDispatcher::new(
            registry.clone(),
            producer.clone(),
            forwarder,
            notifier,
        ));

        tracing::debug!(
            store = store.name(),
            producer = producer.name(),
            "sub-store components ready"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            registry,
            dispatcher,
        })
    }

    /// Configuration the service was built from
    pub fn get_config(&self) -> Arc<Config> {
        self.config.clone()
    }

    /// Spawn the REST API server in a background task
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let service = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(service, config).await })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{COLLECTIONS_KEY, MemoryStore, SUBS_KEY};
    use crate::types::Subscription;
    use serde_json::json;
    use tempfile::tempdir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn new_seeds_empty_mappings_in_sqlite() {
        let dir = tempdir().unwrap();
        let config = Config {
            persistence: crate::config::PersistenceConfig {
                database_path: dir.path().join("store.db"),
            },
            ..Default::default()
        };

        let service = SubStore::new(config).await.unwrap();

        assert_eq!(service.store.read(SUBS_KEY).await.unwrap(), Some(json!({})));
        assert_eq!(
            service.store.read(COLLECTIONS_KEY).await.unwrap(),
            Some(json!({}))
        );
    }

    #[tokio::test]
    async fn reopening_keeps_existing_subscriptions() {
        let dir = tempdir().unwrap();
        let config = Config {
            persistence: crate::config::PersistenceConfig {
                database_path: dir.path().join("store.db"),
            },
            ..Default::default()
        };

        {
            let service = SubStore::new(config.clone()).await.unwrap();
            service
                .registry
                .create(Subscription::new("work", "https://example.com/a"))
                .await
                .unwrap();
        }

        let service = SubStore::new(config).await.unwrap();
        let sub = service.registry.get("work").await.unwrap();
        assert_eq!(sub.url, "https://example.com/a");
    }

    #[tokio::test]
    async fn with_store_uses_the_given_store() {
        let store = Arc::new(MemoryStore::new());
        let service = SubStore::with_store(Config::default(), store.clone())
            .await
            .unwrap();

        service
            .registry
            .create(Subscription::new("home", "https://example.com/h"))
            .await
            .unwrap();

        let raw = store.read(SUBS_KEY).await.unwrap().unwrap();
        assert_eq!(raw["home"]["url"], "https://example.com/h");
    }

    #[tokio::test]
    async fn producer_and_forwarder_use_the_configured_client() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sub"))
            .and(header("User-Agent", "sub-store-test/1.0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("vmess://node\n")
                    .insert_header("subscription-userinfo", "upload=1; download=2"),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let config = Config {
            upstream: crate::config::UpstreamConfig {
                user_agent: "sub-store-test/1.0".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let service = SubStore::with_store(config, Arc::new(MemoryStore::new()))
            .await
            .unwrap();
        service
            .registry
            .create(Subscription::new("work", format!("{}/sub", mock_server.uri())))
            .await
            .unwrap();

        let artifact = service
            .dispatcher
            .download(
                "work",
                &crate::dispatch::DownloadQuery {
                    raw: false,
                    target: Some("Surge".into()),
                },
                &axum::http::HeaderMap::new(),
            )
            .await
            .unwrap();

        assert_eq!(artifact.body, "vmess://node\n");
        assert_eq!(artifact.usage.as_deref(), Some("upload=1; download=2"));
    }
}
