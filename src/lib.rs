//! # sub-store
//!
//! Subscription registry and per-client download service for proxy node lists.
//!
//! ## Overview
//!
//! - **Registry** - named subscriptions (a name plus an upstream URL plus
//!   caller-defined fields) stored in a key-value store, with renames and
//!   deletes cascading into the collections that reference them
//! - **Download** - `GET /download/:name` detects the client from its
//!   `User-Agent` (or takes `?target=`), produces the artifact for that
//!   platform and passes the upstream `subscription-userinfo` header through
//! - **Pluggable** - the artifact producer, notifier and store are traits
//!
//! ## Quick Start
//!
//! ```no_run
//! use sub_store::{Config, SubStore, Subscription};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = SubStore::new(Config::default()).await?;
//!
//!     service
//!         .registry
//!         .create(Subscription::new("work", "https://provider.example/sub?token=abc"))
//!         .await?;
//!
//!     let work = service.registry.get("work").await?;
//!     println!("{} -> {}", work.name, work.url);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Artifact production seam
pub mod artifact;
/// Configuration types
pub mod config;
/// SQLite key-value persistence
pub mod db;
/// `/download/:name` orchestration
pub mod dispatch;
/// Error types
pub mod error;
/// Key-value store abstraction
pub mod kv;
/// Side-channel notifications
pub mod notify;
/// Client platforms and user-agent detection
pub mod platform;
/// Subscription registry
pub mod registry;
/// Service assembly
pub mod service;
/// Core domain types
pub mod types;
/// Upstream fetching and usage-header forwarding
pub mod upstream;

// Re-export commonly used types
pub use artifact::{ArtifactKind, ArtifactProducer, ArtifactRequest, RemoteArtifactProducer};
pub use config::Config;
pub use db::Database;
pub use dispatch::{DownloadArtifact, DownloadDispatcher, DownloadQuery};
pub use error::{ApiError, Error, Result, StoreError, ToHttpStatus};
pub use kv::{KeyValueStore, MemoryStore};
pub use notify::{LogNotifier, Notification, Notifier, WebhookNotifier};
pub use platform::Platform;
pub use registry::SubscriptionRegistry;
pub use service::SubStore;
pub use types::{Collection, Subscription, SubscriptionPatch};
pub use upstream::{UpstreamClient, UpstreamHeaderForwarder};

/// Helper function to serve the API until a termination signal arrives.
///
/// Binds the configured address, serves requests and, on a signal, stops
/// accepting connections and lets in-flight requests finish.
///
/// - **Unix:** stops on Ctrl+C (SIGINT) or SIGTERM.
/// - **Other platforms:** stops on Ctrl+C.
///
/// # Example
///
/// ```no_run
/// use sub_store::{Config, SubStore, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = SubStore::new(Config::default()).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(Arc::new(service)).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(service: std::sync::Arc<SubStore>) -> Result<()> {
    let config = service.get_config();
    api::start_api_server_with_shutdown(service, config, wait_for_signal()).await
}

/// Resolve once the process is asked to stop (Ctrl+C, or SIGTERM on unix)
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received, stopping sub-store"),
        _ = terminate => tracing::info!("SIGTERM received, stopping sub-store"),
    }
}
