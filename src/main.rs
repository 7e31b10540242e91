//! sub-store server entry point

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use sub_store::{Config, SubStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for sub-store
#[derive(Parser, Debug)]
#[command(name = "sub-store")]
#[command(about = "Subscription registry and download service for proxy clients")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "SUB_STORE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration file
    #[arg(short, long, env = "SUB_STORE_BIND")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> sub_store::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sub_store=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading configuration");
            Config::from_toml_file(path)?
        }
        None => Config::default(),
    };
    if let Some(bind) = args.bind {
        config.server.api.bind_address = bind;
    }

    let service = match SubStore::new(config).await {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!(error = %e, "failed to start sub-store");
            return Err(e);
        }
    };

    sub_store::run_with_shutdown(service).await?;

    tracing::info!("sub-store shutdown complete");
    Ok(())
}
