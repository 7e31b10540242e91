//! REST API server module
//!
//! Serves the subscription registry under `/api`, the per-client download
//! endpoint under `/download`, plus health and OpenAPI endpoints.

use crate::{Config, Result, SubStore};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Download
/// - `GET /download/:name` - Produce a subscription (`raw`, `target` query)
///
/// ## Subscriptions
/// - `GET /api/subs` - List all subscriptions
/// - `POST /api/subs` - Create subscription
/// - `GET /api/sub/:name` - Get subscription
/// - `PATCH /api/sub/:name` - Update or rename subscription
/// - `DELETE /api/sub/:name` - Delete subscription
///
/// ## Collections
/// - `GET /api/collections` - List all collections
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(service: Arc<SubStore>, config: Arc<Config>) -> Router {
    let state = AppState::new(service, config.clone());

    let router = Router::new()
        // Download
        .route("/download/:name", get(routes::download_subscription))
        // Subscriptions
        .route("/api/subs", get(routes::list_subscriptions))
        .route("/api/subs", post(routes::create_subscription))
        .route(
            "/api/sub/:name",
            get(routes::get_subscription)
                .patch(routes::update_subscription)
                .delete(routes::delete_subscription),
        )
        // Collections
        .route("/api/collections", get(routes::list_collections))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // SwaggerUi registers its own spec route, so it gets a path distinct from /openapi.json
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed
/// origins are allowed. Methods and headers are always unrestricted.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server fails. See [`start_api_server_with_shutdown`] for a
/// server that stops on a signal.
///
/// # Example
///
/// ```no_run
/// use sub_store::{SubStore, Config};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let service = Arc::new(SubStore::new((*config).clone()).await?);
///
/// // Start API server (blocks until the server stops)
/// sub_store::api::start_api_server(service, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(service: Arc<SubStore>, config: Arc<Config>) -> Result<()> {
    start_api_server_with_shutdown(service, config, std::future::pending()).await
}

/// Start the API server and stop gracefully once `shutdown` resolves
///
/// In-flight requests are allowed to finish before this returns.
pub async fn start_api_server_with_shutdown<F>(
    service: Arc<SubStore>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(service, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
