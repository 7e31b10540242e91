//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the sub-store REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the sub-store REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "sub-store REST API",
        version = "0.1.0",
        description = "Subscription registry and per-client download endpoint for proxy node lists",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Subscriptions
        crate::api::routes::list_subscriptions,
        crate::api::routes::create_subscription,
        crate::api::routes::get_subscription,
        crate::api::routes::update_subscription,
        crate::api::routes::delete_subscription,

        // Collections
        crate::api::routes::list_collections,

        // Download
        crate::api::routes::download_subscription,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::Subscription,
        crate::types::SubscriptionPatch,
        crate::types::Collection,
        crate::platform::Platform,
        crate::dispatch::DownloadQuery,

        // Config types from config.rs
        crate::config::Config,
        crate::config::PersistenceConfig,
        crate::config::ServerIntegrationConfig,
        crate::config::ApiConfig,
        crate::config::UpstreamConfig,
        crate::config::NotificationConfig,
        crate::config::WebhookConfig,

        // API response envelopes from routes
        crate::api::routes::SubscriptionResponse,
        crate::api::routes::SubscriptionListResponse,
        crate::api::routes::CollectionListResponse,
        crate::api::routes::StatusResponse,

        // Error types from error.rs
        crate::error::ApiError,
    )),
    tags(
        (name = "subscriptions", description = "Subscriptions - Create, read, update, rename and delete subscriptions"),
        (name = "collections", description = "Collections - Read the collection mapping kept consistent by renames and deletes"),
        (name = "download", description = "Download - Produce a subscription for the requesting client"),
        (name = "system", description = "System endpoints - Health check and OpenAPI spec"),
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_has_every_route() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&str> = spec.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/subs",
            "/api/sub/{name}",
            "/api/collections",
            "/download/{name}",
            "/health",
            "/openapi.json",
        ] {
            assert!(paths.contains(&expected), "missing path {}", expected);
        }
    }

    #[test]
    fn test_openapi_spec_has_components() {
        let spec = ApiDoc::openapi();
        let components = spec.components.unwrap();

        assert!(components.schemas.contains_key("Subscription"));
        assert!(components.schemas.contains_key("ApiError"));
    }

    #[test]
    fn test_openapi_spec_has_tags() {
        let spec = ApiDoc::openapi();
        let tags = spec.tags.unwrap();

        let tag_names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert!(tag_names.contains(&"subscriptions"));
        assert!(tag_names.contains(&"download"));
        assert!(tag_names.contains(&"system"));
    }

    #[test]
    fn test_openapi_spec_info() {
        let spec = ApiDoc::openapi();

        assert_eq!(spec.info.title, "sub-store REST API");
        assert!(spec.info.description.is_some());
    }
}
