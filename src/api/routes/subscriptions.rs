//! Subscription CRUD handlers.

use super::success;
use crate::api::AppState;
use crate::types::{Subscription, SubscriptionPatch};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /api/subs - List all subscriptions
#[utoipa::path(
    get,
    path = "/api/subs",
    tag = "subscriptions",
    responses(
        (status = 200, description = "Subscriptions keyed by name", body = super::SubscriptionListResponse),
        (status = 500, description = "Store error", body = crate::error::ApiError)
    )
)]
pub async fn list_subscriptions(State(state): State<AppState>) -> Response {
    match state.service.registry.list().await {
        Ok(subs) => (StatusCode::OK, Json(success(subs))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to list subscriptions");
            e.into_response()
        }
    }
}

/// POST /api/subs - Create a subscription
#[utoipa::path(
    post,
    path = "/api/subs",
    tag = "subscriptions",
    request_body(content = crate::types::Subscription, description = "Full subscription record"),
    responses(
        (status = 201, description = "Subscription created", body = super::SubscriptionResponse),
        (status = 400, description = "Empty name or illegal characters", body = crate::error::ApiError),
        (status = 409, description = "A subscription with this name exists", body = crate::error::ApiError),
        (status = 500, description = "Store error", body = crate::error::ApiError)
    )
)]
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(sub): Json<Subscription>,
) -> Response {
    match state.service.registry.create(sub).await {
        Ok(created) => (StatusCode::CREATED, Json(success(created))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/sub/:name - Get one subscription
#[utoipa::path(
    get,
    path = "/api/sub/{name}",
    tag = "subscriptions",
    params(("name" = String, Path, description = "Subscription name")),
    responses(
        (status = 200, description = "The subscription", body = super::SubscriptionResponse),
        (status = 404, description = "Subscription not found", body = crate::error::ApiError)
    )
)]
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.service.registry.get(&name).await {
        Ok(sub) => (StatusCode::OK, Json(success(sub))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PATCH /api/sub/:name - Update or rename a subscription
#[utoipa::path(
    patch,
    path = "/api/sub/{name}",
    tag = "subscriptions",
    params(("name" = String, Path, description = "Current subscription name")),
    request_body(content = crate::types::SubscriptionPatch, description = "Fields to overwrite; a different `name` renames"),
    responses(
        (status = 200, description = "Merged subscription", body = super::SubscriptionResponse),
        (status = 400, description = "New name has illegal characters", body = crate::error::ApiError),
        (status = 404, description = "Subscription not found", body = crate::error::ApiError),
        (status = 409, description = "New name already taken", body = crate::error::ApiError)
    )
)]
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(patch): Json<SubscriptionPatch>,
) -> Response {
    match state.service.registry.update(&name, patch).await {
        Ok(merged) => (StatusCode::OK, Json(success(merged))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /api/sub/:name - Delete a subscription
///
/// Idempotent: deleting a missing name still succeeds.
#[utoipa::path(
    delete,
    path = "/api/sub/{name}",
    tag = "subscriptions",
    params(("name" = String, Path, description = "Subscription name")),
    responses(
        (status = 200, description = "Subscription removed", body = super::StatusResponse),
        (status = 500, description = "Store error", body = crate::error::ApiError)
    )
)]
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.service.registry.delete(&name).await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "success"}))).into_response(),
        Err(e) => {
            tracing::error!(name = %name, error = %e, "failed to delete subscription");
            e.into_response()
        }
    }
}
