//! Collection handlers.

use super::success;
use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /api/collections - List all collections
#[utoipa::path(
    get,
    path = "/api/collections",
    tag = "collections",
    responses(
        (status = 200, description = "Collections keyed by name", body = super::CollectionListResponse),
        (status = 500, description = "Store error", body = crate::error::ApiError)
    )
)]
pub async fn list_collections(State(state): State<AppState>) -> Response {
    match state.service.registry.collections().await {
        Ok(collections) => (StatusCode::OK, Json(success(collections))).into_response(),
        Err(e) => e.into_response(),
    }
}
