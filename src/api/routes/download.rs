//! Subscription download handler.

use crate::api::AppState;
use crate::dispatch::DownloadQuery;
use crate::upstream::USAGE_HEADER;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};

/// GET /download/:name - Produce a subscription for the requesting client
#[utoipa::path(
    get,
    path = "/download/{name}",
    tag = "download",
    params(
        ("name" = String, Path, description = "Subscription name"),
        ("raw" = Option<String>, Query, description = "Skip processors; 0/false/no/off mean no, any other value means yes"),
        ("target" = Option<String>, Query, description = "Target platform such as QX, Surge, Loon, Clash or JSON; other tags go to the producer as-is")
    ),
    responses(
        (status = 200, description = "Artifact body; JSON content type only for the JSON platform", content_type = "text/plain"),
        (status = 404, description = "Subscription not found", body = crate::error::ApiError),
        (status = 500, description = "Artifact production failed", body = crate::error::ApiError)
    )
)]
pub async fn download_subscription(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Response {
    let artifact = match state
        .service
        .dispatcher
        .download(&name, &query, &headers)
        .await
    {
        Ok(artifact) => artifact,
        Err(e) => return e.into_response(),
    };

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(artifact.content_type()),
    );

    if let Some(usage) = &artifact.usage {
        match HeaderValue::from_str(usage) {
            Ok(value) => {
                response_headers.insert(HeaderName::from_static(USAGE_HEADER), value);
            }
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "dropping malformed usage header");
            }
        }
    }

    (StatusCode::OK, response_headers, artifact.body).into_response()
}
