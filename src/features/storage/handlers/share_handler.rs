use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::storage::dtos::ShareAccessQuery;
use crate::features::storage::services::ShareService;
use crate::shared::http::attachment_response;
use crate::shared::types::ErrorResponse;

/// Download a shared file (public)
#[utoipa::path(
    get,
    path = "/s/{share_id}",
    params(
        ("share_id" = String, Path, description = "Share identifier"),
        ShareAccessQuery
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 401, description = "Password required", body = ErrorResponse),
        (status = 404, description = "Share or file not found", body = ErrorResponse),
        (status = 410, description = "Share expired or download limit reached", body = ErrorResponse)
    ),
    tag = "shares"
)]
pub async fn access_share(
    State(service): State<Arc<ShareService>>,
    Path(share_id): Path<String>,
    Query(query): Query<ShareAccessQuery>,
) -> Result<Response> {
    let shared = service
        .resolve(&share_id, query.password.as_deref())
        .await?;

    attachment_response(
        shared.object.body,
        &shared.object.meta.content_type,
        &shared.file_name,
        &[],
    )
}
