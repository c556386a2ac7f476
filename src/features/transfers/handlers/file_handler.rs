use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::ValidJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::storage::dtos::ShareLinkDto;
use crate::features::transfers::dtos::{DeleteFilesDto, ShareFileDto};
use crate::features::transfers::models::DeletionReport;
use crate::features::transfers::services::{DeletionService, RetrievalService};
use crate::shared::types::ErrorResponse;

/// Delete files from every provider holding them
///
/// Per-provider and catalog failures are reported per key, not raised. The
/// catalog entry is removed either way; keys not in the catalog are ignored.
#[utoipa::path(
    delete,
    path = "/files",
    request_body = DeleteFilesDto,
    responses(
        (status = 200, description = "Per-key deletion report", body = DeletionReport),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "transfers",
    security(("bearer_auth" = []))
)]
pub async fn delete_files(
    user: AuthenticatedUser,
    State(service): State<Arc<DeletionService>>,
    ValidJson(dto): ValidJson<DeleteFilesDto>,
) -> Json<DeletionReport> {
    Json(service.delete(&user.user_id, &dto.keys).await)
}

/// Create a public share link on a provider holding the file
#[utoipa::path(
    post,
    path = "/files/share",
    request_body = ShareFileDto,
    responses(
        (status = 200, description = "Share created", body = ShareLinkDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "File not found or no provider holds it", body = ErrorResponse),
        (status = 502, description = "Provider unavailable", body = ErrorResponse)
    ),
    tag = "transfers",
    security(("bearer_auth" = []))
)]
pub async fn share_file(
    user: AuthenticatedUser,
    State(service): State<Arc<RetrievalService>>,
    ValidJson(dto): ValidJson<ShareFileDto>,
) -> Result<Json<ShareLinkDto>> {
    Ok(Json(service.share(&user.user_id, dto).await?))
}
