use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ValidJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::catalog::dtos::{
    AppendCatalogEntryDto, CatalogEntryResponseDto, CatalogKeyQuery, CatalogListResponseDto,
    CatalogQuery,
};
use crate::features::catalog::services::CatalogService;
use crate::shared::types::{ErrorResponse, SuccessResponse};

/// List catalog entries
#[utoipa::path(
    get,
    path = "/files/metadata",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Catalog entries", body = CatalogListResponseDto),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "catalog",
    security(("bearer_auth" = []))
)]
pub async fn list_entries(
    user: AuthenticatedUser,
    State(service): State<Arc<CatalogService>>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogListResponseDto>> {
    let files = service.list(&user.user_id, query.prefix.as_deref()).await?;
    Ok(Json(CatalogListResponseDto { files }))
}

/// Record a provider copy of a file
///
/// Adds the provider to the entry for `key`, creating the entry if needed.
/// Used to resync the catalog after a copy was written outside a transfer.
#[utoipa::path(
    post,
    path = "/files/metadata",
    request_body = AppendCatalogEntryDto,
    responses(
        (status = 200, description = "Entry updated", body = CatalogEntryResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Provider not found", body = ErrorResponse)
    ),
    tag = "catalog",
    security(("bearer_auth" = []))
)]
pub async fn append_entry(
    user: AuthenticatedUser,
    State(service): State<Arc<CatalogService>>,
    ValidJson(dto): ValidJson<AppendCatalogEntryDto>,
) -> Result<Json<CatalogEntryResponseDto>> {
    let (record, provider_id) = dto.into_record();
    let entry = service.append(&user.user_id, record, &provider_id).await?;
    Ok(Json(CatalogEntryResponseDto {
        success: true,
        entry,
    }))
}

/// Remove a catalog entry without touching provider copies
#[utoipa::path(
    delete,
    path = "/files/metadata",
    params(CatalogKeyQuery),
    responses(
        (status = 200, description = "Entry removed", body = SuccessResponse),
        (status = 400, description = "Key required", body = ErrorResponse)
    ),
    tag = "catalog",
    security(("bearer_auth" = []))
)]
pub async fn remove_entry(
    user: AuthenticatedUser,
    State(service): State<Arc<CatalogService>>,
    Query(query): Query<CatalogKeyQuery>,
) -> Result<Json<SuccessResponse>> {
    let key = query
        .key
        .filter(|k| !k.trim_matches('/').is_empty())
        .ok_or_else(|| AppError::BadRequest("Key required".to_string()))?;

    service.remove(&user.user_id, &key).await?;
    Ok(Json(SuccessResponse::ok()))
}
