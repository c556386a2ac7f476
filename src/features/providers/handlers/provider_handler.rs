use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::ValidJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::providers::dtos::{
    BrowseQuery, ConnectionTestResponseDto, CreateProviderDto, ProviderListResponseDto,
    ProviderResponseDto, UpdateProviderDto,
};
use crate::features::providers::services::ProviderService;
use crate::features::storage::dtos::{FileListResponseDto, StorageStatsDto};
use crate::shared::types::{ErrorResponse, SuccessResponse};

/// List registered providers
#[utoipa::path(
    get,
    path = "/providers",
    responses(
        (status = 200, description = "Registered providers", body = ProviderListResponseDto),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "providers",
    security(("bearer_auth" = []))
)]
pub async fn list_providers(
    user: AuthenticatedUser,
    State(service): State<Arc<ProviderService>>,
) -> Result<Json<ProviderListResponseDto>> {
    let providers = service.list(&user.user_id).await?;
    Ok(Json(ProviderListResponseDto { providers }))
}

/// Register a provider
#[utoipa::path(
    post,
    path = "/providers",
    request_body = CreateProviderDto,
    responses(
        (status = 201, description = "Provider registered", body = ProviderResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "providers",
    security(("bearer_auth" = []))
)]
pub async fn create_provider(
    user: AuthenticatedUser,
    State(service): State<Arc<ProviderService>>,
    ValidJson(dto): ValidJson<CreateProviderDto>,
) -> Result<(StatusCode, Json<ProviderResponseDto>)> {
    let provider = service.add(&user.user_id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProviderResponseDto {
            success: true,
            provider,
        }),
    ))
}

/// Update a provider
#[utoipa::path(
    put,
    path = "/providers/{id}",
    params(("id" = String, Path, description = "Provider ID")),
    request_body = UpdateProviderDto,
    responses(
        (status = 200, description = "Provider updated", body = ProviderResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Provider not found", body = ErrorResponse)
    ),
    tag = "providers",
    security(("bearer_auth" = []))
)]
pub async fn update_provider(
    user: AuthenticatedUser,
    State(service): State<Arc<ProviderService>>,
    Path(id): Path<String>,
    ValidJson(dto): ValidJson<UpdateProviderDto>,
) -> Result<Json<ProviderResponseDto>> {
    let provider = service.update(&user.user_id, &id, dto).await?;
    Ok(Json(ProviderResponseDto {
        success: true,
        provider,
    }))
}

/// Remove a provider
///
/// Also removes the provider from every catalog entry; entries no other
/// provider holds are dropped.
#[utoipa::path(
    delete,
    path = "/providers/{id}",
    params(("id" = String, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Provider removed", body = SuccessResponse),
        (status = 404, description = "Provider not found", body = ErrorResponse)
    ),
    tag = "providers",
    security(("bearer_auth" = []))
)]
pub async fn delete_provider(
    user: AuthenticatedUser,
    State(service): State<Arc<ProviderService>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    service.remove(&user.user_id, &id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Test connectivity to a provider
#[utoipa::path(
    post,
    path = "/providers/{id}/test",
    params(("id" = String, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Provider reachable", body = ConnectionTestResponseDto),
        (status = 400, description = "Provider unreachable", body = ConnectionTestResponseDto),
        (status = 404, description = "Provider not found", body = ErrorResponse)
    ),
    tag = "providers",
    security(("bearer_auth" = []))
)]
pub async fn test_provider(
    user: AuthenticatedUser,
    State(service): State<Arc<ProviderService>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ConnectionTestResponseDto>)> {
    let outcome = service.test_connection(&user.user_id, &id).await?;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(outcome)))
}

/// Storage usage reported by a provider
#[utoipa::path(
    get,
    path = "/providers/{id}/stats",
    params(("id" = String, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Provider statistics", body = StorageStatsDto),
        (status = 404, description = "Provider not found", body = ErrorResponse),
        (status = 502, description = "Provider unavailable", body = ErrorResponse)
    ),
    tag = "providers",
    security(("bearer_auth" = []))
)]
pub async fn provider_stats(
    user: AuthenticatedUser,
    State(service): State<Arc<ProviderService>>,
    Path(id): Path<String>,
) -> Result<Json<StorageStatsDto>> {
    Ok(Json(service.stats(&user.user_id, &id).await?))
}

/// Browse one provider's raw listing
#[utoipa::path(
    get,
    path = "/providers/{id}/files",
    params(("id" = String, Path, description = "Provider ID"), BrowseQuery),
    responses(
        (status = 200, description = "Provider listing", body = FileListResponseDto),
        (status = 404, description = "Provider not found", body = ErrorResponse),
        (status = 502, description = "Provider unavailable", body = ErrorResponse)
    ),
    tag = "providers",
    security(("bearer_auth" = []))
)]
pub async fn browse_provider(
    user: AuthenticatedUser,
    State(service): State<Arc<ProviderService>>,
    Path(id): Path<String>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<FileListResponseDto>> {
    let files = service
        .browse(&user.user_id, &id, query.prefix.as_deref())
        .await?;
    Ok(Json(FileListResponseDto { files }))
}
