use axum::{
    extract::{Multipart, Query, State},
    response::Response,
    Json,
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::ValidJson;
use crate::features::storage::dtos::{
    CreateShareRequestDto, FileListResponseDto, KeyQuery, ListFilesQuery, ShareLinkDto,
    StorageStatsDto, UploadFormDto, UploadResponseDto,
};
use crate::features::storage::services::{ShareService, StorageService};
use crate::shared::constants::DEFAULT_CONTENT_TYPE;
use crate::shared::http::attachment_response;
use crate::shared::paths;
use crate::shared::types::{ErrorResponse, SuccessResponse};

fn required_key(query: KeyQuery) -> Result<String> {
    query
        .key
        .filter(|k| !paths::object_key(k).is_empty())
        .ok_or_else(|| AppError::BadRequest("Key required".to_string()))
}

/// List one level of files and directories
#[utoipa::path(
    get,
    path = "/api/files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Directory listing", body = FileListResponseDto),
        (status = 401, description = "Invalid provider credential", body = ErrorResponse)
    ),
    tag = "storage",
    security(("provider_auth" = []))
)]
pub async fn list_files(
    State(service): State<Arc<StorageService>>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<FileListResponseDto>> {
    let files = service.list(query.prefix.as_deref()).await?;
    Ok(Json(FileListResponseDto { files }))
}

/// Upload a file
///
/// Accepts multipart/form-data with `file` and an optional destination `path`.
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponseDto),
        (status = 400, description = "No file provided", body = ErrorResponse),
        (status = 401, description = "Invalid provider credential", body = ErrorResponse)
    ),
    tag = "storage",
    security(("provider_auth" = []))
)]
pub async fn upload_file(
    State(service): State<Arc<StorageService>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponseDto>> {
    let mut file: Option<(String, String, Bytes)> = None;
    let mut path = String::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        match field.name().unwrap_or("") {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
                file = Some((file_name, content_type, data));
            }
            "path" => {
                path = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read path field: {}", e))
                })?;
            }
            other => debug!("Ignoring unknown field: {}", other),
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let response = service
        .upload(&path, &file_name, data, &content_type)
        .await?;
    Ok(Json(response))
}

/// Download a file's raw bytes
#[utoipa::path(
    get,
    path = "/api/download",
    params(KeyQuery),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Key required", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    ),
    tag = "storage",
    security(("provider_auth" = []))
)]
pub async fn download_file(
    State(service): State<Arc<StorageService>>,
    Query(query): Query<KeyQuery>,
) -> Result<Response> {
    let key = required_key(query)?;
    let object = service.download(&key).await?;
    attachment_response(
        object.body,
        &object.meta.content_type,
        paths::base_name(&object.meta.key),
        &[],
    )
}

/// Delete a file
#[utoipa::path(
    delete,
    path = "/api/files",
    params(KeyQuery),
    responses(
        (status = 200, description = "File deleted", body = SuccessResponse),
        (status = 400, description = "Key required", body = ErrorResponse)
    ),
    tag = "storage",
    security(("provider_auth" = []))
)]
pub async fn delete_file(
    State(service): State<Arc<StorageService>>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<SuccessResponse>> {
    let key = required_key(query)?;
    service.delete(&key).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Usage statistics of this backend
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Storage usage", body = StorageStatsDto)
    ),
    tag = "storage",
    security(("provider_auth" = []))
)]
pub async fn get_stats(State(service): State<Arc<StorageService>>) -> Result<Json<StorageStatsDto>> {
    Ok(Json(service.stats().await?))
}

/// Create a public share link for a file
#[utoipa::path(
    post,
    path = "/api/share",
    request_body = CreateShareRequestDto,
    responses(
        (status = 200, description = "Share created", body = ShareLinkDto),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    ),
    tag = "storage",
    security(("provider_auth" = []))
)]
pub async fn create_share(
    State(service): State<Arc<ShareService>>,
    ValidJson(dto): ValidJson<CreateShareRequestDto>,
) -> Result<Json<ShareLinkDto>> {
    Ok(Json(service.create(dto).await?))
}
