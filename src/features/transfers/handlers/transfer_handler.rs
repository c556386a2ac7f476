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
use crate::features::auth::model::AuthenticatedUser;
use crate::features::transfers::dtos::{
    ArchiveRequestDto, DownloadQuery, TransferUploadFormDto, TransferUploadResponseDto,
};
use crate::features::transfers::models::failure_summary;
use crate::features::transfers::services::{
    ArchiveService, ReplicationService, RetrievalService, SourceFile,
};
use crate::shared::constants::{DEFAULT_ARCHIVE_NAME, DEFAULT_CONTENT_TYPE};
use crate::shared::http::attachment_response;
use crate::shared::types::ErrorResponse;

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    debug!("Failed to read multipart field: {}", e);
    AppError::BadRequest(format!("Failed to read multipart data: {}", e))
}

/// Replicate files to several providers
///
/// Each file is uploaded to every target provider concurrently and every
/// call is allowed to settle. A file is `complete` only if all providers
/// accepted it. The request fails only when no provider accepted any file.
#[utoipa::path(
    post,
    path = "/transfers/upload",
    request_body(content = TransferUploadFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Per-file replication reports", body = TransferUploadResponseDto),
        (status = 400, description = "No file or no target provider", body = ErrorResponse),
        (status = 404, description = "Unknown provider", body = ErrorResponse),
        (status = 502, description = "Every provider failed", body = ErrorResponse)
    ),
    tag = "transfers",
    security(("bearer_auth" = []))
)]
pub async fn upload_files(
    user: AuthenticatedUser,
    State(service): State<Arc<ReplicationService>>,
    mut multipart: Multipart,
) -> Result<Json<TransferUploadResponseDto>> {
    let mut files = Vec::new();
    let mut base_path = String::from("/");
    let mut provider_ids: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name().unwrap_or("") {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
                let source_path = field.file_name().unwrap_or("").to_string();
                let data: Bytes = field.bytes().await.map_err(multipart_error)?;

                if source_path.trim_matches('/').is_empty() {
                    return Err(AppError::BadRequest("File name required".to_string()));
                }
                files.push(SourceFile {
                    source_path,
                    content_type,
                    data,
                });
            }
            "path" => base_path = field.text().await.map_err(multipart_error)?,
            "providers" => {
                let value = field.text().await.map_err(multipart_error)?;
                provider_ids.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(String::from),
                );
            }
            other => debug!("Ignoring unknown field: {}", other),
        }
    }

    let reports = service
        .upload(&user.user_id, files, &provider_ids, &base_path)
        .await?;

    if reports.iter().all(|r| r.succeeded.is_empty()) {
        let listing = reports
            .iter()
            .map(|r| format!("{}: {}", r.key, failure_summary(&r.failed)))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AppError::ProviderUnavailable(format!(
            "All providers failed: {}",
            listing
        )));
    }

    Ok(Json(TransferUploadResponseDto { files: reports }))
}

/// Download a file from one provider holding it
///
/// Uses `provider` when it holds a copy, otherwise the first provider in the
/// catalog entry. A failed fetch is not retried elsewhere.
#[utoipa::path(
    get,
    path = "/transfers/download",
    params(DownloadQuery),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Key required or key is a directory", body = ErrorResponse),
        (status = 404, description = "File or provider not found", body = ErrorResponse),
        (status = 502, description = "Provider unavailable", body = ErrorResponse)
    ),
    tag = "transfers",
    security(("bearer_auth" = []))
)]
pub async fn download_file(
    user: AuthenticatedUser,
    State(service): State<Arc<RetrievalService>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let key = query
        .key
        .filter(|k| !k.trim_matches('/').is_empty())
        .ok_or_else(|| AppError::BadRequest("Key required".to_string()))?;

    let retrieved = service
        .fetch(&user.user_id, &key, query.provider.as_deref())
        .await?;

    attachment_response(
        retrieved.object.data,
        &retrieved.object.content_type,
        &retrieved.file_name,
        &[
            ("x-provider-id", retrieved.provider_id),
            ("x-download-task-id", retrieved.task_id),
        ],
    )
}

/// Download several files as one zip archive
///
/// Directories and files that cannot be fetched are skipped. Files sharing
/// a base name collide; the last one wins.
#[utoipa::path(
    post,
    path = "/transfers/archive",
    request_body = ArchiveRequestDto,
    responses(
        (status = 200, description = "Zip archive", content_type = "application/zip"),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 422, description = "No files could be added", body = ErrorResponse)
    ),
    tag = "transfers",
    security(("bearer_auth" = []))
)]
pub async fn download_archive(
    user: AuthenticatedUser,
    State(service): State<Arc<ArchiveService>>,
    ValidJson(dto): ValidJson<ArchiveRequestDto>,
) -> Result<Response> {
    let report = service
        .build(&user.user_id, &dto.keys, &dto.preferred_providers)
        .await?;

    let name = match dto.name.as_deref().map(str::trim) {
        Some(name) if name.ends_with(".zip") => name.to_string(),
        Some(name) if !name.is_empty() => format!("{}.zip", name),
        _ => DEFAULT_ARCHIVE_NAME.to_string(),
    };

    attachment_response(
        Bytes::from(report.bytes),
        "application/zip",
        &name,
        &[
            ("x-archive-entries", report.entries.to_string()),
            ("x-archive-skipped", report.skipped.len().to_string()),
        ],
    )
}
