use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::transfers::models::{DownloadTask, ReplicationReport, UploadTask};

/// Multipart form accepted by `/transfers/upload` (documentation only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct TransferUploadFormDto {
    /// One or more files; the file name may carry a relative folder
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: Vec<String>,
    /// Base destination folder (defaults to `/`)
    #[schema(example = "/photos")]
    pub path: Option<String>,
    /// Comma-separated provider IDs; defaults to the user's upload targets
    pub providers: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferUploadResponseDto {
    pub files: Vec<ReplicationReport>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DownloadQuery {
    pub key: Option<String>,
    /// Preferred provider ID
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequestDto {
    #[validate(length(min = 1, message = "At least one key is required"))]
    pub keys: Vec<String>,
    /// Preferred provider per key
    #[serde(default)]
    pub preferred_providers: HashMap<String, String>,
    /// Archive file name (defaults to `download.zip`)
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct DeleteFilesDto {
    #[validate(length(min = 1, message = "At least one key is required"))]
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareFileDto {
    #[validate(length(min = 1, message = "Key required"))]
    pub key: String,
    /// Provider to share from; defaults to the first holder
    pub provider_id: Option<String>,
    #[validate(range(min = 1, message = "expiresIn must be positive"))]
    pub expires_in: Option<u64>,
    #[validate(range(min = 1, message = "downloadLimit must be at least 1"))]
    pub download_limit: Option<u32>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadTaskListDto {
    pub tasks: Vec<UploadTask>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DownloadTaskListDto {
    pub tasks: Vec<DownloadTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClearTasksResponseDto {
    pub success: bool,
    pub removed: usize,
}
