use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// One entry of a provider listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileEntryDto {
    /// Key with a leading slash; directories end with `/`
    pub key: String,
    pub name: String,
    pub size: u64,
    /// Milliseconds since the Unix epoch
    pub last_modified: i64,
    pub is_directory: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileListResponseDto {
    pub files: Vec<FileEntryDto>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListFilesQuery {
    /// Only list entries below this prefix
    pub prefix: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct KeyQuery {
    /// Object key, with or without a leading slash
    pub key: Option<String>,
}

/// Multipart form accepted by `/api/upload` (documentation only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFormDto {
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Destination folder
    #[schema(example = "/photos/2024")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    pub success: bool,
    pub key: String,
    pub size: u64,
    pub etag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatsDto {
    pub used: u64,
    pub limit: u64,
    pub file_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequestDto {
    #[validate(length(min = 1, message = "Key required"))]
    pub key: String,
    /// Lifetime in seconds (defaults to 7 days)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "expiresIn must be positive"))]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "downloadLimit must be at least 1"))]
    pub download_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinkDto {
    pub share_url: String,
    pub share_id: String,
    /// Milliseconds since the Unix epoch
    pub expires_at: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ShareAccessQuery {
    pub password: Option<String>,
}
