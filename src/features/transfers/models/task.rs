use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Records kept in a [`super::TaskStore`]
pub trait TrackedTask: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn owner(&self) -> &str;
    /// Whether "clear completed" removes this task
    fn clearable(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Pending,
    Downloading,
    Complete,
    Failed,
}

/// One file being replicated to several providers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadTask {
    pub id: String,
    #[serde(skip)]
    pub owner: String,
    /// Client-side name, possibly with a relative folder (`photos/a.jpg`)
    pub source_path: String,
    /// Destination folder on every provider
    pub destination_path: String,
    pub providers: Vec<String>,
    pub status: UploadStatus,
    /// Percent sent per provider ID
    pub progress: BTreeMap<String, u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UploadTask {
    pub fn new(owner: &str, source_path: &str, destination_path: &str, providers: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            source_path: source_path.to_string(),
            destination_path: destination_path.to_string(),
            progress: providers.iter().map(|p| (p.clone(), 0)).collect(),
            providers,
            status: UploadStatus::Pending,
            error: None,
            created_at: Utc::now(),
        }
    }
}

impl TrackedTask for UploadTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn clearable(&self) -> bool {
        self.status == UploadStatus::Complete
    }
}

/// One file being fetched from a single provider
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadTask {
    pub id: String,
    #[serde(skip)]
    pub owner: String,
    pub key: String,
    pub file_name: String,
    pub provider_id: String,
    pub status: DownloadStatus,
    pub progress: u8,
    pub bytes_downloaded: u64,
    /// Zero until the provider advertises a length
    pub bytes_total: u64,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadTask {
    pub fn new(owner: &str, key: &str, file_name: &str, provider_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            key: key.to_string(),
            file_name: file_name.to_string(),
            provider_id: provider_id.to_string(),
            status: DownloadStatus::Pending,
            progress: 0,
            bytes_downloaded: 0,
            bytes_total: 0,
            started_at: Utc::now(),
            error: None,
        }
    }
}

impl TrackedTask for DownloadTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn clearable(&self) -> bool {
        !matches!(
            self.status,
            DownloadStatus::Pending | DownloadStatus::Downloading
        )
    }
}
