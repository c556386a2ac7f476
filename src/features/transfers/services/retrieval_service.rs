use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::catalog::models::CatalogEntry;
use crate::features::catalog::services::CatalogService;
use crate::features::providers::clients::{percent, DownloadedObject, ProviderClient};
use crate::features::providers::models::ProviderConfig;
use crate::features::providers::services::ProviderService;
use crate::features::storage::dtos::{CreateShareRequestDto, ShareLinkDto};
use crate::features::transfers::dtos::ShareFileDto;
use crate::features::transfers::models::{DownloadStatus, DownloadTask, TaskStore};
use crate::shared::paths;

/// Picks the preferred provider when it holds a copy, else the first holder
pub fn select_provider<'a>(entry: &'a CatalogEntry, preferred: Option<&str>) -> Result<&'a str> {
    if let Some(preferred) = preferred {
        if let Some(id) = entry.providers.iter().find(|id| *id == preferred) {
            return Ok(id.as_str());
        }
    }

    entry
        .providers
        .first()
        .map(String::as_str)
        .ok_or_else(|| {
            AppError::NoProviderAvailable(format!("No provider holds a copy of {}", entry.key))
        })
}

/// A completed fetch, tracked as a download task
pub struct Retrieved {
    pub task_id: String,
    pub provider_id: String,
    pub file_name: String,
    pub object: DownloadedObject,
}

/// Retrieval Coordinator: one provider per fetch, no fallback on failure
pub struct RetrievalService {
    catalog: Arc<CatalogService>,
    providers: Arc<ProviderService>,
    client: Arc<ProviderClient>,
    downloads: Arc<TaskStore<DownloadTask>>,
}

impl RetrievalService {
    pub fn new(
        catalog: Arc<CatalogService>,
        providers: Arc<ProviderService>,
        client: Arc<ProviderClient>,
        downloads: Arc<TaskStore<DownloadTask>>,
    ) -> Self {
        Self {
            catalog,
            providers,
            client,
            downloads,
        }
    }

    pub async fn entry(&self, user_id: &str, key: &str) -> Result<CatalogEntry> {
        self.catalog
            .get(user_id, key)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    async fn source(
        &self,
        user_id: &str,
        entry: &CatalogEntry,
        preferred: Option<&str>,
    ) -> Result<ProviderConfig> {
        let provider_id = select_provider(entry, preferred)?;
        self.providers.get(user_id, provider_id).await
    }

    /// Fetches `key` from one provider, recording progress on a download task
    pub async fn fetch(
        &self,
        user_id: &str,
        key: &str,
        preferred: Option<&str>,
    ) -> Result<Retrieved> {
        let entry = self.entry(user_id, key).await?;
        if entry.is_directory {
            return Err(AppError::BadRequest(
                "Cannot download a directory".to_string(),
            ));
        }
        let provider = self.source(user_id, &entry, preferred).await?;

        let task = DownloadTask::new(user_id, &entry.key, &entry.name, &provider.id);
        let task_id = task.id.clone();
        self.downloads.insert(task);
        self.downloads
            .update(&task_id, |t| t.status = DownloadStatus::Downloading);

        let downloads = Arc::clone(&self.downloads);
        let progress_task = task_id.clone();
        let on_progress = move |received: u64, total: u64| {
            downloads.update(&progress_task, |t| {
                t.bytes_downloaded = received;
                t.bytes_total = total;
                t.progress = percent(received, total);
            });
        };

        match self
            .client
            .download(&provider, paths::object_key(&entry.key), on_progress)
            .await
        {
            Ok(object) => {
                self.downloads.update(&task_id, |t| {
                    t.status = DownloadStatus::Complete;
                    t.progress = 100;
                    t.bytes_downloaded = object.size;
                    t.bytes_total = object.size;
                });
                tracing::info!(
                    "Fetched {} ({} bytes) from provider {}",
                    entry.key,
                    object.size,
                    provider.id
                );

                Ok(Retrieved {
                    task_id,
                    provider_id: provider.id,
                    file_name: entry.name,
                    object,
                })
            }
            Err(e) => {
                tracing::warn!("Fetching {} from provider {} failed: {}", entry.key, provider.id, e);
                self.downloads.update(&task_id, |t| {
                    t.status = DownloadStatus::Failed;
                    t.error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    /// Fetches an entry without task tracking (used by archive building)
    pub async fn fetch_entry(
        &self,
        user_id: &str,
        entry: &CatalogEntry,
        preferred: Option<&str>,
    ) -> Result<DownloadedObject> {
        let provider = self.source(user_id, entry, preferred).await?;
        self.client
            .download(&provider, paths::object_key(&entry.key), |_, _| {})
            .await
    }

    /// Creates a share link on the provider chosen by the selection rule
    pub async fn share(&self, user_id: &str, dto: ShareFileDto) -> Result<ShareLinkDto> {
        let entry = self.entry(user_id, &dto.key).await?;
        if entry.is_directory {
            return Err(AppError::BadRequest("Cannot share a directory".to_string()));
        }
        let provider = self
            .source(user_id, &entry, dto.provider_id.as_deref())
            .await?;

        let request = CreateShareRequestDto {
            key: entry.key,
            expires_in: dto.expires_in,
            download_limit: dto.download_limit,
            password: dto.password,
        };
        self.client.create_share(&provider, &request).await
    }
}
