use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::storage::dtos::{FileEntryDto, StorageStatsDto, UploadResponseDto};
use crate::modules::storage::{ObjectStore, StoredObject};
use crate::shared::constants::SHARE_RECORD_PREFIX;
use crate::shared::paths;

/// The provider side of the file contract: one bucket, one credential
pub struct StorageService {
    store: Arc<dyn ObjectStore>,
    quota_bytes: u64,
}

impl StorageService {
    pub fn new(store: Arc<dyn ObjectStore>, quota_bytes: u64) -> Self {
        Self { store, quota_bytes }
    }

    /// One level of entries below `prefix`; sub-prefixes become directories
    pub async fn list(&self, prefix: Option<&str>) -> Result<Vec<FileEntryDto>> {
        let prefix = paths::object_key(prefix.unwrap_or(""));
        let listing = self.store.list(prefix, Some("/")).await?;

        let mut files: Vec<FileEntryDto> = listing
            .objects
            .into_iter()
            .filter(|o| !o.key.starts_with(SHARE_RECORD_PREFIX))
            .map(|o| FileEntryDto {
                name: paths::base_name(&o.key).to_string(),
                key: paths::public_key(&o.key),
                size: o.size,
                last_modified: o.last_modified.timestamp_millis(),
                is_directory: false,
            })
            .collect();

        let now = Utc::now().timestamp_millis();
        files.extend(
            listing
                .common_prefixes
                .into_iter()
                .filter(|p| !p.starts_with(SHARE_RECORD_PREFIX))
                .map(|p| FileEntryDto {
                    name: paths::base_name(&p).to_string(),
                    key: paths::public_key(&p),
                    size: 0,
                    last_modified: now,
                    is_directory: true,
                }),
        );

        Ok(files)
    }

    /// Stores the file at `path/file_name`
    pub async fn upload(
        &self,
        path: &str,
        file_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<UploadResponseDto> {
        let key = paths::join(path, file_name);
        if key.is_empty() || paths::base_name(&key).is_empty() {
            return Err(AppError::BadRequest("No file provided".to_string()));
        }
        if key.starts_with(SHARE_RECORD_PREFIX) || key.split('/').any(|s| s == "..") {
            return Err(AppError::BadRequest(format!("Invalid key: {}", key)));
        }

        let meta = self.store.put(&key, data, content_type).await?;
        tracing::debug!("Stored '{}' ({} bytes)", key, meta.size);

        Ok(UploadResponseDto {
            success: true,
            key: paths::public_key(&key),
            size: meta.size,
            etag: meta.etag,
        })
    }

    pub async fn download(&self, key: &str) -> Result<StoredObject> {
        let key = paths::object_key(key);
        if key.starts_with(SHARE_RECORD_PREFIX) {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        self.store
            .get(key)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let key = paths::object_key(key);
        if key.is_empty() || key.starts_with(SHARE_RECORD_PREFIX) {
            return Err(AppError::BadRequest("Key required".to_string()));
        }
        self.store.delete(key).await
    }

    pub async fn stats(&self) -> Result<StorageStatsDto> {
        let listing = self.store.list("", None).await?;
        let (used, file_count) = listing
            .objects
            .iter()
            .filter(|o| !o.key.starts_with(SHARE_RECORD_PREFIX))
            .fold((0u64, 0u64), |(used, count), o| (used + o.size, count + 1));

        Ok(StorageStatsDto {
            used,
            limit: self.quota_bytes,
            file_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryObjectStore;

    fn service() -> (StorageService, Arc<MemoryObjectStore>) {
        let store = Arc::new(MemoryObjectStore::new());
        (StorageService::new(store.clone(), 1024), store)
    }

    #[tokio::test]
    async fn test_upload_key_has_no_double_slashes() {
        let (service, store) = service();

        let root = service
            .upload("/", "a.txt", Bytes::from_static(b"hi"), "text/plain")
            .await
            .unwrap();
        assert_eq!(root.key, "/a.txt");
        assert_eq!(root.size, 2);

        let nested = service
            .upload("/docs/", "b.txt", Bytes::from_static(b"hey"), "text/plain")
            .await
            .unwrap();
        assert_eq!(nested.key, "/docs/b.txt");
        assert!(store.contains("docs/b.txt"));
    }

    #[tokio::test]
    async fn test_list_marks_directories_and_hides_shares() {
        let (service, store) = service();
        service
            .upload("", "a.txt", Bytes::from_static(b"1"), "text/plain")
            .await
            .unwrap();
        service
            .upload("docs", "b.txt", Bytes::from_static(b"22"), "text/plain")
            .await
            .unwrap();
        store
            .put("_shares/x.json", Bytes::from_static(b"{}"), "application/json")
            .await
            .unwrap();

        let files = service.list(None).await.unwrap();
        assert_eq!(files.len(), 2);

        let file = files.iter().find(|f| f.key == "/a.txt").unwrap();
        assert!(!file.is_directory);
        assert_eq!(file.name, "a.txt");

        let dir = files.iter().find(|f| f.is_directory).unwrap();
        assert_eq!(dir.key, "/docs/");
        assert_eq!(dir.name, "docs");
        assert_eq!(dir.size, 0);

        let inside = service.list(Some("/docs/")).await.unwrap();
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].key, "/docs/b.txt");
    }

    #[tokio::test]
    async fn test_stats_exclude_share_records() {
        let (service, store) = service();
        service
            .upload("", "a.txt", Bytes::from_static(b"abc"), "text/plain")
            .await
            .unwrap();
        store
            .put("_shares/x.json", Bytes::from_static(b"{}"), "application/json")
            .await
            .unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.used, 3);
        assert_eq!(stats.file_count, 1);
        assert_eq!(stats.limit, 1024);
    }

    #[tokio::test]
    async fn test_download_missing_and_delete() {
        let (service, _) = service();
        assert!(matches!(
            service.download("/nope.txt").await,
            Err(AppError::NotFound(_))
        ));

        service
            .upload("", "a.txt", Bytes::from_static(b"abc"), "text/plain")
            .await
            .unwrap();
        assert_eq!(
            service.download("a.txt").await.unwrap().body,
            Bytes::from_static(b"abc")
        );

        service.delete("/a.txt").await.unwrap();
        assert!(service.download("/a.txt").await.is_err());
    }
}
