use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::storage::dtos::{CreateShareRequestDto, ShareLinkDto};
use crate::features::storage::models::{ShareRecord, ShareState};
use crate::modules::storage::{DocumentStore, ObjectStore, StoredObject};
use crate::shared::constants::SHARE_RECORD_PREFIX;
use crate::shared::paths;

/// Object handed out by a successful share resolution
#[derive(Debug)]
pub struct SharedFile {
    pub file_name: String,
    pub object: StoredObject,
}

/// Issues and resolves time/usage/password bounded share links
pub struct ShareService {
    store: Arc<dyn ObjectStore>,
    records: DocumentStore,
    default_ttl: Duration,
    public_base_url: String,
}

impl ShareService {
    pub fn new(store: Arc<dyn ObjectStore>, default_ttl: Duration, public_base_url: String) -> Self {
        Self {
            records: DocumentStore::new(Arc::clone(&store)),
            store,
            default_ttl,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn record_key(share_id: &str) -> String {
        format!("{}{}.json", SHARE_RECORD_PREFIX, share_id)
    }

    pub async fn create(&self, dto: CreateShareRequestDto) -> Result<ShareLinkDto> {
        self.create_at(dto, Utc::now()).await
    }

    pub(crate) async fn create_at(
        &self,
        dto: CreateShareRequestDto,
        now: DateTime<Utc>,
    ) -> Result<ShareLinkDto> {
        let key = paths::object_key(&dto.key).to_string();
        if key.is_empty() {
            return Err(AppError::BadRequest("Key required".to_string()));
        }
        if self.store.head(&key).await?.is_none() {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        let ttl_secs = dto.expires_in.unwrap_or(self.default_ttl.as_secs());
        let ttl = ChronoDuration::try_seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX))
            .ok_or_else(|| AppError::Validation("expiresIn is too large".to_string()))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Validation("expiresIn is too large".to_string()))?;

        let share_id = Uuid::new_v4().to_string();
        let record = ShareRecord::new(
            key.clone(),
            expires_at,
            dto.download_limit,
            dto.password.as_deref(),
            now,
        );
        self.records
            .write(&Self::record_key(&share_id), &record)
            .await?;

        tracing::info!(
            "Created share {} for '{}' (expires {}, limit {:?}, protected {})",
            share_id,
            key,
            expires_at,
            record.download_limit,
            record.is_protected()
        );

        Ok(ShareLinkDto {
            share_url: format!("{}/s/{}", self.public_base_url, share_id),
            share_id,
            expires_at: expires_at.timestamp_millis(),
        })
    }

    pub async fn resolve(&self, share_id: &str, password: Option<&str>) -> Result<SharedFile> {
        self.resolve_at(share_id, password, Utc::now()).await
    }

    /// Checks expiry, then the download limit, then the password, and only
    /// then counts the download.
    pub(crate) async fn resolve_at(
        &self,
        share_id: &str,
        password: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<SharedFile> {
        if Uuid::parse_str(share_id).is_err() {
            return Err(AppError::NotFound("Share not found".to_string()));
        }

        let record_key = Self::record_key(share_id);
        if !self.records.exists(&record_key).await? {
            return Err(AppError::NotFound("Share not found".to_string()));
        }
        let _guard = self.records.lock(&record_key).await;

        let mut record: ShareRecord = self
            .records
            .read(&record_key)
            .await?
            .ok_or_else(|| AppError::NotFound("Share not found".to_string()))?;

        match record.state(now) {
            ShareState::Expired => {
                self.records.delete(&record_key).await?;
                tracing::info!("Share {} expired and was removed", share_id);
                return Err(AppError::ShareExpired("Share expired".to_string()));
            }
            ShareState::Exhausted => {
                return Err(AppError::ShareLimitReached(
                    "Download limit reached".to_string(),
                ))
            }
            ShareState::Active => {}
        }

        if !record.password_matches(password) {
            return Err(AppError::PasswordRequired("Password required".to_string()));
        }

        let object = self
            .store
            .get(&record.key)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        record.downloads += 1;
        self.records.write(&record_key, &record).await?;

        Ok(SharedFile {
            file_name: paths::base_name(&record.key).to_string(),
            object,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryObjectStore;
    use bytes::Bytes;

    async fn service_with_file() -> (Arc<ShareService>, Arc<MemoryObjectStore>) {
        let store = Arc::new(MemoryObjectStore::new());
        store
            .put("docs/report.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap();
        let service = ShareService::new(
            store.clone(),
            Duration::from_secs(7 * 24 * 3600),
            "http://files.test/".to_string(),
        );
        (Arc::new(service), store)
    }

    fn request(limit: Option<u32>, password: Option<&str>) -> CreateShareRequestDto {
        CreateShareRequestDto {
            key: "/docs/report.pdf".to_string(),
            expires_in: None,
            download_limit: limit,
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_uses_default_ttl() {
        let (service, _) = service_with_file().await;
        let now = Utc::now();
        let link = service.create_at(request(None, None), now).await.unwrap();

        assert_eq!(
            link.expires_at,
            (now + ChronoDuration::days(7)).timestamp_millis()
        );
        assert_eq!(
            link.share_url,
            format!("http://files.test/s/{}", link.share_id)
        );
    }

    #[tokio::test]
    async fn test_create_for_missing_file_fails() {
        let (service, _) = service_with_file().await;
        let mut dto = request(None, None);
        dto.key = "/missing.txt".to_string();
        assert!(matches!(
            service.create(dto).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_streams_and_counts() {
        let (service, _) = service_with_file().await;
        let link = service.create(request(None, None)).await.unwrap();

        let shared = service.resolve(&link.share_id, None).await.unwrap();
        assert_eq!(shared.file_name, "report.pdf");
        assert_eq!(shared.object.body, Bytes::from_static(b"%PDF"));
        assert_eq!(shared.object.meta.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_expired_share_is_deleted_then_not_found() {
        let (service, store) = service_with_file().await;
        let link = service.create(request(None, None)).await.unwrap();
        let later = Utc::now() + ChronoDuration::days(8);

        assert!(matches!(
            service.resolve_at(&link.share_id, None, later).await,
            Err(AppError::ShareExpired(_))
        ));
        assert!(!store.contains(&ShareService::record_key(&link.share_id)));
        assert!(matches!(
            service.resolve_at(&link.share_id, None, later).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_download_limit_is_never_exceeded() {
        let (service, _) = service_with_file().await;
        let link = service.create(request(Some(2), None)).await.unwrap();

        let attempts: Vec<_> = (0..6)
            .map(|_| {
                let service = Arc::clone(&service);
                let share_id = link.share_id.clone();
                tokio::spawn(async move { service.resolve(&share_id, None).await })
            })
            .collect();

        let mut served = 0;
        let mut exhausted = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => served += 1,
                Err(AppError::ShareLimitReached(_)) => exhausted += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(served, 2);
        assert_eq!(exhausted, 4);

        let record: ShareRecord = service
            .records
            .read(&ShareService::record_key(&link.share_id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.downloads, 2);
    }

    #[tokio::test]
    async fn test_password_is_enforced() {
        let (service, _) = service_with_file().await;
        let link = service
            .create(request(None, Some("open-sesame")))
            .await
            .unwrap();

        assert!(matches!(
            service.resolve(&link.share_id, None).await,
            Err(AppError::PasswordRequired(_))
        ));
        assert!(matches!(
            service.resolve(&link.share_id, Some("nope")).await,
            Err(AppError::PasswordRequired(_))
        ));
        assert!(service
            .resolve(&link.share_id, Some("open-sesame"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_malformed_share_id_is_not_found() {
        let (service, _) = service_with_file().await;
        assert!(matches!(
            service.resolve("../docs/report.pdf", None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_shares_leave_no_lock_entries() {
        let (service, _) = service_with_file().await;

        for _ in 0..200 {
            let share_id = Uuid::new_v4().to_string();
            assert!(matches!(
                service.resolve(&share_id, None).await,
                Err(AppError::NotFound(_))
            ));
        }
        assert_eq!(service.records.lock_entries(), 0);

        let link = service.create(request(None, None)).await.unwrap();
        service.resolve(&link.share_id, None).await.unwrap();
        assert_eq!(service.records.lock_entries(), 0);
    }
}
