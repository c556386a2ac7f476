use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::catalog::services::CatalogService;
use crate::features::providers::clients::ProviderClient;
use crate::features::providers::dtos::{
    ConnectionTestResponseDto, CreateProviderDto, UpdateProviderDto,
};
use crate::features::providers::models::ProviderConfig;
use crate::features::storage::dtos::{FileEntryDto, StorageStatsDto};
use crate::features::users::models::UserAccount;
use crate::features::users::services::UserService;

fn not_found() -> AppError {
    AppError::NotFound("Provider not found".to_string())
}

/// The Provider Registry: each user's configured backends
pub struct ProviderService {
    users: Arc<UserService>,
    catalog: Arc<CatalogService>,
    client: Arc<ProviderClient>,
}

impl ProviderService {
    pub fn new(
        users: Arc<UserService>,
        catalog: Arc<CatalogService>,
        client: Arc<ProviderClient>,
    ) -> Self {
        Self {
            users,
            catalog,
            client,
        }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<ProviderConfig>> {
        Ok(self.users.get(user_id).await?.providers)
    }

    pub async fn get(&self, user_id: &str, provider_id: &str) -> Result<ProviderConfig> {
        self.users
            .get(user_id)
            .await?
            .provider(provider_id)
            .cloned()
            .ok_or_else(not_found)
    }

    pub async fn add(&self, user_id: &str, dto: CreateProviderDto) -> Result<ProviderConfig> {
        let provider = ProviderConfig {
            id: Uuid::new_v4().to_string(),
            name: dto.name,
            endpoint: dto.worker_url,
            credential: dto.auth_token,
            is_active: true,
            added_at: Utc::now(),
        };

        let stored = provider.clone();
        self.users
            .update(user_id, move |user| {
                user.providers.push(stored);
                Ok(())
            })
            .await?;

        tracing::info!("User {} registered provider {}", user_id, provider.id);
        Ok(provider)
    }

    pub async fn update(
        &self,
        user_id: &str,
        provider_id: &str,
        dto: UpdateProviderDto,
    ) -> Result<ProviderConfig> {
        self.users
            .update(user_id, |user| {
                let provider = user
                    .providers
                    .iter_mut()
                    .find(|p| p.id == provider_id)
                    .ok_or_else(not_found)?;

                if let Some(name) = dto.name {
                    provider.name = name;
                }
                if let Some(url) = dto.worker_url {
                    provider.endpoint = url;
                }
                if let Some(token) = dto.auth_token {
                    provider.credential = token;
                }
                if let Some(active) = dto.is_active {
                    provider.is_active = active;
                }
                Ok(provider.clone())
            })
            .await
    }

    pub async fn remove(&self, user_id: &str, provider_id: &str) -> Result<()> {
        self.users
            .update(user_id, |user| {
                if !user.has_provider(provider_id) {
                    return Err(not_found());
                }
                detach(user, provider_id);
                Ok(())
            })
            .await?;

        tracing::info!("User {} removed provider {}", user_id, provider_id);
        self.forget(user_id, provider_id).await;
        Ok(())
    }

    /// Drops a deregistered provider from the user's catalog. Failures are
    /// logged; the registry change has already been committed.
    pub async fn forget(&self, user_id: &str, provider_id: &str) {
        match self.catalog.forget_provider(user_id, provider_id).await {
            Ok(dropped) if dropped > 0 => tracing::info!(
                "Dropped {} catalog entries held only by provider {}",
                dropped,
                provider_id
            ),
            Ok(_) => {}
            Err(e) => tracing::warn!(
                "Failed to remove provider {} from catalog of user {}: {}",
                provider_id,
                user_id,
                e
            ),
        }
    }

    /// Resolves upload targets, falling back to the user's default targets
    /// when none are named. Every target must be registered and active.
    pub async fn resolve_upload_targets(
        &self,
        user_id: &str,
        provider_ids: &[String],
    ) -> Result<Vec<ProviderConfig>> {
        let user = self.users.get(user_id).await?;

        let requested: &[String] = if provider_ids.is_empty() {
            &user.settings.default_upload_targets
        } else {
            provider_ids
        };

        let mut targets: Vec<ProviderConfig> = Vec::new();
        for id in requested {
            if targets.iter().any(|t| &t.id == id) {
                continue;
            }
            let provider = user.provider(id).ok_or_else(not_found)?;
            if !provider.is_active {
                return Err(AppError::Validation(format!(
                    "Provider '{}' is inactive",
                    provider.name
                )));
            }
            targets.push(provider.clone());
        }

        if targets.is_empty() {
            return Err(AppError::Validation(
                "No target providers selected".to_string(),
            ));
        }

        Ok(targets)
    }

    pub async fn test_connection(
        &self,
        user_id: &str,
        provider_id: &str,
    ) -> Result<ConnectionTestResponseDto> {
        let provider = self.get(user_id, provider_id).await?;

        Ok(match self.client.stats(&provider).await {
            Ok(_) => ConnectionTestResponseDto {
                success: true,
                message: "Connection successful".to_string(),
            },
            Err(e) => ConnectionTestResponseDto {
                success: false,
                message: e.to_string(),
            },
        })
    }

    pub async fn stats(&self, user_id: &str, provider_id: &str) -> Result<StorageStatsDto> {
        let provider = self.get(user_id, provider_id).await?;
        self.client.stats(&provider).await
    }

    pub async fn browse(
        &self,
        user_id: &str,
        provider_id: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<FileEntryDto>> {
        let provider = self.get(user_id, provider_id).await?;
        self.client.list_files(&provider, prefix).await
    }
}

/// Removes a provider from the registry and from the default targets
pub(crate) fn detach(user: &mut UserAccount, provider_id: &str) {
    user.providers.retain(|p| p.id != provider_id);
    user.settings
        .default_upload_targets
        .retain(|id| id != provider_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::models::FileRecord;
    use crate::modules::storage::{DocumentStore, MemoryObjectStore};
    use crate::shared::test_helpers::spawn_provider;
    use std::time::Duration;

    struct Fixture {
        users: Arc<UserService>,
        catalog: Arc<CatalogService>,
        providers: ProviderService,
        user_id: String,
    }

    async fn fixture() -> Fixture {
        let docs = Arc::new(DocumentStore::new(Arc::new(MemoryObjectStore::new())));
        let users = Arc::new(UserService::new(Arc::clone(&docs)));
        let catalog = Arc::new(CatalogService::new(docs, Arc::clone(&users)));
        let client = Arc::new(ProviderClient::new(Duration::from_secs(5)).unwrap());
        let user = users
            .create("owner@example.com", None, "h".to_string())
            .await
            .unwrap();

        Fixture {
            providers: ProviderService::new(Arc::clone(&users), Arc::clone(&catalog), client),
            users,
            catalog,
            user_id: user.user_id,
        }
    }

    fn create_dto(name: &str, url: &str, token: &str) -> CreateProviderDto {
        CreateProviderDto {
            name: name.to_string(),
            worker_url: url.to_string(),
            auth_token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_update_and_get() {
        let f = fixture().await;
        let added = f
            .providers
            .add(&f.user_id, create_dto("Primary", "http://localhost:9000", "t"))
            .await
            .unwrap();
        assert!(added.is_active);
        assert!(Uuid::parse_str(&added.id).is_ok());

        let updated = f
            .providers
            .update(
                &f.user_id,
                &added.id,
                UpdateProviderDto {
                    name: Some("Renamed".to_string()),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert!(!updated.is_active);
        assert_eq!(updated.endpoint, "http://localhost:9000");

        let fetched = f.providers.get(&f.user_id, &added.id).await.unwrap();
        assert_eq!(fetched, updated);

        let err = f
            .providers
            .update(&f.user_id, "missing", UpdateProviderDto::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_detaches_everywhere() {
        let f = fixture().await;
        let a = f
            .providers
            .add(&f.user_id, create_dto("A", "http://localhost:1", "t"))
            .await
            .unwrap();
        let b = f
            .providers
            .add(&f.user_id, create_dto("B", "http://localhost:2", "t"))
            .await
            .unwrap();

        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        f.users
            .update(&f.user_id, move |u| {
                u.settings.default_upload_targets = vec![a_id, b_id];
                Ok(())
            })
            .await
            .unwrap();

        let record = |key: &str| FileRecord {
            key: key.to_string(),
            name: key.to_string(),
            size: 1,
            is_directory: false,
        };
        f.catalog.append(&f.user_id, record("solo"), &a.id).await.unwrap();
        f.catalog.append(&f.user_id, record("shared"), &a.id).await.unwrap();
        f.catalog.append(&f.user_id, record("shared"), &b.id).await.unwrap();

        f.providers.remove(&f.user_id, &a.id).await.unwrap();

        let user = f.users.get(&f.user_id).await.unwrap();
        assert!(!user.has_provider(&a.id));
        assert_eq!(user.settings.default_upload_targets, vec![b.id.clone()]);

        let entries = f.catalog.list(&f.user_id, None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].providers, vec![b.id]);

        let err = f.providers.remove(&f.user_id, &a.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_upload_targets() {
        let f = fixture().await;
        let a = f
            .providers
            .add(&f.user_id, create_dto("A", "http://localhost:1", "t"))
            .await
            .unwrap();
        let b = f
            .providers
            .add(&f.user_id, create_dto("B", "http://localhost:2", "t"))
            .await
            .unwrap();

        let err = f
            .providers
            .resolve_upload_targets(&f.user_id, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let b_id = b.id.clone();
        f.users
            .update(&f.user_id, move |u| {
                u.settings.default_upload_targets = vec![b_id];
                Ok(())
            })
            .await
            .unwrap();
        let defaults = f
            .providers
            .resolve_upload_targets(&f.user_id, &[])
            .await
            .unwrap();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, b.id);

        let explicit = f
            .providers
            .resolve_upload_targets(&f.user_id, &[a.id.clone(), b.id.clone(), a.id.clone()])
            .await
            .unwrap();
        let ids: Vec<_> = explicit.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![a.id.clone(), b.id.clone()]);

        let err = f
            .providers
            .resolve_upload_targets(&f.user_id, &["ghost".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        f.providers
            .update(
                &f.user_id,
                &a.id,
                UpdateProviderDto {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let err = f
            .providers
            .resolve_upload_targets(&f.user_id, &[a.id])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_connection_check() {
        let f = fixture().await;
        let backend = spawn_provider("secret").await;

        let good = f
            .providers
            .add(&f.user_id, create_dto("Good", &backend.base_url, "secret"))
            .await
            .unwrap();
        let bad = f
            .providers
            .add(&f.user_id, create_dto("Bad", &backend.base_url, "wrong"))
            .await
            .unwrap();

        let ok = f.providers.test_connection(&f.user_id, &good.id).await.unwrap();
        assert!(ok.success);
        assert_eq!(ok.message, "Connection successful");

        let failed = f.providers.test_connection(&f.user_id, &bad.id).await.unwrap();
        assert!(!failed.success);
        assert!(failed.message.contains("401"));

        let stats = f.providers.stats(&f.user_id, &good.id).await.unwrap();
        assert_eq!(stats.file_count, 0);
    }
}
