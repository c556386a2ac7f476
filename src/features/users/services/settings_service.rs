use std::collections::HashSet;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::providers::models::ProviderConfig;
use crate::features::providers::services::{detach, ProviderService};
use crate::features::users::dtos::{
    ConfigResponseDto, SettingsPatchDto, UpdateConfigDto, UpdateConfigResponseDto,
};
use crate::features::users::models::UserAccount;
use crate::features::users::services::UserService;

/// Reads and writes the `{providers, settings}` config document
pub struct SettingsService {
    users: Arc<UserService>,
    providers: Arc<ProviderService>,
}

impl SettingsService {
    pub fn new(users: Arc<UserService>, providers: Arc<ProviderService>) -> Self {
        Self { users, providers }
    }

    pub async fn get(&self, user_id: &str) -> Result<ConfigResponseDto> {
        let user = self.users.get(user_id).await?;
        Ok(ConfigResponseDto {
            providers: user.providers,
            settings: user.settings,
        })
    }

    pub async fn update(
        &self,
        user_id: &str,
        dto: UpdateConfigDto,
    ) -> Result<UpdateConfigResponseDto> {
        let (removed, updated_at) = self
            .users
            .update(user_id, |user| {
                let removed = match dto.providers {
                    Some(providers) => replace_providers(user, providers)?,
                    None => Vec::new(),
                };
                if let Some(patch) = dto.settings {
                    merge_settings(user, patch)?;
                }
                Ok((removed, user.updated_at))
            })
            .await?;

        for provider_id in &removed {
            self.providers.forget(user_id, provider_id).await;
        }

        Ok(UpdateConfigResponseDto {
            success: true,
            updated_at,
        })
    }
}

/// Swaps in a new registry and returns the IDs that disappeared
fn replace_providers(
    user: &mut UserAccount,
    providers: Vec<ProviderConfig>,
) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    if let Some(duplicate) = providers.iter().find(|p| !seen.insert(p.id.as_str())) {
        return Err(AppError::Validation(format!(
            "Duplicate provider ID '{}'",
            duplicate.id
        )));
    }

    let removed: Vec<String> = user
        .providers
        .iter()
        .filter(|old| !providers.iter().any(|p| p.id == old.id))
        .map(|old| old.id.clone())
        .collect();

    for id in &removed {
        detach(user, id);
    }
    user.providers = providers;

    Ok(removed)
}

fn merge_settings(user: &mut UserAccount, patch: SettingsPatchDto) -> Result<()> {
    if let Some(targets) = patch.default_upload_targets {
        let mut deduped: Vec<String> = Vec::with_capacity(targets.len());
        for id in targets {
            if !user.has_provider(&id) {
                return Err(AppError::Validation(format!(
                    "Unknown provider '{}' in default upload targets",
                    id
                )));
            }
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        user.settings.default_upload_targets = deduped;
    }
    if let Some(theme) = patch.theme {
        user.settings.theme = theme;
    }
    if let Some(threshold) = patch.quota_alert_threshold {
        user.settings.quota_alert_threshold = threshold;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::models::FileRecord;
    use crate::features::catalog::CatalogService;
    use crate::features::providers::ProviderClient;
    use crate::features::users::models::Theme;
    use crate::modules::storage::{DocumentStore, MemoryObjectStore};
    use crate::shared::test_helpers::provider_config;
    use std::time::Duration;

    struct Fixture {
        catalog: Arc<CatalogService>,
        settings: SettingsService,
        user_id: String,
    }

    async fn fixture() -> Fixture {
        let docs = Arc::new(DocumentStore::new(Arc::new(MemoryObjectStore::new())));
        let users = Arc::new(UserService::new(Arc::clone(&docs)));
        let catalog = Arc::new(CatalogService::new(docs, Arc::clone(&users)));
        let client = Arc::new(ProviderClient::new(Duration::from_secs(5)).unwrap());
        let providers = Arc::new(ProviderService::new(
            Arc::clone(&users),
            Arc::clone(&catalog),
            client,
        ));
        let user = users
            .create("owner@example.com", None, "h".to_string())
            .await
            .unwrap();

        Fixture {
            catalog,
            settings: SettingsService::new(users, providers),
            user_id: user.user_id,
        }
    }

    #[tokio::test]
    async fn test_settings_merge_field_wise() {
        let f = fixture().await;
        f.settings
            .update(
                &f.user_id,
                UpdateConfigDto {
                    settings: Some(SettingsPatchDto {
                        theme: Some(Theme::Dark),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let config = f.settings.get(&f.user_id).await.unwrap();
        assert_eq!(config.settings.theme, Theme::Dark);
        assert_eq!(config.settings.quota_alert_threshold, 80);
    }

    #[tokio::test]
    async fn test_default_targets_must_be_registered() {
        let f = fixture().await;
        let err = f
            .settings
            .update(
                &f.user_id,
                UpdateConfigDto {
                    providers: Some(vec![provider_config("a", "http://localhost:1", "t")]),
                    settings: Some(SettingsPatchDto {
                        default_upload_targets: Some(vec!["a".to_string(), "b".to_string()]),
                        ..Default::default()
                    }),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let config = f.settings.get(&f.user_id).await.unwrap();
        assert!(config.providers.is_empty());
    }

    #[tokio::test]
    async fn test_replacing_providers_detaches_removed_ones() {
        let f = fixture().await;
        f.settings
            .update(
                &f.user_id,
                UpdateConfigDto {
                    providers: Some(vec![
                        provider_config("a", "http://localhost:1", "t"),
                        provider_config("b", "http://localhost:2", "t"),
                    ]),
                    settings: Some(SettingsPatchDto {
                        default_upload_targets: Some(vec!["a".to_string(), "b".to_string()]),
                        ..Default::default()
                    }),
                },
            )
            .await
            .unwrap();

        let record = FileRecord {
            key: "/a.txt".to_string(),
            name: "a.txt".to_string(),
            size: 1,
            is_directory: false,
        };
        f.catalog.append(&f.user_id, record, "a").await.unwrap();

        let response = f
            .settings
            .update(
                &f.user_id,
                UpdateConfigDto {
                    providers: Some(vec![provider_config("b", "http://localhost:2", "t")]),
                    settings: None,
                },
            )
            .await
            .unwrap();
        assert!(response.success);

        let config = f.settings.get(&f.user_id).await.unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.settings.default_upload_targets, vec!["b"]);
        assert!(f.catalog.list(&f.user_id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_provider_ids_rejected() {
        let f = fixture().await;
        let err = f
            .settings
            .update(
                &f.user_id,
                UpdateConfigDto {
                    providers: Some(vec![
                        provider_config("a", "http://localhost:1", "t"),
                        provider_config("a", "http://localhost:2", "t"),
                    ]),
                    settings: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
