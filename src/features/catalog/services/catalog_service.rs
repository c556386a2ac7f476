use chrono::Utc;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::catalog::models::{CatalogEntry, FileRecord, UserCatalog};
use crate::features::users::services::UserService;
use crate::modules::storage::DocumentStore;
use crate::shared::paths;

fn catalog_key(user_id: &str) -> String {
    format!("catalogs/{}.json", user_id)
}

/// The per-user Metadata Catalog
pub struct CatalogService {
    docs: Arc<DocumentStore>,
    users: Arc<UserService>,
}

impl CatalogService {
    pub fn new(docs: Arc<DocumentStore>, users: Arc<UserService>) -> Self {
        Self { docs, users }
    }

    async fn load(&self, user_id: &str) -> Result<UserCatalog> {
        Ok(self
            .docs
            .read(&catalog_key(user_id))
            .await?
            .unwrap_or_default())
    }

    /// Runs `apply` on the user's catalog under its lock and persists it
    async fn modify<R>(
        &self,
        user_id: &str,
        apply: impl FnOnce(&mut UserCatalog) -> R,
    ) -> Result<R> {
        let _guard = self.docs.lock(&catalog_key(user_id)).await;
        self.modify_locked(user_id, apply).await
    }

    /// Caller must hold the catalog lock
    async fn modify_locked<R>(
        &self,
        user_id: &str,
        apply: impl FnOnce(&mut UserCatalog) -> R,
    ) -> Result<R> {
        let mut catalog = self.load(user_id).await?;
        let outcome = apply(&mut catalog);
        self.docs.write(&catalog_key(user_id), &catalog).await?;

        Ok(outcome)
    }

    pub async fn list(&self, user_id: &str, prefix: Option<&str>) -> Result<Vec<CatalogEntry>> {
        let prefix = prefix
            .map(paths::object_key)
            .filter(|p| !p.is_empty())
            .map(paths::public_key);

        let catalog = self.load(user_id).await?;
        Ok(catalog
            .entries
            .into_values()
            .filter(|e| prefix.as_deref().is_none_or(|p| e.key.starts_with(p)))
            .collect())
    }

    pub async fn get(&self, user_id: &str, key: &str) -> Result<Option<CatalogEntry>> {
        let mut catalog = self.load(user_id).await?;
        Ok(catalog.entries.remove(&paths::public_key(key)))
    }

    /// Records that `provider_id` now holds `record`, creating the entry on
    /// the first successful write. The provider must be registered.
    ///
    /// Registration is checked under the catalog lock, the same lock
    /// [`CatalogService::forget_provider`] takes after a deregistration.
    pub async fn append(
        &self,
        user_id: &str,
        record: FileRecord,
        provider_id: &str,
    ) -> Result<CatalogEntry> {
        let _guard = self.docs.lock(&catalog_key(user_id)).await;

        let user = self.users.get(user_id).await?;
        if !user.has_provider(provider_id) {
            return Err(AppError::NotFound("Provider not found".to_string()));
        }

        let key = paths::public_key(&record.key);
        self.modify_locked(user_id, |catalog| {
            let now = Utc::now();
            let entry = catalog
                .entries
                .entry(key.clone())
                .or_insert_with(|| CatalogEntry {
                    key,
                    name: record.name.clone(),
                    size: record.size,
                    is_directory: record.is_directory,
                    providers: Vec::new(),
                    created_at: now,
                    updated_at: now,
                });

            entry.name = record.name;
            entry.size = record.size;
            entry.is_directory = record.is_directory;
            entry.add_provider(provider_id);
            entry.updated_at = now;
            entry.clone()
        })
        .await
    }

    /// Drops `provider_id` from one entry. Entries may be left with no
    /// provider; they are removed only by [`CatalogService::remove`].
    pub async fn remove_provider(
        &self,
        user_id: &str,
        key: &str,
        provider_id: &str,
    ) -> Result<bool> {
        let key = paths::public_key(key);
        self.modify(user_id, |catalog| {
            catalog.entries.get_mut(&key).is_some_and(|entry| {
                let removed = entry.remove_provider(provider_id);
                if removed {
                    entry.updated_at = Utc::now();
                }
                removed
            })
        })
        .await
    }

    pub async fn remove(&self, user_id: &str, key: &str) -> Result<bool> {
        let key = paths::public_key(key);
        self.modify(user_id, |catalog| catalog.entries.remove(&key).is_some())
            .await
    }

    /// Forgets a deregistered provider across the whole catalog and drops
    /// entries no provider holds anymore. Returns the number dropped.
    pub async fn forget_provider(&self, user_id: &str, provider_id: &str) -> Result<usize> {
        self.modify(user_id, |catalog| {
            let mut dropped = 0;
            catalog.entries.retain(|_, entry| {
                if !entry.remove_provider(provider_id) {
                    return true;
                }
                let keep = !entry.providers.is_empty();
                if !keep {
                    dropped += 1;
                }
                keep
            });
            dropped
        })
        .await
    }
}
