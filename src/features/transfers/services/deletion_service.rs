use futures::future::join_all;
use std::sync::Arc;

use crate::features::catalog::services::CatalogService;
use crate::features::providers::clients::ProviderClient;
use crate::features::providers::services::ProviderService;
use crate::features::transfers::models::{DeletionReport, KeyDeletion, ProviderFailure};
use crate::shared::paths;

/// Deletion Coordinator: best-effort delete on every holder, then the
/// catalog entry goes regardless of per-provider outcome.
pub struct DeletionService {
    catalog: Arc<CatalogService>,
    providers: Arc<ProviderService>,
    client: Arc<ProviderClient>,
}

impl DeletionService {
    pub fn new(
        catalog: Arc<CatalogService>,
        providers: Arc<ProviderService>,
        client: Arc<ProviderClient>,
    ) -> Self {
        Self {
            catalog,
            providers,
            client,
        }
    }

    /// Every key gets a result; no per-key failure stops the batch
    pub async fn delete(&self, user_id: &str, keys: &[String]) -> DeletionReport {
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            results.push(self.delete_one(user_id, key).await);
        }
        DeletionReport { results }
    }

    async fn delete_one(&self, user_id: &str, key: &str) -> KeyDeletion {
        let mut outcome = KeyDeletion {
            key: paths::public_key(key),
            deleted_from: Vec::new(),
            failures: Vec::new(),
            catalog_removed: false,
            catalog_error: None,
        };

        let entry = match self.catalog.get(user_id, key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                tracing::debug!("Delete of {} skipped, not in catalog", key);
                return outcome;
            }
            Err(e) => {
                tracing::warn!("Catalog lookup for {} failed: {}", outcome.key, e);
                outcome.catalog_error = Some(e.to_string());
                return outcome;
            }
        };

        let object_key = paths::object_key(&entry.key);
        let attempts = entry.providers.iter().map(|provider_id| async move {
            let provider = self.providers.get(user_id, provider_id).await?;
            self.client.delete(&provider, object_key).await
        });
        let outcomes = join_all(attempts).await;

        for (provider_id, result) in entry.providers.iter().zip(outcomes) {
            match result {
                Ok(()) => {
                    if let Err(e) = self
                        .catalog
                        .remove_provider(user_id, &entry.key, provider_id)
                        .await
                    {
                        tracing::warn!(
                            "Failed to drop {} from catalog entry {}: {}",
                            provider_id,
                            entry.key,
                            e
                        );
                    }
                    outcome.deleted_from.push(provider_id.clone());
                }
                Err(e) => {
                    tracing::warn!(
                        "Provider {} failed to delete {}: {}",
                        provider_id,
                        entry.key,
                        e
                    );
                    outcome.failures.push(ProviderFailure::new(provider_id, e));
                }
            }
        }

        match self.catalog.remove(user_id, &entry.key).await {
            Ok(removed) => outcome.catalog_removed = removed,
            Err(e) => {
                tracing::warn!("Failed to remove {} from catalog: {}", entry.key, e);
                outcome.catalog_error = Some(e.to_string());
            }
        }
        if outcome.catalog_removed && !outcome.failures.is_empty() {
            tracing::warn!(
                "Removed {} from catalog with copies possibly left on {} providers",
                entry.key,
                outcome.failures.len()
            );
        }

        outcome.key = entry.key;
        outcome
    }
}
