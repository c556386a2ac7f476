use bytes::Bytes;
use futures::{future::join_all, stream, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::core::config::TransferConfig;
use crate::core::error::{AppError, Result};
use crate::features::catalog::models::FileRecord;
use crate::features::catalog::services::CatalogService;
use crate::features::providers::clients::ProviderClient;
use crate::features::providers::models::ProviderConfig;
use crate::features::providers::services::ProviderService;
use crate::features::transfers::models::{
    failure_summary, ProviderFailure, ReplicationReport, TaskStore, UploadStatus, UploadTask,
};
use crate::shared::paths;

/// A file handed to the coordinator, fully buffered
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Client-side name; may carry a relative folder (`photos/2024/a.jpg`)
    pub source_path: String,
    pub content_type: String,
    pub data: Bytes,
}

enum ProviderOutcome {
    Stored {
        provider_id: String,
        catalog_error: Option<String>,
    },
    Failed {
        provider_id: String,
        error: String,
        catalog_error: Option<String>,
    },
}

/// Replication Coordinator: fans each file out to its target providers,
/// settles every call, then reconciles the catalog and the upload task.
pub struct ReplicationService {
    catalog: Arc<CatalogService>,
    providers: Arc<ProviderService>,
    client: Arc<ProviderClient>,
    uploads: Arc<TaskStore<UploadTask>>,
    max_provider_concurrency: usize,
    file_parallelism: usize,
}

impl ReplicationService {
    pub fn new(
        catalog: Arc<CatalogService>,
        providers: Arc<ProviderService>,
        client: Arc<ProviderClient>,
        uploads: Arc<TaskStore<UploadTask>>,
        config: &TransferConfig,
    ) -> Self {
        Self {
            catalog,
            providers,
            client,
            uploads,
            max_provider_concurrency: config.max_provider_concurrency.max(1),
            file_parallelism: config.file_parallelism.max(1),
        }
    }

    /// Resolves the targets and replicates every file of one batch
    pub async fn upload(
        &self,
        user_id: &str,
        files: Vec<SourceFile>,
        provider_ids: &[String],
        base_path: &str,
    ) -> Result<Vec<ReplicationReport>> {
        if files.is_empty() {
            return Err(AppError::BadRequest("No file provided".to_string()));
        }
        let targets = self
            .providers
            .resolve_upload_targets(user_id, provider_ids)
            .await?;

        Ok(self
            .replicate_batch(user_id, files, &targets, base_path)
            .await)
    }

    /// Files run `file_parallelism` at a time, reports in input order
    pub async fn replicate_batch(
        &self,
        user_id: &str,
        files: Vec<SourceFile>,
        targets: &[ProviderConfig],
        base_path: &str,
    ) -> Vec<ReplicationReport> {
        stream::iter(files)
            .map(|file| self.replicate(user_id, file, targets, base_path))
            .buffered(self.file_parallelism)
            .collect()
            .await
    }

    pub async fn replicate(
        &self,
        user_id: &str,
        file: SourceFile,
        targets: &[ProviderConfig],
        base_path: &str,
    ) -> ReplicationReport {
        let (folder, file_name) = paths::split_relative(&file.source_path);
        let destination = paths::join(base_path, &folder);
        let key = paths::public_key(&paths::join(&destination, &file_name));
        let size = file.data.len() as u64;

        let task = UploadTask::new(
            user_id,
            &file.source_path,
            &paths::public_key(&destination),
            targets.iter().map(|p| p.id.clone()).collect(),
        );
        let task_id = task.id.clone();
        self.uploads.insert(task);
        self.uploads
            .update(&task_id, |t| t.status = UploadStatus::Uploading);

        tracing::info!(
            "Replicating {} ({} bytes) to {} providers",
            key,
            size,
            targets.len()
        );

        let limit = Arc::new(Semaphore::new(self.max_provider_concurrency));
        let calls = targets.iter().map(|provider| {
            self.upload_to(
                user_id,
                provider,
                &file,
                &destination,
                &file_name,
                &key,
                &task_id,
                Arc::clone(&limit),
            )
        });
        let outcomes = join_all(calls).await;

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut catalog_sync_failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                ProviderOutcome::Stored {
                    provider_id,
                    catalog_error,
                } => {
                    if let Some(e) = catalog_error {
                        catalog_sync_failures.push(ProviderFailure::new(&provider_id, e));
                    }
                    succeeded.push(provider_id);
                }
                ProviderOutcome::Failed {
                    provider_id,
                    error,
                    catalog_error,
                } => {
                    if let Some(e) = catalog_error {
                        catalog_sync_failures.push(ProviderFailure::new(&provider_id, e));
                    }
                    failed.push(ProviderFailure::new(&provider_id, error));
                }
            }
        }

        let (status, error) = if failed.is_empty() {
            (UploadStatus::Complete, None)
        } else {
            (UploadStatus::Failed, Some(failure_summary(&failed)))
        };

        self.uploads.update(&task_id, |t| {
            t.status = status;
            t.error = error.clone();
        });

        if failed.is_empty() {
            tracing::info!("Replicated {} to all {} providers", key, succeeded.len());
        } else {
            tracing::warn!(
                "Replication of {} failed on {} of {} providers",
                key,
                failed.len(),
                targets.len()
            );
        }

        ReplicationReport {
            task_id,
            key,
            size,
            status,
            succeeded,
            failed,
            catalog_sync_failures,
            error,
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn upload_to(
        &self,
        user_id: &str,
        provider: &ProviderConfig,
        file: &SourceFile,
        destination: &str,
        file_name: &str,
        key: &str,
        task_id: &str,
        limit: Arc<Semaphore>,
    ) -> ProviderOutcome {
        let provider_id = provider.id.clone();

        let _permit = match limit.acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                return ProviderOutcome::Failed {
                    provider_id,
                    error: format!("Upload slot unavailable: {}", e),
                    catalog_error: None,
                }
            }
        };

        let uploads = Arc::clone(&self.uploads);
        let (progress_task, progress_provider) = (task_id.to_string(), provider_id.clone());
        let on_progress = move |percent: u8| {
            uploads.update(&progress_task, |t| {
                t.progress.insert(progress_provider.clone(), percent);
            });
        };

        let uploaded = self
            .client
            .upload(
                provider,
                destination,
                file_name,
                file.data.clone(),
                &file.content_type,
                on_progress,
            )
            .await;

        match uploaded {
            Ok(receipt) => {
                tracing::info!("Provider {} stored {}", provider_id, receipt.key);
                let record = FileRecord {
                    key: receipt.key,
                    name: file_name.to_string(),
                    size: receipt.size,
                    is_directory: false,
                };
                let catalog_error = self
                    .catalog
                    .append(user_id, record, &provider_id)
                    .await
                    .err()
                    .map(|e| {
                        tracing::warn!(
                            "Catalog sync failed for {} on provider {}: {}",
                            key,
                            provider_id,
                            e
                        );
                        e.to_string()
                    });

                ProviderOutcome::Stored {
                    provider_id,
                    catalog_error,
                }
            }
            Err(e) => {
                tracing::warn!("Provider {} failed to store {}: {}", provider_id, key, e);
                // A copy from an earlier write no longer matches this key
                let catalog_error = self
                    .catalog
                    .remove_provider(user_id, key, &provider_id)
                    .await
                    .err()
                    .map(|e| {
                        tracing::warn!(
                            "Failed to drop stale catalog copy of {} on {}: {}",
                            key,
                            provider_id,
                            e
                        );
                        e.to_string()
                    });

                ProviderOutcome::Failed {
                    provider_id,
                    error: e.to_string(),
                    catalog_error,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::providers::dtos::UpdateProviderDto;
    use crate::features::storage::dtos::UploadResponseDto;
    use crate::modules::storage::MemoryObjectStore;
    use crate::shared::test_helpers::{
        spawn_gateway, spawn_gateway_with, spawn_provider, spawn_router, TestGateway,
        TestProvider,
    };
    use axum::{extract::State, routing::post, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn source(path: &str, body: &'static [u8]) -> SourceFile {
        SourceFile {
            source_path: path.to_string(),
            content_type: "text/plain".to_string(),
            data: Bytes::from_static(body),
        }
    }

    fn sorted(mut ids: Vec<String>) -> Vec<String> {
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_partial_failure_catalogs_only_successful_providers() {
        let gateway = spawn_gateway().await;
        let user = gateway.register().await.user.user_id;
        let (a, b, c) = (
            spawn_provider("token-a").await,
            spawn_provider("token-b").await,
            spawn_provider("token-c").await,
        );
        let pa = gateway.add_provider(&user, "A", &a, "token-a").await;
        let pb = gateway.add_provider(&user, "B", &b, "wrong").await;
        let pc = gateway.add_provider(&user, "C", &c, "token-c").await;

        let service = &gateway.services.transfers.replication;
        let reports = service
            .upload(
                &user,
                vec![source("one.txt", b"one"), source("docs/two.txt", b"two")],
                &[pa.id.clone(), pb.id.clone(), pc.id.clone()],
                "/",
            )
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].key, "/one.txt");
        assert_eq!(reports[1].key, "/docs/two.txt");

        let expected = sorted(vec![pa.id.clone(), pc.id.clone()]);
        for report in &reports {
            assert_eq!(report.status, UploadStatus::Failed);
            assert_eq!(sorted(report.succeeded.clone()), expected);
            assert_eq!(report.failed.len(), 1);
            assert_eq!(report.failed[0].provider_id, pb.id);
            assert!(report.error.as_deref().unwrap().contains(&pb.id));

            let entry = gateway
                .services
                .catalog
                .get(&user, &report.key)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(sorted(entry.providers), expected);
        }

        assert!(a.store.contains("docs/two.txt"));
        assert!(c.store.contains("one.txt"));
        assert_eq!(b.store.len(), 0);

        let tasks = gateway.services.transfers.uploads.list(&user);
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.status == UploadStatus::Failed));
        assert!(tasks.iter().all(|t| t.progress[&pa.id] == 100));
    }

    #[tokio::test]
    async fn test_full_success_is_complete_and_clearable() {
        let gateway = spawn_gateway().await;
        let user = gateway.register().await.user.user_id;
        let a = spawn_provider("token-a").await;
        let pa = gateway.add_provider(&user, "A", &a, "token-a").await;

        let reports = gateway
            .services
            .transfers
            .replication
            .upload(&user, vec![source("a.txt", b"alpha")], &[pa.id.clone()], "/notes")
            .await
            .unwrap();

        assert_eq!(reports[0].status, UploadStatus::Complete);
        assert_eq!(reports[0].key, "/notes/a.txt");
        assert_eq!(reports[0].size, 5);
        assert!(a.store.contains("notes/a.txt"));

        let uploads = &gateway.services.transfers.uploads;
        assert_eq!(uploads.clear_completed(&user), 1);
        assert!(uploads.list(&user).is_empty());
    }

    #[tokio::test]
    async fn test_requires_files_and_targets() {
        let gateway = spawn_gateway().await;
        let user = gateway.register().await.user.user_id;
        let service = &gateway.services.transfers.replication;

        let err = service.upload(&user, Vec::new(), &[], "/").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = service
            .upload(&user, vec![source("a.txt", b"a")], &[], "/")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service
            .upload(&user, vec![source("a.txt", b"a")], &["missing".to_string()], "/")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failed_rewrite_drops_stale_copy() {
        let gateway = spawn_gateway().await;
        let user = gateway.register().await.user.user_id;
        let (a, b) = (
            spawn_provider("token-a").await,
            spawn_provider("token-b").await,
        );
        let pa = gateway.add_provider(&user, "A", &a, "token-a").await;
        let pb = gateway.add_provider(&user, "B", &b, "token-b").await;
        let targets = [pa.id.clone(), pb.id.clone()];
        let service = &gateway.services.transfers.replication;

        service
            .upload(&user, vec![source("a.txt", b"v1")], &targets, "/")
            .await
            .unwrap();

        gateway
            .services
            .providers
            .update(
                &user,
                &pb.id,
                UpdateProviderDto {
                    auth_token: Some("rotated".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reports = service
            .upload(&user, vec![source("a.txt", b"v2")], &targets, "/")
            .await
            .unwrap();
        assert_eq!(reports[0].succeeded, vec![pa.id.clone()]);

        let entry = gateway
            .services
            .catalog
            .get(&user, "/a.txt")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.providers, vec![pa.id.clone()]);
    }

    /// Upload endpoint that holds every call briefly and records the peak
    /// number of calls in flight
    #[derive(Default)]
    struct InFlight {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    async fn slow_upload(
        State(gauge): State<Arc<InFlight>>,
        body: Bytes,
    ) -> Json<UploadResponseDto> {
        let now = gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
        gauge.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        gauge.current.fetch_sub(1, Ordering::SeqCst);

        Json(UploadResponseDto {
            success: true,
            key: format!("/{}", uuid::Uuid::new_v4()),
            size: body.len() as u64,
            etag: "etag".to_string(),
        })
    }

    async fn slow_backend() -> (TestProvider, Arc<InFlight>) {
        let gauge = Arc::new(InFlight::default());
        let router = Router::new()
            .route("/api/upload", post(slow_upload))
            .with_state(Arc::clone(&gauge));
        let backend = TestProvider {
            base_url: spawn_router(router).await,
            store: Arc::new(MemoryObjectStore::new()),
        };
        (backend, gauge)
    }

    async fn gateway_with(concurrency: usize, parallelism: usize) -> TestGateway {
        spawn_gateway_with(&TransferConfig {
            max_provider_concurrency: concurrency,
            file_parallelism: parallelism,
            ..TransferConfig::default()
        })
        .await
    }

    #[tokio::test]
    async fn test_fan_out_respects_provider_concurrency() {
        let gateway = gateway_with(2, 1).await;
        let user = gateway.register().await.user.user_id;
        let (backend, gauge) = slow_backend().await;

        let mut targets = Vec::new();
        for name in ["A", "B", "C", "D", "E"] {
            targets.push(gateway.add_provider(&user, name, &backend, "t").await.id);
        }

        let reports = gateway
            .services
            .transfers
            .replication
            .upload(&user, vec![source("a.txt", b"alpha")], &targets, "/")
            .await
            .unwrap();

        assert_eq!(reports[0].status, UploadStatus::Complete);
        assert_eq!(reports[0].succeeded.len(), 5);
        assert_eq!(gauge.peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_parallel_files_keep_input_order() {
        let gateway = gateway_with(1, 3).await;
        let user = gateway.register().await.user.user_id;
        let (backend, gauge) = slow_backend().await;
        let target = gateway.add_provider(&user, "A", &backend, "t").await.id;

        let files = vec![
            source("1.txt", b"1"),
            source("2.txt", b"22"),
            source("3.txt", b"333"),
            source("4.txt", b"4444"),
        ];
        let reports = gateway
            .services
            .transfers
            .replication
            .upload(&user, files, &[target], "/")
            .await
            .unwrap();

        let keys: Vec<_> = reports.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["/1.txt", "/2.txt", "/3.txt", "/4.txt"]);
        assert!(reports.iter().all(|r| r.status == UploadStatus::Complete));

        let peak = gauge.peak.load(Ordering::SeqCst);
        assert!((2..=3).contains(&peak), "peak in flight was {}", peak);
    }
}
