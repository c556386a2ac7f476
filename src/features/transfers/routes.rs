use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::transfers::handlers;
use crate::features::transfers::models::{DownloadTask, TaskStore, UploadTask};
use crate::features::transfers::services::{
    ArchiveService, DeletionService, ReplicationService, RetrievalService,
};

/// Services behind the transfer routes
pub struct TransferServices {
    pub replication: Arc<ReplicationService>,
    pub retrieval: Arc<RetrievalService>,
    pub archive: Arc<ArchiveService>,
    pub deletion: Arc<DeletionService>,
    pub uploads: Arc<TaskStore<UploadTask>>,
    pub downloads: Arc<TaskStore<DownloadTask>>,
}

/// Transfer and task routes (require JWT authentication)
pub fn routes(services: &TransferServices, max_upload_size: usize) -> Router {
    let upload = Router::new()
        .route(
            "/transfers/upload",
            post(handlers::upload_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .with_state(Arc::clone(&services.replication));

    let retrieval = Router::new()
        .route("/transfers/download", get(handlers::download_file))
        .route("/files/share", post(handlers::share_file))
        .with_state(Arc::clone(&services.retrieval));

    let archive = Router::new()
        .route("/transfers/archive", post(handlers::download_archive))
        .with_state(Arc::clone(&services.archive));

    let deletion = Router::new()
        .route("/files", delete(handlers::delete_files))
        .with_state(Arc::clone(&services.deletion));

    let upload_tasks = Router::new()
        .route("/tasks/uploads", get(handlers::list_upload_tasks))
        .route("/tasks/uploads/clear", post(handlers::clear_upload_tasks))
        .route("/tasks/uploads/{id}", delete(handlers::remove_upload_task))
        .with_state(Arc::clone(&services.uploads));

    let download_tasks = Router::new()
        .route("/tasks/downloads", get(handlers::list_download_tasks))
        .route("/tasks/downloads/clear", post(handlers::clear_download_tasks))
        .route("/tasks/downloads/{id}", delete(handlers::remove_download_task))
        .with_state(Arc::clone(&services.downloads));

    upload
        .merge(retrieval)
        .merge(archive)
        .merge(deletion)
        .merge(upload_tasks)
        .merge(download_tasks)
}
