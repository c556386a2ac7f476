mod archive_service;
mod deletion_service;
mod replication_service;
mod retrieval_service;

pub use archive_service::ArchiveService;
pub use deletion_service::DeletionService;
pub use replication_service::{ReplicationService, SourceFile};
pub use retrieval_service::RetrievalService;
