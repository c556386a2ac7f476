mod report;
mod task;
mod task_store;

pub use report::{
    failure_summary, ArchiveReport, DeletionReport, KeyDeletion, ProviderFailure,
    ReplicationReport, SkippedFile,
};
pub use task::{DownloadStatus, DownloadTask, UploadStatus, UploadTask};
pub use task_store::TaskStore;
