use serde::Serialize;
use utoipa::ToSchema;

use super::task::UploadStatus;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFailure {
    pub provider_id: String,
    pub error: String,
}

impl ProviderFailure {
    pub fn new(provider_id: &str, error: impl ToString) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            error: error.to_string(),
        }
    }
}

/// Joins failures as `"<providerId>: <message>"` separated by `", "`
pub fn failure_summary(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.provider_id, f.error))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Settled outcome of one file's fan-out
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationReport {
    pub task_id: String,
    pub key: String,
    pub size: u64,
    pub status: UploadStatus,
    pub succeeded: Vec<String>,
    pub failed: Vec<ProviderFailure>,
    /// Providers that stored the file but whose catalog update failed
    pub catalog_sync_failures: Vec<ProviderFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyDeletion {
    pub key: String,
    /// Providers that confirmed the delete
    pub deleted_from: Vec<String>,
    pub failures: Vec<ProviderFailure>,
    /// False when the key was not in the catalog
    pub catalog_removed: bool,
    /// Set when the catalog could not be read or updated for this key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeletionReport {
    pub results: Vec<KeyDeletion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SkippedFile {
    pub key: String,
    pub reason: String,
}

/// A built zip plus what went into it
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub bytes: Vec<u8>,
    /// Entries in the archive after name collisions
    pub entries: usize,
    pub skipped: Vec<SkippedFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_summary_format() {
        let failures = vec![
            ProviderFailure::new("b", "HTTP 500: boom"),
            ProviderFailure::new("c", "timeout"),
        ];
        assert_eq!(failure_summary(&failures), "b: HTTP 500: boom, c: timeout");
        assert_eq!(failure_summary(&[]), "");
    }
}
