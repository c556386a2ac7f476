use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Which providers hold a copy of one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub key: String,
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
    /// First-insertion order, no duplicates
    pub providers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntry {
    pub fn holds(&self, provider_id: &str) -> bool {
        self.providers.iter().any(|p| p == provider_id)
    }

    /// Records a copy on `provider_id`; returns false if it was already listed
    pub fn add_provider(&mut self, provider_id: &str) -> bool {
        if self.holds(provider_id) {
            return false;
        }
        self.providers.push(provider_id.to_string());
        true
    }

    pub fn remove_provider(&mut self, provider_id: &str) -> bool {
        let before = self.providers.len();
        self.providers.retain(|p| p != provider_id);
        self.providers.len() != before
    }
}

/// File facts reported by a successful provider write
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub key: String,
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
}

/// The per-user catalog document, keyed by public key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserCatalog {
    #[serde(default)]
    pub entries: BTreeMap<String, CatalogEntry>,
}
