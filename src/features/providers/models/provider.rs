use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A registered storage backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub id: String,
    pub name: String,
    /// Base URL of the provider backend
    #[serde(rename = "workerUrl")]
    pub endpoint: String,
    /// Bearer credential sent on every provider call
    #[serde(rename = "authToken")]
    pub credential: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub added_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl ProviderConfig {
    /// Absolute URL of `path` on this provider
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}
