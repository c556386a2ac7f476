use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::catalog::models::{CatalogEntry, FileRecord};

#[derive(Debug, Deserialize, IntoParams)]
pub struct CatalogQuery {
    /// Only entries whose key starts with this prefix
    pub prefix: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CatalogKeyQuery {
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogListResponseDto {
    pub files: Vec<CatalogEntry>,
}

/// Manual catalog sync for a copy that already exists on a provider
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppendCatalogEntryDto {
    #[validate(length(min = 1, message = "Key is required"))]
    pub key: String,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[serde(default)]
    pub size: u64,

    #[serde(default)]
    pub is_directory: bool,

    #[validate(length(min = 1, message = "Provider ID is required"))]
    pub provider_id: String,
}

impl AppendCatalogEntryDto {
    pub fn into_record(self) -> (FileRecord, String) {
        (
            FileRecord {
                key: self.key,
                name: self.name,
                size: self.size,
                is_directory: self.is_directory,
            },
            self.provider_id,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogEntryResponseDto {
    pub success: bool,
    pub entry: CatalogEntry,
}
