use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::core::error::AppError;

/// Metadata of one stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub key: String,
    pub size: u64,
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
    pub etag: String,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub meta: ObjectMeta,
    pub body: Bytes,
}

/// Result of a delimiter-grouped listing
#[derive(Debug, Clone, Default)]
pub struct ObjectListing {
    pub objects: Vec<ObjectMeta>,
    /// Grouped sub-prefixes, each ending with the delimiter
    pub common_prefixes: Vec<String>,
}

/// The list/get/put/delete/head contract every storage engine exposes
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists objects under `prefix`. With a delimiter, keys containing it past
    /// the prefix are folded into `common_prefixes`.
    async fn list(&self, prefix: &str, delimiter: Option<&str>)
        -> Result<ObjectListing, AppError>;

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError>;

    async fn put(&self, key: &str, data: Bytes, content_type: &str)
        -> Result<ObjectMeta, AppError>;

    /// Removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>, AppError>;
}

/// Hex SHA-256 digest used as a content etag
pub fn content_etag(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
