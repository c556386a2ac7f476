//! MinIO/S3-compatible object store
//!
//! Backs both the gateway's document bucket and a provider's file bucket.
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::object_store::{ObjectListing, ObjectMeta, ObjectStore, StoredObject};
use crate::core::config::MinIOConfig;
use crate::core::error::AppError;
use crate::shared::constants::DEFAULT_CONTENT_TYPE;

/// MinIO/S3-compatible storage client bound to one bucket
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
}

impl MinIOClient {
    /// Create a client for `bucket_name`, creating the bucket if it is missing
    pub async fn new(config: &MinIOConfig, bucket_name: &str) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(bucket_name, region.clone(), credentials.clone())
            .map_err(|e| AppError::Storage(format!("Failed to create MinIO bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint.clone(),
        };

        client.ensure_bucket_exists().await?;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}",
            client.endpoint,
            client.bucket.name()
        );

        Ok(client)
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    fn is_not_found(error: &str) -> bool {
        error.contains("404") || error.contains("NoSuchKey") || error.contains("Not Found")
    }
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .or_else(|_| DateTime::parse_from_rfc2822(s))
            .ok()
    })
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_else(Utc::now)
}

fn clean_etag(raw: Option<String>) -> String {
    raw.map(|e| e.trim_matches('"').to_string())
        .unwrap_or_default()
}

#[async_trait]
impl ObjectStore for MinIOClient {
    async fn list(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> Result<ObjectListing, AppError> {
        let pages = self
            .bucket
            .list(prefix.to_string(), delimiter.map(|d| d.to_string()))
            .await
            .map_err(|e| AppError::Storage(format!("Failed to list '{}': {}", prefix, e)))?;

        let mut listing = ObjectListing::default();
        for page in pages {
            for object in page.contents {
                listing.objects.push(ObjectMeta {
                    last_modified: parse_timestamp(Some(&object.last_modified)),
                    etag: clean_etag(object.e_tag),
                    size: object.size,
                    content_type: DEFAULT_CONTENT_TYPE.to_string(),
                    key: object.key,
                });
            }
            for common in page.common_prefixes.unwrap_or_default() {
                listing.common_prefixes.push(common.prefix);
            }
        }

        Ok(listing)
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError> {
        let response = match self.bucket.get_object(key).await {
            Ok(response) => response,
            Err(e) if Self::is_not_found(&e.to_string()) => return Ok(None),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to download object '{}': {}",
                    key, e
                )))
            }
        };

        match response.status_code() {
            404 => return Ok(None),
            code if !(200..300).contains(&code) => {
                return Err(AppError::Storage(format!(
                    "Failed to download object '{}': HTTP {}",
                    key, code
                )))
            }
            _ => {}
        }

        let headers = response.headers();
        let content_type = headers
            .get("content-type")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let etag = clean_etag(headers.get("etag").cloned());
        let last_modified = parse_timestamp(headers.get("last-modified").map(|s| s.as_str()));
        let body = Bytes::copy_from_slice(response.as_slice());

        debug!(
            "Downloaded object '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );

        Ok(Some(StoredObject {
            meta: ObjectMeta {
                key: key.to_string(),
                size: body.len() as u64,
                content_type,
                last_modified,
                etag,
            },
            body,
        }))
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<ObjectMeta, AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload object '{}': {}", key, e)))?;

        if !(200..300).contains(&response.status_code()) {
            return Err(AppError::Storage(format!(
                "Failed to upload object '{}': HTTP {}",
                key,
                response.status_code()
            )));
        }

        debug!("Uploaded object '{}' to bucket '{}'", key, self.bucket.name());

        Ok(ObjectMeta {
            key: key.to_string(),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            last_modified: Utc::now(),
            etag: clean_etag(response.headers().get("etag").cloned()),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        match self.bucket.delete_object(key).await {
            Ok(_) => {
                debug!("Deleted object '{}' from bucket '{}'", key, self.bucket.name());
                Ok(())
            }
            Err(e) if Self::is_not_found(&e.to_string()) => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete object '{}': {}",
                key, e
            ))),
        }
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>, AppError> {
        match self.bucket.head_object(key).await {
            Ok((_, 404)) => Ok(None),
            Ok((head, _)) => Ok(Some(ObjectMeta {
                key: key.to_string(),
                size: head.content_length.unwrap_or(0).max(0) as u64,
                content_type: head
                    .content_type
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
                last_modified: parse_timestamp(head.last_modified.as_deref()),
                etag: clean_etag(head.e_tag),
            })),
            Err(e) if Self::is_not_found(&e.to_string()) => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to inspect object '{}': {}",
                key, e
            ))),
        }
    }
}
