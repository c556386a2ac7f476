//! Process-local object store used in development and tests.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

use super::object_store::{content_etag, ObjectListing, ObjectMeta, ObjectStore, StoredObject};
use crate::core::error::AppError;

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
    ) -> Result<ObjectListing, AppError> {
        let objects = self.objects.read();
        let mut listing = ObjectListing::default();
        let mut prefixes = BTreeSet::new();

        for (key, object) in objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }

            let rest = &key[prefix.len()..];
            match delimiter.and_then(|d| rest.find(d).map(|idx| (d, idx))) {
                Some((d, idx)) => {
                    prefixes.insert(format!("{}{}", prefix, &rest[..idx + d.len()]));
                }
                None => listing.objects.push(object.meta.clone()),
            }
        }

        listing.common_prefixes = prefixes.into_iter().collect();
        Ok(listing)
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError> {
        Ok(self.objects.read().get(key).cloned())
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<ObjectMeta, AppError> {
        if key.is_empty() {
            return Err(AppError::Storage("Object key must not be empty".to_string()));
        }

        let meta = ObjectMeta {
            key: key.to_string(),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            last_modified: Utc::now(),
            etag: content_etag(&data),
        };

        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                meta: meta.clone(),
                body: data,
            },
        );

        Ok(meta)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.objects.write().remove(key);
        Ok(())
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>, AppError> {
        Ok(self.objects.read().get(key).map(|o| o.meta.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> MemoryObjectStore {
        let store = MemoryObjectStore::new();
        for key in ["a.txt", "docs/b.txt", "docs/2024/c.txt", "photos/d.jpg"] {
            store
                .put(key, Bytes::from_static(b"data"), "text/plain")
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_list_groups_by_delimiter() {
        let store = seeded().await;

        let root = store.list("", Some("/")).await.unwrap();
        let keys: Vec<_> = root.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["a.txt"]);
        assert_eq!(root.common_prefixes, vec!["docs/", "photos/"]);

        let docs = store.list("docs/", Some("/")).await.unwrap();
        let keys: Vec<_> = docs.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["docs/b.txt"]);
        assert_eq!(docs.common_prefixes, vec!["docs/2024/"]);
    }

    #[tokio::test]
    async fn test_list_without_delimiter_is_recursive() {
        let store = seeded().await;
        let all = store.list("docs/", None).await.unwrap();
        assert_eq!(all.objects.len(), 2);
        assert!(all.common_prefixes.is_empty());
    }

    #[tokio::test]
    async fn test_put_head_delete() {
        let store = MemoryObjectStore::new();
        let meta = store
            .put("x.bin", Bytes::from_static(b"12345"), "application/octet-stream")
            .await
            .unwrap();
        assert_eq!(meta.size, 5);
        assert_eq!(meta.etag, content_etag(b"12345"));

        assert!(store.head("x.bin").await.unwrap().is_some());
        store.delete("x.bin").await.unwrap();
        store.delete("x.bin").await.unwrap();
        assert!(store.head("x.bin").await.unwrap().is_none());
        assert!(store.get("x.bin").await.unwrap().is_none());
    }
}
