use bytes::Bytes;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::object_store::ObjectStore;
use crate::core::error::AppError;

type LockMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// JSON documents kept in an object store.
///
/// Read-modify-write cycles on the same key must hold the guard returned by
/// [`DocumentStore::lock`]; documents under different keys never contend.
pub struct DocumentStore {
    store: Arc<dyn ObjectStore>,
    locks: LockMap,
}

/// Held for the duration of a read-modify-write on one document. The last
/// holder or waiter to leave drops the key's entry from the lock map.
pub struct DocumentGuard {
    key: String,
    locks: LockMap,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DocumentGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self.locks.lock();
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

impl DocumentStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn lock(&self, key: &str) -> DocumentGuard {
        let lock = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(key.to_string()).or_default())
        };

        // Built before waiting so a cancelled waiter still prunes the entry
        let mut held = DocumentGuard {
            key: key.to_string(),
            locks: Arc::clone(&self.locks),
            guard: None,
        };
        held.guard = Some(lock.lock_owned().await);
        held
    }

    pub async fn exists(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.store.head(key).await?.is_some())
    }

    #[cfg(test)]
    pub(crate) fn lock_entries(&self) -> usize {
        self.locks.lock().len()
    }

    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let Some(object) = self.store.get(key).await? else {
            return Ok(None);
        };

        serde_json::from_slice(&object.body)
            .map(Some)
            .map_err(|e| AppError::Storage(format!("Corrupt document '{}': {}", key, e)))
    }

    pub async fn write<T: Serialize>(&self, key: &str, document: &T) -> Result<(), AppError> {
        let body = serde_json::to_vec(document)
            .map_err(|e| AppError::Internal(format!("Failed to encode '{}': {}", key, e)))?;
        self.store
            .put(key, Bytes::from(body), "application/json")
            .await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.store.delete(key).await
    }
}
