//! Blob store keeping uploaded photos in a map.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::PhotoKey;
use crate::domain::ports::{PhotoStore, PhotoStoreError};

/// URL scheme of blobs served from [`InMemoryPhotoStore`].
const MEMORY_URL_SCHEME: &str = "memory://";

/// Photo store kept in memory, resolving keys to `memory://` URLs.
#[derive(Default)]
pub struct InMemoryPhotoStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryPhotoStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under `key`, if any.
    pub fn blob(&self, key: &PhotoKey) -> Option<Vec<u8>> {
        self.lock().get(key.as_ref()).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PhotoStore for InMemoryPhotoStore {
    async fn upload(&self, key: &PhotoKey, bytes: Vec<u8>) -> Result<(), PhotoStoreError> {
        if bytes.is_empty() {
            return Err(PhotoStoreError::upload(format!("{key}: empty image")));
        }
        self.lock().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn download_url(&self, key: &PhotoKey) -> Result<String, PhotoStoreError> {
        if self.lock().contains_key(key.as_ref()) {
            Ok(format!("{MEMORY_URL_SCHEME}{key}"))
        } else {
            Err(PhotoStoreError::resolve(format!("{key} does not exist")))
        }
    }
}
