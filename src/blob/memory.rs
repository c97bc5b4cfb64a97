use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;

use super::{BlobError, BlobStore, validate_key};

/// Process-local blob store, for tests and ephemeral servers.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn blobs(&self) -> std::sync::MutexGuard<'_, HashMap<String, Bytes>> {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.blobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs().is_empty()
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<String, BlobError> {
        validate_key(key)?;
        self.blobs()
            .insert(key.to_string(), Bytes::copy_from_slice(data));
        Ok(key.to_string())
    }

    async fn get(&self, key: &str) -> Result<Bytes, BlobError> {
        validate_key(key)?;
        self.blobs().get(key).cloned().ok_or(BlobError::NotFound)
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        validate_key(key)?;
        self.blobs()
            .remove(key)
            .map(|_| ())
            .ok_or(BlobError::NotFound)
    }
}
