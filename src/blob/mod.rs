//! Blob storage for media bytes.
//!
//! The core only ever stores bytes under a key, reads them back, and deletes
//! them. Keys are relative `/`-separated paths such as
//! `repo_1/box_2/file_3`.

mod fs;
mod memory;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found")]
    NotFound,
    #[error("invalid blob key: {0}")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` under `key`, replacing any existing blob. Returns the key.
    async fn put(&self, key: &str, data: &[u8]) -> Result<String, BlobError>;

    async fn get(&self, key: &str) -> Result<Bytes, BlobError>;

    /// Removes the blob. Returns `BlobError::NotFound` when nothing was stored.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
}

/// Rejects keys that could escape the store root.
pub fn validate_key(key: &str) -> Result<(), BlobError> {
    if key.is_empty() || key.starts_with('/') || key.ends_with('/') {
        return Err(BlobError::InvalidKey(key.to_string()));
    }

    for segment in key.split('/') {
        let valid = !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_accepts_media_keys() {
        assert!(validate_key("repo_1/box_2/file_3").is_ok());
        assert!(validate_key("single").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_traversal() {
        assert!(validate_key("").is_err());
        assert!(validate_key("/abs/path").is_err());
        assert!(validate_key("repo_1/../etc").is_err());
        assert!(validate_key("repo_1//file").is_err());
        assert!(validate_key("repo_1/file/").is_err());
        assert!(validate_key("repo 1/file").is_err());
    }
}
