use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{BlobError, BlobStore, validate_key};

/// Stores blobs as files under `<data_dir>/media`.
pub struct FsBlobStore {
    base_path: PathBuf,
}

impl FsBlobStore {
    pub fn new(media_dir: &Path) -> Self {
        Self {
            base_path: media_dir.to_path_buf(),
        }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        key.split('/')
            .fold(self.base_path.join("objects"), |path, segment| path.join(segment))
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path.join("tmp").join(Uuid::new_v4().to_string())
    }
}

fn from_io(e: std::io::Error) -> BlobError {
    if e.kind() == ErrorKind::NotFound {
        BlobError::NotFound
    } else {
        BlobError::Io(e)
    }
}

async fn write_then_rename(temp_path: &Path, final_path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut temp_file = File::create(temp_path).await?;
    temp_file.write_all(data).await?;
    temp_file.sync_all().await?;
    drop(temp_file);

    if let Some(parent) = final_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    // rename replaces an existing blob atomically
    fs::rename(temp_path, final_path).await
}

#[async_trait::async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<String, BlobError> {
        validate_key(key)?;

        let temp_path = self.temp_path();
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let final_path = self.object_path(key);
        if let Err(e) = write_then_rename(&temp_path, &final_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(BlobError::Io(e));
        }

        Ok(key.to_string())
    }

    async fn get(&self, key: &str) -> Result<Bytes, BlobError> {
        validate_key(key)?;
        let data = fs::read(self.object_path(key)).await.map_err(from_io)?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        validate_key(key)?;
        fs::remove_file(self.object_path(key)).await.map_err(from_io)
    }
}
