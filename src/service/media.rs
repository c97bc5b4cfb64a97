use std::sync::Arc;

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::validation::validate_file_name;
use super::{resolve_box, resolve_media, touch};
use crate::blob::{BlobError, BlobStore};
use crate::error::{Error, Result};
use crate::policy::require_access;
use crate::store::Store;
use crate::types::{BoxMedia, MediaState, NewBoxMedia, RoleSet, User};

/// Largest accepted media payload.
pub const MAX_MEDIA_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// An incoming file. `data` is `None` when the request carried no file part.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub data: Option<Bytes>,
}

#[derive(Debug, Clone, Default)]
pub struct MediaPatch {
    pub file_name: Option<String>,
    pub data: Option<Bytes>,
}

fn check_size(data: &[u8]) -> Result<()> {
    let size = data.len() as u64;
    if size > MAX_MEDIA_SIZE_BYTES {
        return Err(Error::FileTooLarge {
            size,
            max: MAX_MEDIA_SIZE_BYTES,
        });
    }
    Ok(())
}

fn checksum(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Deletes the blob, then the row. An already-missing blob counts as
/// deleted; any other blob failure keeps the row.
pub(crate) async fn delete_blob_then_row(
    store: &dyn Store,
    blobs: &dyn BlobStore,
    media: &BoxMedia,
) -> Result<()> {
    match blobs.delete(&media.storage_key()).await {
        Ok(()) | Err(BlobError::NotFound) => {}
        Err(e) => {
            warn!(media_id = media.id, error = %e, "blob delete failed, keeping media row");
            return Err(e.into());
        }
    }
    store.delete_media(media.id)?;
    Ok(())
}

#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
}

impl MediaService {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Stores a new file in the box.
    ///
    /// The row is written PENDING first so its id can fix the storage key,
    /// then the blob is put and the row flipped to READY. A failed put
    /// removes the PENDING row.
    pub async fn upload(&self, actor: &User, box_id: i64, upload: Upload) -> Result<BoxMedia> {
        let repo_box = resolve_box(self.store.as_ref(), box_id)?;
        require_access(
            self.store.as_ref(),
            &actor.id,
            repo_box.repo_id,
            RoleSet::MANAGE,
        )?;

        let data = upload
            .data
            .ok_or_else(|| Error::Validation("file is required".into()))?;
        check_size(&data)?;
        validate_file_name(&upload.file_name)?;

        let mut media = self.store.create_media(&NewBoxMedia {
            box_id: repo_box.id,
            user_id: actor.id.clone(),
            file_name: upload.file_name,
        })?;
        let key = media.storage_key();

        if let Err(e) = self.blobs.put(&key, &data).await {
            warn!(media_id = media.id, error = %e, "blob put failed, removing pending media");
            if let Err(cleanup) = self.store.delete_media(media.id) {
                warn!(media_id = media.id, error = %cleanup, "failed to remove pending media");
            }
            return Err(e.into());
        }

        media.size_bytes = data.len() as i64;
        media.checksum = Some(checksum(&data));
        media.state = MediaState::Ready;
        media.updated_at = touch(media.updated_at);
        self.store.mark_media_ready(
            media.id,
            media.size_bytes,
            media.checksum.as_deref().unwrap_or_default(),
            media.updated_at,
        )?;

        info!(media_id = media.id, box_id = media.box_id, size = media.size_bytes, "media uploaded");
        Ok(media)
    }

    pub fn metadata(&self, actor: &User, id: i64) -> Result<BoxMedia> {
        let media = resolve_media(self.store.as_ref(), id)?;
        require_access(self.store.as_ref(), &actor.id, media.repo_id, RoleSet::ANY)?;
        Ok(media)
    }

    pub fn list_media(&self, actor: &User, box_id: i64) -> Result<Vec<BoxMedia>> {
        let repo_box = resolve_box(self.store.as_ref(), box_id)?;
        require_access(self.store.as_ref(), &actor.id, repo_box.repo_id, RoleSet::ANY)?;
        self.store.list_media(repo_box.id)
    }

    /// Returns the media row and its stored bytes.
    pub async fn download(&self, actor: &User, id: i64) -> Result<(BoxMedia, Bytes)> {
        let media = resolve_media(self.store.as_ref(), id)?;
        require_access(self.store.as_ref(), &actor.id, media.repo_id, RoleSet::ANY)?;

        if media.state != MediaState::Ready {
            return Err(Error::NotFound("media"));
        }

        match self.blobs.get(&media.storage_key()).await {
            Ok(data) => Ok((media, data)),
            Err(BlobError::NotFound) => {
                warn!(media_id = media.id, "media row is READY but its blob is missing");
                Err(Error::NotFound("media"))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the name and/or content. New content overwrites the blob
    /// before the row is updated.
    pub async fn update(&self, actor: &User, id: i64, patch: MediaPatch) -> Result<BoxMedia> {
        let mut media = resolve_media(self.store.as_ref(), id)?;
        require_access(self.store.as_ref(), &actor.id, media.repo_id, RoleSet::MANAGE)?;

        if patch.file_name.is_none() && patch.data.is_none() {
            return Err(Error::Validation(
                "at least one of file or file_name is required".into(),
            ));
        }
        if media.state != MediaState::Ready {
            return Err(Error::NotFound("media"));
        }
        if let Some(data) = &patch.data {
            check_size(data)?;
        }
        if let Some(file_name) = &patch.file_name {
            validate_file_name(file_name)?;
        }

        if let Some(data) = patch.data {
            self.blobs.put(&media.storage_key(), &data).await?;
            media.size_bytes = data.len() as i64;
            media.checksum = Some(checksum(&data));
        }
        if let Some(file_name) = patch.file_name {
            media.file_name = file_name;
        }
        media.updated_at = touch(media.updated_at);

        self.store.update_media(&media)?;

        info!(media_id = media.id, "media updated");
        Ok(media)
    }

    pub async fn delete(&self, actor: &User, id: i64) -> Result<()> {
        let media = resolve_media(self.store.as_ref(), id)?;
        require_access(self.store.as_ref(), &actor.id, media.repo_id, RoleSet::MANAGE)?;

        delete_blob_then_row(self.store.as_ref(), self.blobs.as_ref(), &media).await?;

        info!(media_id = media.id, "media deleted");
        Ok(())
    }
}
