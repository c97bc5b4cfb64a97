//! Resource lifecycle services.
//!
//! Each operation resolves its target, checks repo access, then touches the
//! entity store and the blob store. Handlers never call the store directly
//! for repo-scoped resources.

mod accounts;
mod boxes;
mod media;
mod repos;
pub mod validation;

pub use accounts::AccountService;
pub use boxes::{BoxPatch, BoxService};
pub use media::{MAX_MEDIA_SIZE_BYTES, MediaPatch, MediaService, Upload};
pub use repos::RepoService;

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::blob::BlobStore;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{BoxMedia, Repo, RepoBox};

#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub repos: RepoService,
    pub boxes: BoxService,
    pub media: MediaService,
}

impl Services {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            accounts: AccountService::new(store.clone()),
            repos: RepoService::new(store.clone(), blobs.clone()),
            boxes: BoxService::new(store.clone(), blobs.clone()),
            media: MediaService::new(store, blobs),
        }
    }
}

/// Next `updated_at` for a row last touched at `previous`; never moves backwards.
pub(crate) fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}

pub(crate) fn resolve_repo(store: &dyn Store, id: i64) -> Result<Repo> {
    store.get_repo(id)?.ok_or(Error::NotFound("repo"))
}

pub(crate) fn resolve_box(store: &dyn Store, id: i64) -> Result<RepoBox> {
    store.get_box(id)?.ok_or(Error::NotFound("box"))
}

pub(crate) fn resolve_media(store: &dyn Store, id: i64) -> Result<BoxMedia> {
    store.get_media(id)?.ok_or(Error::NotFound("media"))
}

/// Deletes the blobs of `items` then their rows. Stops at the first blob
/// failure, leaving that row and all later ones in place.
pub(crate) async fn purge_media(
    store: &dyn Store,
    blobs: &dyn BlobStore,
    items: &[BoxMedia],
) -> Result<()> {
    for item in items {
        media::delete_blob_then_row(store, blobs, item).await?;
    }
    Ok(())
}
