use std::sync::Arc;

use tracing::info;

use super::validation::{validate_box_name, validate_description};
use super::{purge_media, resolve_box, resolve_repo, touch};
use crate::blob::BlobStore;
use crate::error::{Error, Result};
use crate::policy::require_access;
use crate::quota;
use crate::store::Store;
use crate::types::{NewRepoBox, RepoBox, RoleSet, User};

/// Fields a box update may change. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct BoxPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct BoxService {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
}

impl BoxService {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Creates a box in the repo. Requires ADMIN or OWNER, and the acting
    /// user's tier decides how many boxes the repo may hold.
    pub fn create_box(
        &self,
        actor: &User,
        repo_id: i64,
        name: &str,
        description: &str,
    ) -> Result<RepoBox> {
        let repo = resolve_repo(self.store.as_ref(), repo_id)?;
        require_access(self.store.as_ref(), &actor.id, repo.id, RoleSet::MANAGE)?;
        validate_box_name(name)?;
        validate_description(description)?;

        let account = self.store.get_current_account(&actor.id)?;
        let tier = quota::tier_of(account.as_ref());

        let new_box = NewRepoBox {
            repo_id: repo.id,
            user_id: actor.id.clone(),
            name: name.to_string(),
            description: description.to_string(),
        };
        let repo_box = self
            .store
            .create_box(&new_box, &|count| quota::ensure_box_quota(tier, count))?;

        info!(box_id = repo_box.id, repo_id = repo.id, "box created");
        Ok(repo_box)
    }

    pub fn get_box(&self, actor: &User, id: i64) -> Result<RepoBox> {
        let repo_box = resolve_box(self.store.as_ref(), id)?;
        require_access(self.store.as_ref(), &actor.id, repo_box.repo_id, RoleSet::ANY)?;
        Ok(repo_box)
    }

    pub fn list_boxes(&self, actor: &User, repo_id: i64) -> Result<Vec<RepoBox>> {
        let repo = resolve_repo(self.store.as_ref(), repo_id)?;
        require_access(self.store.as_ref(), &actor.id, repo.id, RoleSet::ANY)?;
        self.store.list_boxes(repo.id)
    }

    pub fn update_box(&self, actor: &User, id: i64, patch: BoxPatch) -> Result<RepoBox> {
        let mut repo_box = resolve_box(self.store.as_ref(), id)?;
        require_access(
            self.store.as_ref(),
            &actor.id,
            repo_box.repo_id,
            RoleSet::MANAGE,
        )?;

        if let Some(name) = patch.name {
            validate_box_name(&name)?;
            repo_box.name = name;
        }
        if let Some(description) = patch.description {
            validate_description(&description)?;
            repo_box.description = description;
        }
        repo_box.updated_at = touch(repo_box.updated_at);

        self.store.update_box(&repo_box)?;

        info!(box_id = repo_box.id, "box updated");
        Ok(repo_box)
    }

    /// Deletes the box's media blobs and rows, then the box.
    pub async fn delete_box(&self, actor: &User, id: i64) -> Result<()> {
        let repo_box = resolve_box(self.store.as_ref(), id)?;
        require_access(
            self.store.as_ref(),
            &actor.id,
            repo_box.repo_id,
            RoleSet::MANAGE,
        )?;

        let media = self.store.list_media(repo_box.id)?;
        purge_media(self.store.as_ref(), self.blobs.as_ref(), &media).await?;

        if !self.store.delete_box(repo_box.id)? {
            return Err(Error::NotFound("box"));
        }

        info!(box_id = repo_box.id, media = media.len(), "box deleted");
        Ok(())
    }
}
