use std::sync::Arc;

use tracing::info;

use super::validation::validate_repo_name;
use super::{purge_media, resolve_repo, touch};
use crate::blob::BlobStore;
use crate::error::{Error, Result};
use crate::policy::require_access;
use crate::quota;
use crate::store::Store;
use crate::types::{Repo, RepoAccess, Role, RoleSet, User};

#[derive(Clone)]
pub struct RepoService {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
}

impl RepoService {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Creates a repo owned by `actor`, subject to the actor's repo quota.
    pub fn create_repo(&self, actor: &User, name: &str) -> Result<Repo> {
        validate_repo_name(name)?;

        let account = self.store.get_current_account(&actor.id)?;
        let tier = quota::tier_of(account.as_ref());

        let repo = self.store.create_repo(&actor.id, name, &|count| {
            quota::ensure_repo_quota(tier, count)
        })?;

        info!(repo_id = repo.id, user_id = %actor.id, "repo created");
        Ok(repo)
    }

    pub fn get_repo(&self, actor: &User, id: i64) -> Result<Repo> {
        let repo = resolve_repo(self.store.as_ref(), id)?;
        require_access(self.store.as_ref(), &actor.id, repo.id, RoleSet::ANY)?;
        Ok(repo)
    }

    /// Repos the actor holds any role on, ordered by id.
    pub fn list_repos(&self, actor: &User) -> Result<Vec<Repo>> {
        self.store.list_accessible_repos(&actor.id)
    }

    pub fn rename_repo(&self, actor: &User, id: i64, name: &str) -> Result<Repo> {
        let mut repo = resolve_repo(self.store.as_ref(), id)?;
        require_access(self.store.as_ref(), &actor.id, repo.id, RoleSet::MANAGE)?;
        validate_repo_name(name)?;

        repo.name = name.to_string();
        repo.updated_at = touch(repo.updated_at);
        self.store.update_repo(&repo)?;

        info!(repo_id = repo.id, "repo renamed");
        Ok(repo)
    }

    /// Deletes every media blob in the repo, then the repo with its boxes
    /// and access rows.
    pub async fn delete_repo(&self, actor: &User, id: i64) -> Result<()> {
        let repo = resolve_repo(self.store.as_ref(), id)?;
        require_access(self.store.as_ref(), &actor.id, repo.id, RoleSet::OWNER)?;

        let media = self.store.list_repo_media(repo.id)?;
        purge_media(self.store.as_ref(), self.blobs.as_ref(), &media).await?;

        if !self.store.delete_repo(repo.id)? {
            return Err(Error::NotFound("repo"));
        }

        info!(repo_id = repo.id, media = media.len(), "repo deleted");
        Ok(())
    }

    pub fn grant_access(
        &self,
        actor: &User,
        repo_id: i64,
        target_user_id: &str,
        role: Role,
    ) -> Result<RepoAccess> {
        let repo = resolve_repo(self.store.as_ref(), repo_id)?;
        require_access(self.store.as_ref(), &actor.id, repo.id, RoleSet::MANAGE)?;

        if self.store.get_user(target_user_id)?.is_none() {
            return Err(Error::NotFound("user"));
        }

        let access = self.store.create_repo_access(target_user_id, repo.id, role)?;

        info!(repo_id = repo.id, user_id = target_user_id, %role, "repo access granted");
        Ok(access)
    }

    pub fn list_access(&self, actor: &User, repo_id: i64) -> Result<Vec<RepoAccess>> {
        let repo = resolve_repo(self.store.as_ref(), repo_id)?;
        require_access(self.store.as_ref(), &actor.id, repo.id, RoleSet::ANY)?;
        self.store.list_repo_access(repo.id)
    }
}
