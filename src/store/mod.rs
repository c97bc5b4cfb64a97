mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::*;

/// Decides, inside the creating transaction, whether one more row may be
/// added given the live count of existing rows.
pub type Admission<'a> = &'a (dyn Fn(i64) -> Result<()> + 'a);

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    /// Inserts the user and their first account in one transaction.
    fn create_user_with_account(&self, user: &User, account: &NewAccount) -> Result<Account>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_name(&self, name: &str) -> Result<Option<User>>;
    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>>;
    fn delete_user(&self, id: &str) -> Result<bool>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn list_user_tokens(&self, user_id: &str) -> Result<Vec<Token>>;
    fn delete_token(&self, id: &str) -> Result<bool>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;
    fn has_admin_token(&self) -> Result<bool>;

    // Account operations
    /// Inserts a new current account and supersedes the previous one atomically.
    fn create_account(&self, account: &NewAccount) -> Result<Account>;
    fn get_current_account(&self, user_id: &str) -> Result<Option<Account>>;
    fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>>;

    // Repo operations
    /// Counts the owner's repos, asks `admit`, then inserts the repo and the
    /// owner's OWNER access row, all in one transaction.
    fn create_repo(&self, user_id: &str, name: &str, admit: Admission<'_>) -> Result<Repo>;
    fn get_repo(&self, id: i64) -> Result<Option<Repo>>;
    fn list_accessible_repos(&self, user_id: &str) -> Result<Vec<Repo>>;
    fn count_user_repos(&self, user_id: &str) -> Result<i64>;
    fn update_repo(&self, repo: &Repo) -> Result<()>;
    fn delete_repo(&self, id: i64) -> Result<bool>;

    // Repo access operations
    fn create_repo_access(&self, user_id: &str, repo_id: i64, role: Role) -> Result<RepoAccess>;
    fn list_repo_access(&self, repo_id: i64) -> Result<Vec<RepoAccess>>;
    fn list_user_roles(&self, user_id: &str, repo_id: i64) -> Result<Vec<Role>>;

    // Box operations
    /// Counts the repo's boxes, asks `admit`, then inserts, in one transaction.
    fn create_box(&self, new_box: &NewRepoBox, admit: Admission<'_>) -> Result<RepoBox>;
    fn get_box(&self, id: i64) -> Result<Option<RepoBox>>;
    fn list_boxes(&self, repo_id: i64) -> Result<Vec<RepoBox>>;
    fn count_boxes(&self, repo_id: i64) -> Result<i64>;
    fn update_box(&self, repo_box: &RepoBox) -> Result<()>;
    fn delete_box(&self, id: i64) -> Result<bool>;

    // Media operations
    /// Inserts a PENDING media row; its id fixes the storage key.
    fn create_media(&self, media: &NewBoxMedia) -> Result<BoxMedia>;
    fn get_media(&self, id: i64) -> Result<Option<BoxMedia>>;
    fn list_media(&self, box_id: i64) -> Result<Vec<BoxMedia>>;
    fn list_repo_media(&self, repo_id: i64) -> Result<Vec<BoxMedia>>;
    /// Records the stored blob and flips the row to READY.
    fn mark_media_ready(
        &self,
        id: i64,
        size_bytes: i64,
        checksum: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;
    fn update_media(&self, media: &BoxMedia) -> Result<()>;
    fn delete_media(&self, id: i64) -> Result<bool>;
}
