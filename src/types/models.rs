use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

/// Repos and boxes a FREE account may hold.
pub const FREE_TIER_LIMIT: i64 = 5;

/// Billing periods a PAID account may be bought for.
pub const PAID_MONTHS_CHOICES: [i32; 4] = [1, 3, 6, 12];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    #[default]
    Free,
    Paid,
}

impl AccountType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AccountType::Free => "FREE",
            AccountType::Paid => "PAID",
        }
    }

    pub fn parse(s: &str) -> Option<AccountType> {
        match s {
            "FREE" => Some(AccountType::Free),
            "PAID" => Some(AccountType::Paid),
            _ => None,
        }
    }

    /// Maximum repos a user on this tier may own. `None` is unbounded.
    #[must_use]
    pub const fn max_repos(self) -> Option<i64> {
        match self {
            AccountType::Free => Some(FREE_TIER_LIMIT),
            AccountType::Paid => None,
        }
    }

    /// Maximum boxes per repo on this tier. `None` is unbounded.
    #[must_use]
    pub const fn max_boxes(self) -> Option<i64> {
        match self {
            AccountType::Free => Some(FREE_TIER_LIMIT),
            AccountType::Paid => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: String,
    pub account_type: AccountType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_months: Option<i32>,
    pub created_at: DateTime<Utc>,
    /// Set once a newer account replaces this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superseded_at: Option<DateTime<Utc>>,
}

impl Account {
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.superseded_at.is_none()
    }

    #[must_use]
    pub fn max_repos(&self) -> Option<i64> {
        self.account_type.max_repos()
    }

    #[must_use]
    pub fn max_boxes(&self) -> Option<i64> {
        self.account_type.max_boxes()
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: String,
    pub account_type: AccountType,
    pub paid_months: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoAccess {
    pub id: i64,
    pub user_id: String,
    pub repo_id: i64,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// A named sub-collection of media inside a repo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoBox {
    pub id: i64,
    pub repo_id: i64,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRepoBox {
    pub repo_id: i64,
    pub user_id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaState {
    /// Metadata row exists, blob not yet written.
    Pending,
    Ready,
}

impl MediaState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MediaState::Pending => "PENDING",
            MediaState::Ready => "READY",
        }
    }

    pub fn parse(s: &str) -> Option<MediaState> {
        match s {
            "PENDING" => Some(MediaState::Pending),
            "READY" => Some(MediaState::Ready),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxMedia {
    pub id: i64,
    pub box_id: i64,
    pub repo_id: i64,
    pub user_id: String,
    pub file_name: String,
    pub size_bytes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub state: MediaState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoxMedia {
    /// Blob key for this media. Stable only once the row has an id.
    #[must_use]
    pub fn storage_key(&self) -> String {
        media_storage_key(self.repo_id, self.box_id, self.id)
    }
}

#[must_use]
pub fn media_storage_key(repo_id: i64, box_id: i64, media_id: i64) -> String {
    format!("repo_{repo_id}/box_{box_id}/file_{media_id}")
}

#[derive(Debug, Clone)]
pub struct NewBoxMedia {
    pub box_id: i64,
    pub user_id: String,
    pub file_name: String,
}
