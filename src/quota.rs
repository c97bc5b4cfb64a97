//! Tier-based resource-count limits.

use crate::error::{Error, Result};
use crate::types::{Account, AccountType};

/// Tier used for quota decisions. A user with no account is FREE.
#[must_use]
pub fn tier_of(account: Option<&Account>) -> AccountType {
    account.map(|a| a.account_type).unwrap_or_default()
}

#[must_use]
pub fn can_create_repo(tier: AccountType, current_repos: i64) -> bool {
    tier.max_repos().is_none_or(|max| current_repos < max)
}

#[must_use]
pub fn can_create_box(tier: AccountType, current_boxes: i64) -> bool {
    tier.max_boxes().is_none_or(|max| current_boxes < max)
}

pub fn ensure_repo_quota(tier: AccountType, current_repos: i64) -> Result<()> {
    match tier.max_repos() {
        Some(limit) if !can_create_repo(tier, current_repos) => Err(Error::QuotaExceeded {
            resource: "repo",
            limit,
        }),
        _ => Ok(()),
    }
}

pub fn ensure_box_quota(tier: AccountType, current_boxes: i64) -> Result<()> {
    match tier.max_boxes() {
        Some(limit) if !can_create_box(tier, current_boxes) => Err(Error::QuotaExceeded {
            resource: "box",
            limit,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_tier_stops_at_limit() {
        assert!(can_create_repo(AccountType::Free, 0));
        assert!(can_create_repo(AccountType::Free, 4));
        assert!(!can_create_repo(AccountType::Free, 5));
        assert!(!can_create_box(AccountType::Free, 5));
        assert!(!can_create_box(AccountType::Free, 6));
    }

    #[test]
    fn test_paid_tier_is_unbounded() {
        assert!(can_create_repo(AccountType::Paid, 5));
        assert!(can_create_repo(AccountType::Paid, 10_000));
        assert!(can_create_box(AccountType::Paid, 10_000));
    }

    #[test]
    fn test_ensure_reports_resource_and_limit() {
        assert!(ensure_repo_quota(AccountType::Free, 4).is_ok());
        assert!(matches!(
            ensure_repo_quota(AccountType::Free, 5),
            Err(Error::QuotaExceeded {
                resource: "repo",
                limit: 5
            })
        ));
        assert!(matches!(
            ensure_box_quota(AccountType::Free, 5),
            Err(Error::QuotaExceeded {
                resource: "box",
                limit: 5
            })
        ));
        assert!(ensure_box_quota(AccountType::Paid, 5).is_ok());
    }

    #[test]
    fn test_missing_account_is_free() {
        assert_eq!(tier_of(None), AccountType::Free);
    }
}
