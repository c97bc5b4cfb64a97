use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::validation::{validate_account_terms, validate_user_name};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Account, AccountType, NewAccount, User};

/// Billing tier history for the acting user.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates a user together with their first account: PAID when
    /// `paid_months` is given, FREE otherwise. Neither row is kept if either
    /// insert fails.
    pub fn register_user(&self, name: &str, paid_months: Option<i32>) -> Result<(User, Account)> {
        validate_user_name(name)?;
        let account_type = if paid_months.is_some() {
            AccountType::Paid
        } else {
            AccountType::Free
        };
        validate_account_terms(account_type, paid_months)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        let account = self.store.create_user_with_account(
            &user,
            &NewAccount {
                user_id: user.id.clone(),
                account_type,
                paid_months,
            },
        )?;

        info!(user_id = %user.id, name = %user.name, %account_type, "user registered");
        Ok((user, account))
    }

    /// Starts a new current account for `actor`, superseding the previous one.
    pub fn create_account(
        &self,
        actor: &User,
        account_type: AccountType,
        paid_months: Option<i32>,
    ) -> Result<Account> {
        validate_account_terms(account_type, paid_months)?;

        let account = self.store.create_account(&NewAccount {
            user_id: actor.id.clone(),
            account_type,
            paid_months,
        })?;

        info!(user_id = %actor.id, account_type = %account_type, "account created");
        Ok(account)
    }

    pub fn current_account(&self, actor: &User) -> Result<Account> {
        self.store
            .get_current_account(&actor.id)?
            .ok_or(Error::NotFound("account"))
    }

    pub fn list_accounts(&self, actor: &User) -> Result<Vec<Account>> {
        self.store.list_accounts(&actor.id)
    }
}
