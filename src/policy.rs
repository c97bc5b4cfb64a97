//! Per-repo role checks.
//!
//! A user may act on a repo when any of their access rows carries a role in
//! the required [`RoleSet`]. Nothing here mutates state.

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Role, RoleSet};

/// Returns true if any held role is in `required`. An empty set is never satisfied.
#[must_use]
pub fn roles_satisfy(held: &[Role], required: RoleSet) -> bool {
    held.iter().any(|role| required.contains(*role))
}

/// Returns true if the user holds a role in `required` on the repo.
/// Missing access is `Ok(false)`; only store failures are errors.
pub fn has_access(
    store: &dyn Store,
    user_id: &str,
    repo_id: i64,
    required: RoleSet,
) -> Result<bool> {
    if required.is_empty() {
        return Ok(false);
    }

    let held = store.list_user_roles(user_id, repo_id)?;
    Ok(roles_satisfy(&held, required))
}

/// Check repo access, returning [`Error::AccessDenied`] if not held.
pub fn require_access(
    store: &dyn Store,
    user_id: &str,
    repo_id: i64,
    required: RoleSet,
) -> Result<()> {
    if !has_access(store, user_id, repo_id, required)? {
        tracing::debug!(user_id, repo_id, %required, "repo access denied");
        return Err(Error::AccessDenied);
    }
    Ok(())
}
