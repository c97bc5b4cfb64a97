use std::fmt;

use serde::{Deserialize, Serialize};

/// A user's role on a single repo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Admin,
    Viewer,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Admin => "ADMIN",
            Role::Viewer => "VIEWER",
        }
    }

    /// Parses a role name, case-insensitively.
    pub fn parse(s: &str) -> Option<Role> {
        match s.to_ascii_uppercase().as_str() {
            "OWNER" => Some(Role::Owner),
            "ADMIN" => Some(Role::Admin),
            "VIEWER" => Some(Role::Viewer),
            _ => None,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Role::Owner => 1 << 0,
            Role::Admin => 1 << 1,
            Role::Viewer => 1 << 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable set of roles, any one of which satisfies a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);
    /// Any role at all: reads.
    pub const ANY: RoleSet = RoleSet(Role::Owner.bit() | Role::Admin.bit() | Role::Viewer.bit());
    /// Roles allowed to mutate boxes, media and grants.
    pub const MANAGE: RoleSet = RoleSet(Role::Owner.bit() | Role::Admin.bit());
    pub const OWNER: RoleSet = RoleSet(Role::Owner.bit());

    #[must_use]
    pub const fn of(role: Role) -> RoleSet {
        RoleSet(role.bit())
    }

    #[must_use]
    pub const fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    #[must_use]
    pub const fn with(self, role: Role) -> RoleSet {
        RoleSet(self.0 | role.bit())
    }

    #[must_use]
    pub const fn union(self, other: RoleSet) -> RoleSet {
        RoleSet(self.0 | other.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn roles(self) -> Vec<Role> {
        [Role::Owner, Role::Admin, Role::Viewer]
            .into_iter()
            .filter(|r| self.contains(*r))
            .collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(RoleSet::EMPTY, RoleSet::with)
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.roles().into_iter().map(Role::as_str).collect();
        write!(f, "{}", names.join(", "))
    }
}
