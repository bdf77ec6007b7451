// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use std::collections::BTreeSet;

use serde::{Serialize, Serializer};
use utoipa::ToSchema;

/// Roles that satisfy the tenant-admin predicate.
pub const TENANT_ADMIN_ROLES: &[Role] = &[Role::Owner, Role::Admin];

/// Roles that satisfy the super-admin predicate.
pub const SUPER_ADMIN_ROLES: &[Role] = &[Role::SuperAdmin];

/// Roles understood by the gate.
///
/// ## Namespaces
///
/// - `SuperAdmin` - platform operator, not scoped to any tenant
/// - `Owner`, `Admin` - tenant administrators
/// - `Manager`, `Member` - regular tenant users
///
/// There is no hierarchy between namespaces: a super-admin is not implicitly
/// a tenant admin and the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform-wide administrator
    SuperAdmin,
    /// Tenant owner
    Owner,
    /// Tenant administrator
    Admin,
    /// Tenant manager
    Manager,
    /// Regular tenant user
    Member,
}

impl Role {
    /// Decode a role from its wire spelling.
    ///
    /// Issued tokens have used both upper and lower snake case for the same
    /// role (`SUPER_ADMIN` / `super_admin`); both decode to one variant here.
    /// Matching is exact: any other spelling is unknown, yields `None` and is
    /// dropped by the caller.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "SUPER_ADMIN" | "super_admin" => Some(Role::SuperAdmin),
            "OWNER" | "owner" => Some(Role::Owner),
            "ADMIN" | "admin" => Some(Role::Admin),
            "MANAGER" | "manager" => Some(Role::Manager),
            "MEMBER" | "member" | "USER" | "user" => Some(Role::Member),
            _ => None,
        }
    }

    /// Canonical wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Member => "member",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unordered set of roles attached to a [`Claims`](super::Claims) value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode raw role strings, dropping the ones the gate does not know.
    pub fn from_raw<'a>(raw: impl IntoIterator<Item = &'a str>) -> Self {
        let mut roles = BTreeSet::new();
        for value in raw {
            match Role::parse(value) {
                Some(role) => {
                    roles.insert(role);
                }
                None => tracing::debug!(role = value, "ignoring unknown role claim"),
            }
        }
        Self(roles)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// True when at least one role of the allow-list is present.
    pub fn intersects(&self, allow_list: &[Role]) -> bool {
        allow_list.iter().any(|role| self.0.contains(role))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_both_super_admin_spellings() {
        assert_eq!(Role::parse("SUPER_ADMIN"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("super_admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("unknown"), None);
    }

    #[test]
    fn parse_does_not_fold_case() {
        assert_eq!(Role::parse("SuperAdmin"), None);
        assert_eq!(Role::parse("superadmin"), None);
        assert_eq!(Role::parse("sUpEr_AdMiN"), None);
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
    }

    #[test]
    fn near_miss_super_admin_spellings_are_dropped() {
        let roles = RoleSet::from_raw(["SuperAdmin", "superadmin", "member"]);
        assert!(!roles.intersects(SUPER_ADMIN_ROLES));
        assert_eq!(roles.len(), 1);
        assert!(roles.contains(Role::Member));
    }

    #[test]
    fn from_raw_drops_unknown_roles() {
        let roles = RoleSet::from_raw(["owner", "janitor", "OWNER"]);
        assert_eq!(roles.len(), 1);
        assert!(roles.contains(Role::Owner));
    }

    #[test]
    fn allow_lists_do_not_overlap() {
        for role in SUPER_ADMIN_ROLES {
            assert!(!TENANT_ADMIN_ROLES.contains(role));
        }
    }

    #[test]
    fn super_admin_is_not_a_tenant_admin() {
        let roles: RoleSet = [Role::SuperAdmin].into_iter().collect();
        assert!(roles.intersects(SUPER_ADMIN_ROLES));
        assert!(!roles.intersects(TENANT_ADMIN_ROLES));
    }

    #[test]
    fn serializes_canonical_names() {
        let roles: RoleSet = [Role::Admin, Role::SuperAdmin].into_iter().collect();
        let json = serde_json::to_string(&roles).unwrap();
        assert_eq!(json, r#"["super_admin","admin"]"#);
    }
}
