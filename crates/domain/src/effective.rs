//! Allow-only union of role grants.

use std::collections::{BTreeMap, BTreeSet};

use guildkeep_core::RoleId;
use serde::{Deserialize, Serialize};

use crate::permission::PermissionKey;

/// One role -> permission edge held by a principal in a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    /// Role bound to the principal.
    pub role_id: RoleId,
    /// Role name at resolution time.
    pub role_name: String,
    /// Permission granted through the role.
    pub permission_key: PermissionKey,
}

/// Role that contributed a permission to an effective set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GrantingRole {
    /// Role identifier.
    pub role_id: RoleId,
    /// Role name at resolution time.
    pub role_name: String,
}

/// Effective permissions of one principal in one scope.
///
/// Every key is annotated with the roles that granted it. The annotation is for
/// inspection only and never affects membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePermissionSet {
    grants: BTreeMap<PermissionKey, BTreeSet<GrantingRole>>,
}

impl EffectivePermissionSet {
    /// Returns an empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the union of all grants.
    pub fn from_grants(grants: impl IntoIterator<Item = RoleGrant>) -> Self {
        let mut set = Self::default();
        for grant in grants {
            set.insert(grant);
        }
        set
    }

    /// Adds one grant to the union.
    pub fn insert(&mut self, grant: RoleGrant) {
        self.grants
            .entry(grant.permission_key)
            .or_default()
            .insert(GrantingRole {
                role_id: grant.role_id,
                role_name: grant.role_name,
            });
    }

    /// Returns whether the key is granted by any role.
    #[must_use]
    pub fn contains(&self, permission_key: &str) -> bool {
        self.grants.contains_key(permission_key)
    }

    /// Returns granted keys in lexical order.
    pub fn keys(&self) -> impl Iterator<Item = &PermissionKey> {
        self.grants.keys()
    }

    /// Returns the granted keys as owned strings.
    #[must_use]
    pub fn key_set(&self) -> BTreeSet<String> {
        self.grants
            .keys()
            .map(|key| key.as_str().to_owned())
            .collect()
    }

    /// Returns the roles that granted a key.
    #[must_use]
    pub fn granted_by(&self, permission_key: &str) -> Option<&BTreeSet<GrantingRole>> {
        self.grants.get(permission_key)
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Returns whether no key is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}
