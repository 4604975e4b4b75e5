//! Declarative bootstrap data for the permission catalog and system roles.

use std::collections::BTreeSet;

use guildkeep_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::catalog::{builtin_permissions, keys};
use crate::permission::{PermissionGroup, PermissionKey, PermissionSeed};
use crate::role::{normalize_description, validate_role_name};

/// Names of the platform's system role templates.
///
/// Every place that creates, grants to or binds a system role goes through
/// these constants so the names cannot drift apart.
pub mod system_roles {
    /// Top-level guild role held by the guild's creator.
    pub const FOUNDER: &str = "FOUNDER";
    /// Guild administrators.
    pub const ADMIN: &str = "ADMIN";
    /// Guild moderators.
    pub const MODERATOR: &str = "MODERATOR";
    /// Default role of every guild member.
    pub const MEMBER: &str = "MEMBER";
    /// Cluster administrators.
    pub const CLUSTER_ADMIN: &str = "CLUSTER_ADMIN";
    /// Default role of users participating in a cluster.
    pub const CLUSTER_MEMBER: &str = "CLUSTER_MEMBER";
}

/// Bootstrap payload for one system role template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRoleSeed {
    /// Role name, the lookup key for every later reference.
    pub name: NonEmptyString,
    /// Human-readable description, trimmed with blanks stored as `None`.
    pub description: Option<String>,
    /// Whether new members receive the role by default.
    pub is_default: bool,
}

impl SystemRoleSeed {
    /// Creates a validated system role seed.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        is_default: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            name: validate_role_name(name)?,
            description: normalize_description(Some(description.into())),
            is_default,
        })
    }
}

/// Permissions granted to a system role, looked up by role name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrantSeed {
    /// Name used to look up the system role.
    pub role_name: String,
    /// Keys granted to the role.
    pub permission_keys: Vec<PermissionKey>,
}

/// Role name looked up by another seeding step, such as membership seeding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleReference {
    /// Name used for the lookup.
    pub role_name: String,
    /// Where the lookup happens, for diagnostics.
    pub context: String,
}

/// Complete bootstrap data set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapPlan {
    permissions: Vec<PermissionSeed>,
    system_roles: Vec<SystemRoleSeed>,
    grants: Vec<RoleGrantSeed>,
    role_references: Vec<RoleReference>,
}

impl BootstrapPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog permission.
    #[must_use]
    pub fn with_permission(mut self, seed: PermissionSeed) -> Self {
        self.permissions.push(seed);
        self
    }

    /// Adds a system role template.
    #[must_use]
    pub fn with_system_role(mut self, seed: SystemRoleSeed) -> Self {
        self.system_roles.push(seed);
        self
    }

    /// Adds grants for a role looked up by name.
    pub fn with_grants(
        mut self,
        role_name: impl Into<String>,
        permission_keys: &[&str],
    ) -> AppResult<Self> {
        let permission_keys = permission_keys
            .iter()
            .map(|key| PermissionKey::new(*key))
            .collect::<AppResult<Vec<_>>>()?;
        self.grants.push(RoleGrantSeed {
            role_name: role_name.into(),
            permission_keys,
        });
        Ok(self)
    }

    /// Records a role name that another seeding step looks up.
    #[must_use]
    pub fn with_role_reference(
        mut self,
        role_name: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        self.role_references.push(RoleReference {
            role_name: role_name.into(),
            context: context.into(),
        });
        self
    }

    /// Returns the catalog permissions.
    #[must_use]
    pub fn permissions(&self) -> &[PermissionSeed] {
        &self.permissions
    }

    /// Returns the system role templates.
    #[must_use]
    pub fn system_roles(&self) -> &[SystemRoleSeed] {
        &self.system_roles
    }

    /// Returns the name-keyed grants.
    #[must_use]
    pub fn grants(&self) -> &[RoleGrantSeed] {
        &self.grants
    }

    /// Returns the additional role name lookups.
    #[must_use]
    pub fn role_references(&self) -> &[RoleReference] {
        &self.role_references
    }

    /// Returns every role name looked up by grants or references.
    #[must_use]
    pub fn referenced_role_names(&self) -> BTreeSet<String> {
        self.grants
            .iter()
            .map(|grant| grant.role_name.clone())
            .chain(
                self.role_references
                    .iter()
                    .map(|reference| reference.role_name.clone()),
            )
            .collect()
    }

    /// Checks that every lookup resolves inside the plan.
    ///
    /// Role names must match exactly; a lookup that would silently produce a
    /// permission-less role fails with [`AppError::UnresolvedRoleReference`].
    pub fn validate(&self) -> AppResult<()> {
        let mut declared_roles = BTreeSet::new();
        for seed in &self.system_roles {
            if !declared_roles.insert(seed.name.as_str().to_owned()) {
                return Err(AppError::Validation(format!(
                    "system role '{}' is declared more than once",
                    seed.name
                )));
            }
        }

        let unresolved = self
            .referenced_role_names()
            .into_iter()
            .filter(|name| !declared_roles.contains(name))
            .collect::<Vec<_>>();
        if !unresolved.is_empty() {
            return Err(AppError::UnresolvedRoleReference(unresolved));
        }

        let declared_keys = self
            .permissions
            .iter()
            .map(|seed| seed.key.as_str())
            .collect::<BTreeSet<_>>();
        let unknown_keys = self
            .grants
            .iter()
            .flat_map(|grant| grant.permission_keys.iter())
            .filter(|key| !declared_keys.contains(key.as_str()))
            .map(|key| key.as_str().to_owned())
            .collect::<BTreeSet<_>>();
        if !unknown_keys.is_empty() {
            return Err(AppError::UnknownPermission(format!(
                "bootstrap grants reference undeclared keys: {}",
                unknown_keys.into_iter().collect::<Vec<_>>().join(", ")
            )));
        }

        Ok(())
    }

    /// Returns the platform's standard bootstrap data.
    pub fn standard() -> AppResult<Self> {
        let mut plan = Self::new();
        for seed in builtin_permissions()? {
            plan = plan.with_permission(seed);
        }

        let guild_keys = builtin_permissions()?
            .into_iter()
            .filter(|seed| {
                !matches!(
                    seed.group,
                    PermissionGroup::ClusterManagement | PermissionGroup::SystemAdministration
                )
            })
            .map(|seed| String::from(seed.key))
            .collect::<Vec<_>>();
        let guild_keys = guild_keys.iter().map(String::as_str).collect::<Vec<_>>();

        plan.with_system_role(SystemRoleSeed::new(
            system_roles::FOUNDER,
            "Guild creator with every guild permission",
            false,
        )?)
        .with_system_role(SystemRoleSeed::new(
            system_roles::ADMIN,
            "Guild administrator",
            false,
        )?)
        .with_system_role(SystemRoleSeed::new(
            system_roles::MODERATOR,
            "Guild moderator",
            false,
        )?)
        .with_system_role(SystemRoleSeed::new(
            system_roles::MEMBER,
            "Default guild member",
            true,
        )?)
        .with_system_role(SystemRoleSeed::new(
            system_roles::CLUSTER_ADMIN,
            "Cluster administrator",
            false,
        )?)
        .with_system_role(SystemRoleSeed::new(
            system_roles::CLUSTER_MEMBER,
            "Default cluster participant",
            false,
        )?)
        .with_grants(system_roles::FOUNDER, &guild_keys)?
        .with_grants(
            system_roles::ADMIN,
            &[
                keys::GUILD_EDIT_DETAILS,
                keys::GUILD_MANAGE_SETTINGS,
                keys::GUILD_INVITE_MEMBER,
                keys::GUILD_KICK_MEMBER,
                keys::GUILD_BAN_MEMBER,
                keys::MEMBER_APPROVE_APPLICATION,
                keys::MEMBER_RANK_SET,
                keys::ROLE_CREATE,
                keys::ROLE_EDIT,
                keys::ROLE_DELETE,
                keys::ROLE_ASSIGN,
                keys::BADGE_CREATE_TEMPLATE,
                keys::BADGE_AWARD,
                keys::BADGE_REVOKE,
                keys::CATEGORY_MANAGE,
            ],
        )?
        .with_grants(
            system_roles::MODERATOR,
            &[
                keys::GUILD_INVITE_MEMBER,
                keys::GUILD_KICK_MEMBER,
                keys::MEMBER_APPROVE_APPLICATION,
                keys::BADGE_AWARD,
            ],
        )?
        .with_grants(
            system_roles::CLUSTER_ADMIN,
            &[
                keys::CLUSTER_EDIT_DETAILS,
                keys::CLUSTER_MANAGE_GUILDS,
                keys::CLUSTER_MANAGE_ROLES,
                keys::CLUSTER_ASSIGN_ROLE,
            ],
        )
        .map(|plan| {
            plan.with_role_reference(system_roles::FOUNDER, "guild creator membership")
                .with_role_reference(system_roles::MEMBER, "default guild membership")
                .with_role_reference(system_roles::CLUSTER_ADMIN, "cluster creator binding")
        })
    }
}
