use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by engine use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A permission was upserted into the catalog.
    PermissionEnsured,
    /// A permission was removed from the catalog.
    PermissionDeleted,
    /// A system role template was upserted.
    SystemRoleEnsured,
    /// A custom role was created.
    RoleCreated,
    /// A custom role was renamed or described.
    RoleUpdated,
    /// A custom role was deleted with its bindings.
    RoleDeleted,
    /// A permission was granted to a role.
    RolePermissionGranted,
    /// A permission was revoked from a role.
    RolePermissionRevoked,
    /// A guild membership was created.
    MembershipCreated,
    /// A member's rank changed.
    MembershipRankChanged,
    /// A user's primary guild moved.
    MembershipPrimaryChanged,
    /// A role was bound to a user in a scope.
    RoleBound,
    /// A role was unbound from a user in a scope.
    RoleUnbound,
    /// A guild joined a cluster.
    ClusterGuildLinked,
    /// A guild left a cluster.
    ClusterGuildUnlinked,
    /// A guild's primary cluster moved to an existing link.
    ClusterPrimaryChanged,
    /// A cluster role display setting was saved.
    ClusterRoleSettingSaved,
    /// A cluster role display setting was removed.
    ClusterRoleSettingRemoved,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionEnsured => "catalog.permission.ensured",
            Self::PermissionDeleted => "catalog.permission.deleted",
            Self::SystemRoleEnsured => "role.system.ensured",
            Self::RoleCreated => "role.created",
            Self::RoleUpdated => "role.updated",
            Self::RoleDeleted => "role.deleted",
            Self::RolePermissionGranted => "role.permission.granted",
            Self::RolePermissionRevoked => "role.permission.revoked",
            Self::MembershipCreated => "membership.created",
            Self::MembershipRankChanged => "membership.rank.changed",
            Self::MembershipPrimaryChanged => "membership.primary.changed",
            Self::RoleBound => "binding.role.bound",
            Self::RoleUnbound => "binding.role.unbound",
            Self::ClusterGuildLinked => "cluster.guild.linked",
            Self::ClusterGuildUnlinked => "cluster.guild.unlinked",
            Self::ClusterPrimaryChanged => "cluster.primary.changed",
            Self::ClusterRoleSettingSaved => "cluster.role_setting.saved",
            Self::ClusterRoleSettingRemoved => "cluster.role_setting.removed",
        }
    }
}
