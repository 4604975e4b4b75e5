//! Built-in permission catalog seeded at bootstrap.

use guildkeep_core::AppResult;

use crate::permission::{PermissionGroup, PermissionSeed};

/// Well-known permission keys.
pub mod keys {
    /// Edit guild name, description and imagery.
    pub const GUILD_EDIT_DETAILS: &str = "GUILD_EDIT_DETAILS";
    /// Change guild-wide settings such as visibility.
    pub const GUILD_MANAGE_SETTINGS: &str = "GUILD_MANAGE_SETTINGS";
    /// Delete the guild.
    pub const GUILD_DELETE: &str = "GUILD_DELETE";
    /// Invite users into the guild.
    pub const GUILD_INVITE_MEMBER: &str = "GUILD_INVITE_MEMBER";
    /// Remove a member from the guild.
    pub const GUILD_KICK_MEMBER: &str = "GUILD_KICK_MEMBER";
    /// Ban a user from the guild.
    pub const GUILD_BAN_MEMBER: &str = "GUILD_BAN_MEMBER";
    /// Approve pending membership applications.
    pub const MEMBER_APPROVE_APPLICATION: &str = "MEMBER_APPROVE_APPLICATION";
    /// Change the prestige rank of a member.
    pub const MEMBER_RANK_SET: &str = "MEMBER_RANK_SET";
    /// Create custom guild roles.
    pub const ROLE_CREATE: &str = "ROLE_CREATE";
    /// Rename custom roles and change their grants.
    pub const ROLE_EDIT: &str = "ROLE_EDIT";
    /// Delete custom roles.
    pub const ROLE_DELETE: &str = "ROLE_DELETE";
    /// Bind and unbind roles on members.
    pub const ROLE_ASSIGN: &str = "ROLE_ASSIGN";
    /// Create badge templates.
    pub const BADGE_CREATE_TEMPLATE: &str = "BADGE_CREATE_TEMPLATE";
    /// Award badges to members.
    pub const BADGE_AWARD: &str = "BADGE_AWARD";
    /// Revoke awarded badges.
    pub const BADGE_REVOKE: &str = "BADGE_REVOKE";
    /// Create, rename and delete guild categories.
    pub const CATEGORY_MANAGE: &str = "CATEGORY_MANAGE";
    /// Edit cluster name, description and imagery.
    pub const CLUSTER_EDIT_DETAILS: &str = "CLUSTER_EDIT_DETAILS";
    /// Add and remove guilds from a cluster.
    pub const CLUSTER_MANAGE_GUILDS: &str = "CLUSTER_MANAGE_GUILDS";
    /// Manage cluster roles and their display hierarchy.
    pub const CLUSTER_MANAGE_ROLES: &str = "CLUSTER_MANAGE_ROLES";
    /// Bind cluster roles to users.
    pub const CLUSTER_ASSIGN_ROLE: &str = "CLUSTER_ASSIGN_ROLE";
    /// Edit the permission catalog and system role grants.
    pub const SYSTEM_MANAGE_PERMISSIONS: &str = "SYSTEM_MANAGE_PERMISSIONS";
    /// Suspend and restore platform users.
    pub const SYSTEM_MANAGE_USERS: &str = "SYSTEM_MANAGE_USERS";
}

const BUILTIN: &[(&str, &str, PermissionGroup)] = &[
    (
        keys::GUILD_EDIT_DETAILS,
        "Edit guild name, description and imagery",
        PermissionGroup::GuildManagement,
    ),
    (
        keys::GUILD_MANAGE_SETTINGS,
        "Change guild-wide settings",
        PermissionGroup::GuildManagement,
    ),
    (
        keys::GUILD_DELETE,
        "Delete the guild",
        PermissionGroup::GuildManagement,
    ),
    (
        keys::GUILD_INVITE_MEMBER,
        "Invite users into the guild",
        PermissionGroup::MemberManagement,
    ),
    (
        keys::GUILD_KICK_MEMBER,
        "Remove members from the guild",
        PermissionGroup::MemberManagement,
    ),
    (
        keys::GUILD_BAN_MEMBER,
        "Ban users from the guild",
        PermissionGroup::MemberManagement,
    ),
    (
        keys::MEMBER_APPROVE_APPLICATION,
        "Approve pending membership applications",
        PermissionGroup::MemberManagement,
    ),
    (
        keys::MEMBER_RANK_SET,
        "Change the rank of a guild member",
        PermissionGroup::RoleManagement,
    ),
    (
        keys::ROLE_CREATE,
        "Create custom roles",
        PermissionGroup::RoleManagement,
    ),
    (
        keys::ROLE_EDIT,
        "Edit custom roles and their grants",
        PermissionGroup::RoleManagement,
    ),
    (
        keys::ROLE_DELETE,
        "Delete custom roles",
        PermissionGroup::RoleManagement,
    ),
    (
        keys::ROLE_ASSIGN,
        "Bind roles to members",
        PermissionGroup::RoleManagement,
    ),
    (
        keys::BADGE_CREATE_TEMPLATE,
        "Create badge templates",
        PermissionGroup::BadgeManagement,
    ),
    (
        keys::BADGE_AWARD,
        "Award badges to members",
        PermissionGroup::BadgeManagement,
    ),
    (
        keys::BADGE_REVOKE,
        "Revoke awarded badges",
        PermissionGroup::BadgeManagement,
    ),
    (
        keys::CATEGORY_MANAGE,
        "Manage guild categories",
        PermissionGroup::CategoryManagement,
    ),
    (
        keys::CLUSTER_EDIT_DETAILS,
        "Edit cluster name, description and imagery",
        PermissionGroup::ClusterManagement,
    ),
    (
        keys::CLUSTER_MANAGE_GUILDS,
        "Add and remove guilds from the cluster",
        PermissionGroup::ClusterManagement,
    ),
    (
        keys::CLUSTER_MANAGE_ROLES,
        "Manage cluster roles and their hierarchy",
        PermissionGroup::ClusterManagement,
    ),
    (
        keys::CLUSTER_ASSIGN_ROLE,
        "Bind cluster roles to users",
        PermissionGroup::ClusterManagement,
    ),
    (
        keys::SYSTEM_MANAGE_PERMISSIONS,
        "Edit the permission catalog and system role grants",
        PermissionGroup::SystemAdministration,
    ),
    (
        keys::SYSTEM_MANAGE_USERS,
        "Suspend and restore platform users",
        PermissionGroup::SystemAdministration,
    ),
];

/// Returns the platform's built-in permission catalog.
pub fn builtin_permissions() -> AppResult<Vec<PermissionSeed>> {
    BUILTIN
        .iter()
        .map(|(key, description, group)| PermissionSeed::new(*key, *description, *group))
        .collect()
}
