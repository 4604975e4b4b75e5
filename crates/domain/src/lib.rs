//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod bootstrap;
pub mod catalog;
mod effective;
mod hierarchy;
mod membership;
mod permission;
mod role;
mod scope;

pub use audit::AuditAction;
pub use bootstrap::{BootstrapPlan, RoleGrantSeed, RoleReference, SystemRoleSeed, system_roles};
pub use catalog::builtin_permissions;
pub use effective::{EffectivePermissionSet, GrantingRole, RoleGrant};
pub use hierarchy::{ClusterRoleEntry, ClusterRoleSetting, DisplayColor, order_cluster_roles};
pub use membership::{ClusterMembership, GuildMembership, Rank};
pub use permission::{Permission, PermissionGroup, PermissionKey, PermissionSeed};
pub use role::{
    ROLE_NAME_MAX_LENGTH, Role, RoleScope, RoleScopeKind, normalize_description,
    validate_role_name,
};
pub use scope::{ClusterScopeBinding, GuildScopeBinding, Scope, ScopeBinding, ScopeKind};
