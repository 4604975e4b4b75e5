use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guildkeep_core::{AppResult, PermissionId, RoleId, UserId};
use guildkeep_domain::{Permission, Role, RoleScope, SystemRoleSeed};

/// Repository port for system and custom roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds a role by identifier.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a role by exact name inside one role scope.
    async fn find_role_by_name(&self, scope: RoleScope, name: &str) -> AppResult<Option<Role>>;

    /// Lists the roles owned by a scope in creation order.
    async fn list_roles(&self, scope: RoleScope) -> AppResult<Vec<Role>>;

    /// Inserts a new custom role.
    ///
    /// Implementations fail with `DuplicateRoleName` when the name is taken
    /// in the role's scope.
    async fn create_role(&self, role: &Role) -> AppResult<()>;

    /// Persists a changed name or description.
    async fn update_role(&self, role: &Role) -> AppResult<()>;

    /// Inserts the system role or refreshes its description and default flag.
    async fn upsert_system_role(&self, seed: &SystemRoleSeed) -> AppResult<Role>;

    /// Deletes a role with its permission grants, user bindings and cluster
    /// display settings.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;
}

/// Permission granted to a role, with grant metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionGrant {
    /// Role receiving the grant.
    pub role_id: RoleId,
    /// Granted catalog permission.
    pub permission: Permission,
    /// User that granted the permission, `None` for bootstrap grants.
    pub assigned_by: Option<UserId>,
    /// Grant timestamp.
    pub granted_at: DateTime<Utc>,
}

/// Repository port for role -> permission edges.
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    /// Adds the edge and returns whether a row was created.
    async fn grant_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        assigned_by: Option<UserId>,
    ) -> AppResult<bool>;

    /// Removes the edge and returns whether a row was removed.
    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool>;

    /// Lists the permissions granted to a role ordered by key.
    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<RolePermissionGrant>>;
}
