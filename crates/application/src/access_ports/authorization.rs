use async_trait::async_trait;
use guildkeep_core::{AppResult, UserId};
use guildkeep_domain::{Role, RoleGrant, Scope};

/// Read port used by the permission resolver.
///
/// Absent memberships, users or scopes yield empty results, never errors.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists every role -> permission edge reachable from the user's
    /// bindings in the scope.
    async fn list_role_grants(&self, user_id: UserId, scope: Scope) -> AppResult<Vec<RoleGrant>>;

    /// Lists the roles bound to the user in the scope.
    async fn list_bound_roles(&self, user_id: UserId, scope: Scope) -> AppResult<Vec<Role>>;
}
