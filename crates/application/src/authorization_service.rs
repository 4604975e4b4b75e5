use std::sync::Arc;

use guildkeep_core::{AppError, AppResult, UserId};
use guildkeep_domain::{EffectivePermissionSet, Role, Scope};

use crate::AuthorizationRepository;

/// Resolves effective permissions as the union of every role bound to a
/// user in one guild or cluster.
///
/// Guild and cluster scopes are resolved independently. Unknown users or
/// scopes resolve to the empty set.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Returns the effective permission set, each key annotated with the
    /// roles that granted it.
    pub async fn list_effective_permissions(
        &self,
        user_id: UserId,
        scope: Scope,
    ) -> AppResult<EffectivePermissionSet> {
        let grants = self.repository.list_role_grants(user_id, scope).await?;
        Ok(EffectivePermissionSet::from_grants(grants))
    }

    /// Returns whether the user currently has the permission in the scope.
    pub async fn has_permission(
        &self,
        user_id: UserId,
        scope: Scope,
        permission_key: &str,
    ) -> AppResult<bool> {
        let grants = self.repository.list_role_grants(user_id, scope).await?;
        Ok(grants
            .iter()
            .any(|grant| grant.permission_key.as_str() == permission_key))
    }

    /// Ensures the user has the permission in the scope.
    pub async fn require_permission(
        &self,
        user_id: UserId,
        scope: Scope,
        permission_key: &str,
    ) -> AppResult<()> {
        if self.has_permission(user_id, scope, permission_key).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' is missing permission '{permission_key}' in {scope}"
        )))
    }

    /// Lists the roles bound to the user in the scope.
    pub async fn list_bound_roles(&self, user_id: UserId, scope: Scope) -> AppResult<Vec<Role>> {
        self.repository.list_bound_roles(user_id, scope).await
    }
}
