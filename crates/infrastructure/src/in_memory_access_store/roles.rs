use guildkeep_application::{RolePermissionGrant, RolePermissionRepository, RoleRepository};
use guildkeep_core::AppError;
use guildkeep_domain::{RoleScope, SystemRoleSeed};

use super::*;

impl AccessState {
    fn name_taken(&self, candidate: &Role) -> bool {
        self.roles.values().any(|existing| {
            existing.id() != candidate.id()
                && existing.scope() == candidate.scope()
                && existing.name() == candidate.name()
        })
    }
}

fn duplicate_name(role: &Role) -> AppError {
    AppError::DuplicateRoleName(format!(
        "role '{}' already exists in {}",
        role.name(),
        role.scope()
    ))
}

#[async_trait]
impl RoleRepository for InMemoryAccessStore {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn find_role_by_name(&self, scope: RoleScope, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .values()
            .find(|role| role.scope() == scope && role.name().as_str() == name)
            .cloned())
    }

    async fn list_roles(&self, scope: RoleScope) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        Ok(AccessState::sorted_roles(
            state.roles.values().filter(|role| role.scope() == scope),
        ))
    }

    async fn create_role(&self, role: &Role) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.name_taken(role) {
            return Err(duplicate_name(role));
        }

        state.roles.insert(role.id(), role.clone());
        Ok(())
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let mut state = self.state.write().await;
        let Some(stored) = state
            .roles
            .get(&role.id())
            .filter(|stored| !stored.is_system_role())
        else {
            return Err(AppError::UnknownRole(format!(
                "custom role '{}' does not exist",
                role.id()
            )));
        };
        let created_at = stored.created_at();

        if state.name_taken(role) {
            return Err(duplicate_name(role));
        }

        let updated = Role::new(
            role.id(),
            role.name().as_str(),
            role.description().map(str::to_owned),
            role.scope(),
            role.is_default_role(),
            created_at,
        )?;
        state.roles.insert(role.id(), updated);
        Ok(())
    }

    async fn upsert_system_role(&self, seed: &SystemRoleSeed) -> AppResult<Role> {
        let mut state = self.state.write().await;
        let (role_id, created_at) = state
            .roles
            .values()
            .find(|role| role.is_system_role() && role.name() == &seed.name)
            .map_or_else(
                || (RoleId::new(), Utc::now()),
                |role| (role.id(), role.created_at()),
            );

        let role = Role::new(
            role_id,
            seed.name.as_str(),
            seed.description.clone(),
            RoleScope::System,
            seed.is_default,
            created_at,
        )?;
        state.roles.insert(role_id, role.clone());

        Ok(role)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.roles.remove(&role_id);
        state.grants.retain(|(granted_to, _), _| *granted_to != role_id);
        state.guild_bindings.retain(|(_, bound)| *bound != role_id);
        state
            .cluster_bindings
            .retain(|(_, _, bound)| *bound != role_id);
        state.settings.retain(|(_, configured), _| *configured != role_id);
        Ok(())
    }
}

#[async_trait]
impl RolePermissionRepository for InMemoryAccessStore {
    async fn grant_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        assigned_by: Option<UserId>,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role_id) || !state.permissions.contains_key(&permission_id) {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' or permission '{permission_id}' no longer exists"
            )));
        }
        state.ensure_assigner_known(assigned_by)?;

        if state.grants.contains_key(&(role_id, permission_id)) {
            return Ok(false);
        }

        state.grants.insert(
            (role_id, permission_id),
            GrantRecord {
                assigned_by,
                granted_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .grants
            .remove(&(role_id, permission_id))
            .is_some())
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<RolePermissionGrant>> {
        let state = self.state.read().await;
        let mut grants = state
            .grants
            .iter()
            .filter(|((granted_to, _), _)| *granted_to == role_id)
            .filter_map(|((_, permission_id), record)| {
                state
                    .permissions
                    .get(permission_id)
                    .map(|permission| RolePermissionGrant {
                        role_id,
                        permission: permission.clone(),
                        assigned_by: record.assigned_by,
                        granted_at: record.granted_at,
                    })
            })
            .collect::<Vec<_>>();
        grants.sort_by(|left, right| left.permission.key().cmp(right.permission.key()));

        Ok(grants)
    }
}
