use guildkeep_application::PermissionCatalogRepository;
use guildkeep_core::AppError;
use guildkeep_domain::PermissionSeed;

use super::*;

#[async_trait]
impl PermissionCatalogRepository for InMemoryAccessStore {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        let mut permissions = state.permissions.values().cloned().collect::<Vec<_>>();
        permissions.sort_by(|left, right| {
            (left.group(), left.key()).cmp(&(right.group(), right.key()))
        });

        Ok(permissions)
    }

    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .get(&permission_id)
            .cloned())
    }

    async fn find_permission_by_key(&self, key: &str) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .values()
            .find(|permission| permission.key().as_str() == key)
            .cloned())
    }

    async fn upsert_permission(&self, seed: &PermissionSeed) -> AppResult<Permission> {
        let mut state = self.state.write().await;
        let permission_id = state
            .permissions
            .values()
            .find(|permission| permission.key() == &seed.key)
            .map(Permission::id)
            .unwrap_or_default();

        let permission = Permission::new(
            permission_id,
            seed.key.clone(),
            seed.description.clone(),
            seed.group,
        );
        state.permissions.insert(permission_id, permission.clone());

        Ok(permission)
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .grants
            .keys()
            .any(|(_, granted)| *granted == permission_id)
        {
            return Err(AppError::PermissionInUse(format!(
                "permission '{permission_id}' is still granted to at least one role"
            )));
        }

        state.permissions.remove(&permission_id);
        Ok(())
    }
}
