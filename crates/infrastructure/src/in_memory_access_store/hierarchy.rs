use guildkeep_application::ClusterRoleSettingRepository;
use guildkeep_domain::RoleScope;

use super::*;

#[async_trait]
impl ClusterRoleSettingRepository for InMemoryAccessStore {
    async fn save_setting(&self, setting: &ClusterRoleSetting) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.ensure_assigner_known(setting.assigned_by())?;
        state
            .settings
            .insert((setting.cluster_id(), setting.role_id()), setting.clone());
        Ok(())
    }

    async fn remove_setting(&self, cluster_id: ClusterId, role_id: RoleId) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .settings
            .remove(&(cluster_id, role_id))
            .is_some())
    }

    async fn list_settings(&self, cluster_id: ClusterId) -> AppResult<Vec<ClusterRoleSetting>> {
        let state = self.state.read().await;
        let mut settings = state
            .settings
            .values()
            .filter(|setting| setting.cluster_id() == cluster_id)
            .cloned()
            .collect::<Vec<_>>();
        settings.sort_by_key(|setting| (setting.hierarchy_order(), setting.display_sequence()));

        Ok(settings)
    }

    async fn list_cluster_roles(&self, cluster_id: ClusterId) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let present_in_cluster = |role_id: RoleId| {
            state
                .cluster_bindings
                .iter()
                .any(|(_, bound_cluster, bound)| *bound_cluster == cluster_id && *bound == role_id)
                || state.settings.contains_key(&(cluster_id, role_id))
        };

        Ok(AccessState::sorted_roles(state.roles.values().filter(
            |role| match role.scope() {
                RoleScope::Cluster(owner) => owner == cluster_id,
                RoleScope::Guild(_) => false,
                RoleScope::System => present_in_cluster(role.id()),
            },
        )))
    }
}
