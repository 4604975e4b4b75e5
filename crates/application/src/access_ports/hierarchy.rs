use async_trait::async_trait;
use guildkeep_core::{AppResult, ClusterId, RoleId};
use guildkeep_domain::{ClusterRoleSetting, Role};

/// Repository port for the cluster role display overlay.
#[async_trait]
pub trait ClusterRoleSettingRepository: Send + Sync {
    /// Inserts or replaces the setting for `(cluster, role)`.
    async fn save_setting(&self, setting: &ClusterRoleSetting) -> AppResult<()>;

    /// Removes the setting and returns whether one existed.
    async fn remove_setting(&self, cluster_id: ClusterId, role_id: RoleId) -> AppResult<bool>;

    /// Lists the settings of a cluster.
    async fn list_settings(&self, cluster_id: ClusterId) -> AppResult<Vec<ClusterRoleSetting>>;

    /// Lists the roles present in a cluster: system roles bound to a user
    /// there or carrying a setting, plus the cluster's custom roles.
    async fn list_cluster_roles(&self, cluster_id: ClusterId) -> AppResult<Vec<Role>>;
}
