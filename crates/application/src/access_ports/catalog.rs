use async_trait::async_trait;
use guildkeep_core::{AppResult, PermissionId};
use guildkeep_domain::{Permission, PermissionSeed};

/// Repository port for the permission catalog.
#[async_trait]
pub trait PermissionCatalogRepository: Send + Sync {
    /// Lists every catalog permission.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Finds a permission by identifier.
    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>>;

    /// Finds a permission by its stable key.
    async fn find_permission_by_key(&self, key: &str) -> AppResult<Option<Permission>>;

    /// Inserts the permission or refreshes its description and group.
    async fn upsert_permission(&self, seed: &PermissionSeed) -> AppResult<Permission>;

    /// Deletes a permission.
    ///
    /// Implementations fail with `PermissionInUse` while any role grant still
    /// references the permission.
    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()>;
}
