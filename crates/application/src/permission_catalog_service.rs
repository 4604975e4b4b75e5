use std::sync::Arc;

use guildkeep_core::{AppError, AppResult, PermissionId, UserId};
use guildkeep_domain::{AuditAction, Permission};

use crate::{AuditEvent, AuditRepository, PermissionCatalogRepository};

/// Application service for reading and pruning the permission catalog.
#[derive(Clone)]
pub struct PermissionCatalogService {
    repository: Arc<dyn PermissionCatalogRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl PermissionCatalogService {
    /// Creates a new catalog service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn PermissionCatalogRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            audit_repository,
        }
    }

    /// Lists every permission ordered by group, then key.
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let mut permissions = self.repository.list_permissions().await?;
        permissions.sort_by(|left, right| {
            left.group()
                .cmp(&right.group())
                .then_with(|| left.key().cmp(right.key()))
        });
        Ok(permissions)
    }

    /// Finds a permission by its stable key.
    pub async fn find_by_key(&self, key: &str) -> AppResult<Option<Permission>> {
        self.repository.find_permission_by_key(key).await
    }

    /// Deletes an unreferenced permission.
    ///
    /// Fails with `PermissionInUse` while any role still holds a grant for it.
    pub async fn delete_permission(
        &self,
        actor: Option<UserId>,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let permission = self
            .repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::UnknownPermission(format!("permission '{permission_id}' does not exist"))
            })?;

        self.repository.delete_permission(permission_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                scope: None,
                actor,
                action: AuditAction::PermissionDeleted,
                resource_type: "permission".to_owned(),
                resource_id: permission.key().to_string(),
                detail: Some(format!("deleted permission '{}'", permission.key())),
            })
            .await
    }
}
