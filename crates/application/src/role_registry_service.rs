use std::sync::Arc;

use chrono::Utc;
use guildkeep_core::{AppError, AppResult, PermissionId, RoleId, UserId};
use guildkeep_domain::{AuditAction, Permission, Role, RoleScope, Scope};
use serde_json::json;
use tracing::info;

use crate::scope_checks::{ensure_actor_exists, ensure_scope_exists, require_role};
use crate::{
    AuditEvent, AuditRepository, PermissionCatalogRepository, RolePermissionGrant,
    RolePermissionRepository, RoleRepository, ScopeDirectory,
};

/// Application service for custom role administration and role grants.
#[derive(Clone)]
pub struct RoleRegistryService {
    roles: Arc<dyn RoleRepository>,
    catalog: Arc<dyn PermissionCatalogRepository>,
    grants: Arc<dyn RolePermissionRepository>,
    directory: Arc<dyn ScopeDirectory>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleRegistryService {
    /// Creates a new role registry service.
    #[must_use]
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        catalog: Arc<dyn PermissionCatalogRepository>,
        grants: Arc<dyn RolePermissionRepository>,
        directory: Arc<dyn ScopeDirectory>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            roles,
            catalog,
            grants,
            directory,
            audit_repository,
        }
    }

    /// Creates a custom role owned by a guild or a cluster.
    pub async fn create_custom_role(
        &self,
        actor: Option<UserId>,
        scope: Scope,
        name: &str,
        description: Option<String>,
    ) -> AppResult<Role> {
        ensure_scope_exists(self.directory.as_ref(), scope).await?;

        let role = Role::new(
            RoleId::new(),
            name,
            description,
            RoleScope::from(scope),
            false,
            Utc::now(),
        )?;
        self.ensure_name_available(&role).await?;
        self.roles.create_role(&role).await?;

        self.audit_repository
            .append_event(AuditEvent {
                scope: Some(scope),
                actor,
                action: AuditAction::RoleCreated,
                resource_type: "role".to_owned(),
                resource_id: role.id().to_string(),
                detail: Some(format!("created role '{}' in {scope}", role.name())),
            })
            .await?;

        Ok(role)
    }

    /// Renames or re-describes a custom role.
    ///
    /// `description` distinguishes "leave unchanged" (`None`) from "clear"
    /// (`Some(None)`).
    pub async fn update_role_details(
        &self,
        actor: Option<UserId>,
        role_id: RoleId,
        name: Option<String>,
        description: Option<Option<String>>,
    ) -> AppResult<Role> {
        let role = require_role(self.roles.as_ref(), role_id).await?;
        let updated = role.with_details(name, description)?;
        if updated.name() != role.name() {
            self.ensure_name_available(&updated).await?;
        }

        self.roles.update_role(&updated).await?;

        self.audit_repository
            .append_event(AuditEvent {
                scope: updated.scope().owner(),
                actor,
                action: AuditAction::RoleUpdated,
                resource_type: "role".to_owned(),
                resource_id: role_id.to_string(),
                detail: Some(
                    json!({
                        "previous_name": role.name().as_str(),
                        "name": updated.name().as_str(),
                        "description": updated.description(),
                    })
                    .to_string(),
                ),
            })
            .await?;

        Ok(updated)
    }

    /// Deletes a custom role with its grants, bindings and display settings.
    pub async fn delete_custom_role(
        &self,
        actor: Option<UserId>,
        role_id: RoleId,
    ) -> AppResult<()> {
        let role = require_role(self.roles.as_ref(), role_id).await?;
        if role.is_system_role() {
            return Err(AppError::SystemRoleImmutable(format!(
                "system role '{}' cannot be deleted",
                role.name()
            )));
        }

        self.roles.delete_role(role_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                scope: role.scope().owner(),
                actor,
                action: AuditAction::RoleDeleted,
                resource_type: "role".to_owned(),
                resource_id: role_id.to_string(),
                detail: Some(format!("deleted role '{}'", role.name())),
            })
            .await
    }

    /// Finds a role by identifier.
    pub async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.roles.find_role(role_id).await
    }

    /// Lists the system roles or the custom roles of one guild or cluster.
    pub async fn list_roles(&self, scope: RoleScope) -> AppResult<Vec<Role>> {
        self.roles.list_roles(scope).await
    }

    /// Grants a permission to a role and returns whether a grant was created.
    ///
    /// Grants on system roles take effect in every guild and cluster that
    /// binds the role.
    pub async fn grant_permission(
        &self,
        actor: Option<UserId>,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let role = require_role(self.roles.as_ref(), role_id).await?;
        let permission = self.require_permission(permission_id).await?;
        ensure_actor_exists(self.directory.as_ref(), actor).await?;

        let created = self
            .grants
            .grant_permission(role_id, permission_id, actor)
            .await?;
        if !created {
            return Ok(false);
        }

        if role.is_system_role() {
            info!(
                role = %role.name(),
                permission = %permission.key(),
                "granted permission to system role in every scope that binds it"
            );
        }

        self.audit_repository
            .append_event(AuditEvent {
                scope: role.scope().owner(),
                actor,
                action: AuditAction::RolePermissionGranted,
                resource_type: "role_permission".to_owned(),
                resource_id: format!("{role_id}:{permission_id}"),
                detail: Some(format!(
                    "granted '{}' to role '{}'",
                    permission.key(),
                    role.name()
                )),
            })
            .await?;

        Ok(true)
    }

    /// Revokes a permission from a role and returns whether a grant existed.
    pub async fn revoke_permission(
        &self,
        actor: Option<UserId>,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let role = require_role(self.roles.as_ref(), role_id).await?;
        let permission = self.require_permission(permission_id).await?;

        let removed = self.grants.revoke_permission(role_id, permission_id).await?;
        if !removed {
            return Ok(false);
        }

        if role.is_system_role() {
            info!(
                role = %role.name(),
                permission = %permission.key(),
                "revoked permission from system role in every scope that binds it"
            );
        }

        self.audit_repository
            .append_event(AuditEvent {
                scope: role.scope().owner(),
                actor,
                action: AuditAction::RolePermissionRevoked,
                resource_type: "role_permission".to_owned(),
                resource_id: format!("{role_id}:{permission_id}"),
                detail: Some(format!(
                    "revoked '{}' from role '{}'",
                    permission.key(),
                    role.name()
                )),
            })
            .await?;

        Ok(true)
    }

    /// Lists the permissions granted to a role.
    pub async fn list_role_permissions(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<RolePermissionGrant>> {
        require_role(self.roles.as_ref(), role_id).await?;
        self.grants.list_role_permissions(role_id).await
    }

    async fn ensure_name_available(&self, role: &Role) -> AppResult<()> {
        let existing = self
            .roles
            .find_role_by_name(role.scope(), role.name().as_str())
            .await?;

        match existing {
            Some(existing) if existing.id() != role.id() => Err(AppError::DuplicateRoleName(
                format!("role '{}' already exists in {}", role.name(), role.scope()),
            )),
            _ => Ok(()),
        }
    }

    async fn require_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        self.catalog
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::UnknownPermission(format!("permission '{permission_id}' does not exist"))
            })
    }
}
