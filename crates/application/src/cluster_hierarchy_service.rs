use std::sync::Arc;

use guildkeep_core::{AppError, AppResult, ClusterId, RoleId, UserId};
use guildkeep_domain::{
    AuditAction, ClusterRoleEntry, ClusterRoleSetting, Scope, order_cluster_roles,
};

use crate::scope_checks::{ensure_actor_exists, ensure_scope_exists, require_role};
use crate::{
    AuditEvent, AuditRepository, ClusterRoleSettingRepository, RoleRepository, ScopeDirectory,
};

/// Input payload for saving a cluster role display setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterRoleSettingInput {
    /// Seniority position, lower is more senior.
    pub hierarchy_order: i32,
    /// Secondary display position among equal hierarchy orders.
    pub display_sequence: i32,
    /// Cluster-local display name.
    pub override_name: Option<String>,
    /// Cluster-local `#RRGGBB` color.
    pub override_color: Option<String>,
}

/// Application service for the per-cluster role display overlay.
///
/// Settings are presentation only and never change effective permissions.
#[derive(Clone)]
pub struct ClusterHierarchyService {
    settings: Arc<dyn ClusterRoleSettingRepository>,
    roles: Arc<dyn RoleRepository>,
    directory: Arc<dyn ScopeDirectory>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ClusterHierarchyService {
    /// Creates a new hierarchy service.
    #[must_use]
    pub fn new(
        settings: Arc<dyn ClusterRoleSettingRepository>,
        roles: Arc<dyn RoleRepository>,
        directory: Arc<dyn ScopeDirectory>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            settings,
            roles,
            directory,
            audit_repository,
        }
    }

    /// Inserts or replaces the display setting of a role in a cluster.
    pub async fn save_setting(
        &self,
        actor: Option<UserId>,
        cluster_id: ClusterId,
        role_id: RoleId,
        input: ClusterRoleSettingInput,
    ) -> AppResult<ClusterRoleSetting> {
        let scope = Scope::Cluster(cluster_id);
        ensure_scope_exists(self.directory.as_ref(), scope).await?;
        ensure_actor_exists(self.directory.as_ref(), actor).await?;
        let role = require_role(self.roles.as_ref(), role_id).await?;
        if !role.fits_scope(scope) {
            return Err(AppError::ScopeMismatch(format!(
                "role '{}' belongs to {} and cannot be displayed in {scope}",
                role.name(),
                role.scope()
            )));
        }

        let setting = ClusterRoleSetting::new(
            cluster_id,
            role_id,
            input.hierarchy_order,
            input.display_sequence,
            actor,
            input.override_name,
            input.override_color,
        )?;
        self.settings.save_setting(&setting).await?;

        self.audit_repository
            .append_event(AuditEvent {
                scope: Some(scope),
                actor,
                action: AuditAction::ClusterRoleSettingSaved,
                resource_type: "cluster_role_setting".to_owned(),
                resource_id: format!("{cluster_id}:{role_id}"),
                detail: Some(format!(
                    "role '{}' placed at hierarchy {} sequence {}",
                    role.name(),
                    setting.hierarchy_order(),
                    setting.display_sequence()
                )),
            })
            .await?;

        Ok(setting)
    }

    /// Removes the display setting of a role in a cluster.
    pub async fn remove_setting(
        &self,
        actor: Option<UserId>,
        cluster_id: ClusterId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let removed = self.settings.remove_setting(cluster_id, role_id).await?;
        if removed {
            self.audit_repository
                .append_event(AuditEvent {
                    scope: Some(Scope::Cluster(cluster_id)),
                    actor,
                    action: AuditAction::ClusterRoleSettingRemoved,
                    resource_type: "cluster_role_setting".to_owned(),
                    resource_id: format!("{cluster_id}:{role_id}"),
                    detail: None,
                })
                .await?;
        }

        Ok(removed)
    }

    /// Returns the roles present in the cluster in display order with
    /// overrides applied.
    pub async fn cluster_role_hierarchy(
        &self,
        cluster_id: ClusterId,
    ) -> AppResult<Vec<ClusterRoleEntry>> {
        ensure_scope_exists(self.directory.as_ref(), Scope::Cluster(cluster_id)).await?;

        let roles = self.settings.list_cluster_roles(cluster_id).await?;
        let settings = self.settings.list_settings(cluster_id).await?;
        Ok(order_cluster_roles(roles, settings))
    }
}
