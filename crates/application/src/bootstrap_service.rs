use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use guildkeep_core::{AppError, AppResult};
use guildkeep_domain::{
    AuditAction, BootstrapPlan, Permission, PermissionSeed, Role, RoleScope, SystemRoleSeed,
};
use tracing::{info, warn};

use crate::{
    AuditEvent, AuditRepository, PermissionCatalogRepository, RolePermissionRepository,
    RoleRepository,
};

/// Counters reported after applying a bootstrap plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Catalog permissions present after the run.
    pub permissions: usize,
    /// System roles present after the run.
    pub system_roles: usize,
    /// Grants written by this run. Zero on a repeated run.
    pub grants_created: usize,
}

/// Application service seeding the permission catalog and system roles.
#[derive(Clone)]
pub struct BootstrapService {
    catalog: Arc<dyn PermissionCatalogRepository>,
    roles: Arc<dyn RoleRepository>,
    grants: Arc<dyn RolePermissionRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl BootstrapService {
    /// Creates a new bootstrap service.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn PermissionCatalogRepository>,
        roles: Arc<dyn RoleRepository>,
        grants: Arc<dyn RolePermissionRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            catalog,
            roles,
            grants,
            audit_repository,
        }
    }

    /// Upserts one catalog permission keyed by its stable key.
    pub async fn ensure_permission(&self, seed: &PermissionSeed) -> AppResult<Permission> {
        if let Some(existing) = self
            .catalog
            .find_permission_by_key(seed.key.as_str())
            .await?
            && existing.description() == seed.description
            && existing.group() == seed.group
        {
            return Ok(existing);
        }

        let permission = self.catalog.upsert_permission(seed).await?;

        self.audit_repository
            .append_event(AuditEvent {
                scope: None,
                actor: None,
                action: AuditAction::PermissionEnsured,
                resource_type: "permission".to_owned(),
                resource_id: permission.key().to_string(),
                detail: Some(format!("group {}", permission.group().as_str())),
            })
            .await?;

        Ok(permission)
    }

    /// Upserts one system role template keyed by its name.
    pub async fn ensure_system_role(&self, seed: &SystemRoleSeed) -> AppResult<Role> {
        if let Some(existing) = self
            .roles
            .find_role_by_name(RoleScope::System, seed.name.as_str())
            .await?
            && existing.description() == seed.description.as_deref()
            && existing.is_default_role() == seed.is_default
        {
            return Ok(existing);
        }

        let role = self.roles.upsert_system_role(seed).await?;

        self.audit_repository
            .append_event(AuditEvent {
                scope: None,
                actor: None,
                action: AuditAction::SystemRoleEnsured,
                resource_type: "role".to_owned(),
                resource_id: role.id().to_string(),
                detail: Some(format!("system role '{}'", role.name())),
            })
            .await?;

        Ok(role)
    }

    /// Validates the plan, writes it and verifies every role name it looks up.
    ///
    /// Nothing is written when validation fails.
    pub async fn apply(&self, plan: &BootstrapPlan) -> AppResult<BootstrapReport> {
        plan.validate()?;

        let mut permissions = BTreeMap::new();
        for seed in plan.permissions() {
            let permission = self.ensure_permission(seed).await?;
            permissions.insert(permission.key().to_string(), permission);
        }

        let mut roles = BTreeMap::new();
        for seed in plan.system_roles() {
            let role = self.ensure_system_role(seed).await?;
            roles.insert(role.name().to_string(), role);
        }

        let mut grants_created = 0;
        for grant in plan.grants() {
            let role = roles.get(&grant.role_name).ok_or_else(|| {
                AppError::UnresolvedRoleReference(vec![grant.role_name.clone()])
            })?;
            for key in &grant.permission_keys {
                let permission = permissions.get(key.as_str()).ok_or_else(|| {
                    AppError::UnknownPermission(format!("permission '{key}' was not seeded"))
                })?;
                if self
                    .grants
                    .grant_permission(role.id(), permission.id(), None)
                    .await?
                {
                    grants_created += 1;
                    self.audit_repository
                        .append_event(AuditEvent {
                            scope: None,
                            actor: None,
                            action: AuditAction::RolePermissionGranted,
                            resource_type: "role_permission".to_owned(),
                            resource_id: format!("{}:{}", role.id(), permission.id()),
                            detail: Some(format!(
                                "seeded '{}' on role '{}'",
                                permission.key(),
                                role.name()
                            )),
                        })
                        .await?;
                }
            }
        }

        self.verify_role_references(plan.referenced_role_names())
            .await?;

        let report = BootstrapReport {
            permissions: permissions.len(),
            system_roles: roles.len(),
            grants_created,
        };
        info!(
            permissions = report.permissions,
            system_roles = report.system_roles,
            grants_created = report.grants_created,
            "bootstrap plan applied"
        );

        Ok(report)
    }

    /// Checks that every name resolves to a stored system role.
    ///
    /// Logs each missing name, then fails listing all of them.
    pub async fn verify_role_references<I, S>(&self, names: I) -> AppResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut missing = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            if self
                .roles
                .find_role_by_name(RoleScope::System, name)
                .await?
                .is_none()
            {
                warn!(role = name, "role name does not resolve to a system role");
                missing.insert(name.to_owned());
            }
        }

        if missing.is_empty() {
            return Ok(());
        }

        Err(AppError::UnresolvedRoleReference(
            missing.into_iter().collect(),
        ))
    }
}

#[cfg(test)]
mod tests;
