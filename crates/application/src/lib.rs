//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod authorization_service;
mod bootstrap_service;
mod cluster_hierarchy_service;
mod membership_service;
mod permission_catalog_service;
mod role_registry_service;
mod scope_checks;

#[cfg(test)]
mod test_support;

pub use access_ports::{
    AuditEvent, AuditRepository, AuthorizationRepository, ClusterRoleSettingRepository,
    MembershipRepository, PermissionCatalogRepository, RolePermissionGrant,
    RolePermissionRepository, RoleRepository, ScopeDirectory,
};
pub use authorization_service::AuthorizationService;
pub use bootstrap_service::{BootstrapReport, BootstrapService};
pub use cluster_hierarchy_service::{ClusterHierarchyService, ClusterRoleSettingInput};
pub use membership_service::{MembershipService, RoleBindingOutcome};
pub use permission_catalog_service::PermissionCatalogService;
pub use role_registry_service::RoleRegistryService;
