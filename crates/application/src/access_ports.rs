mod audit;
mod authorization;
mod catalog;
mod directory;
mod hierarchy;
mod memberships;
mod roles;

pub use audit::{AuditEvent, AuditRepository};
pub use authorization::AuthorizationRepository;
pub use catalog::PermissionCatalogRepository;
pub use directory::ScopeDirectory;
pub use hierarchy::ClusterRoleSettingRepository;
pub use memberships::MembershipRepository;
pub use roles::{RolePermissionGrant, RolePermissionRepository, RoleRepository};
