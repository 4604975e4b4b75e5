//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_access_store;
mod postgres_audit_repository;
mod postgres_authorization_repository;
mod postgres_cluster_role_setting_repository;
mod postgres_membership_repository;
mod postgres_permission_catalog_repository;
mod postgres_role_repository;
mod postgres_rows;
mod postgres_scope_directory;

pub use in_memory_access_store::InMemoryAccessStore;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_cluster_role_setting_repository::PostgresClusterRoleSettingRepository;
pub use postgres_membership_repository::PostgresMembershipRepository;
pub use postgres_permission_catalog_repository::PostgresPermissionCatalogRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_scope_directory::PostgresScopeDirectory;
