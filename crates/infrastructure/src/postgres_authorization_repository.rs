use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use guildkeep_application::AuthorizationRepository;
use guildkeep_core::{AppError, AppResult, RoleId, UserId};
use guildkeep_domain::{PermissionKey, Role, RoleGrant, Scope};

use crate::postgres_rows::{RoleRow, roles_from_rows};

/// PostgreSQL-backed repository for effective permission lookups.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleGrantRow {
    role_id: Uuid,
    role_name: String,
    permission_key: String,
}

impl TryFrom<RoleGrantRow> for RoleGrant {
    type Error = AppError;

    fn try_from(row: RoleGrantRow) -> Result<Self, Self::Error> {
        let permission_key = PermissionKey::new(row.permission_key.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode permission '{}' of role '{}': {error}",
                row.permission_key, row.role_id
            ))
        })?;

        Ok(RoleGrant {
            role_id: RoleId::from_uuid(row.role_id),
            role_name: row.role_name,
            permission_key,
        })
    }
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_role_grants(&self, user_id: UserId, scope: Scope) -> AppResult<Vec<RoleGrant>> {
        let rows = match scope {
            Scope::Guild(guild_id) => {
                sqlx::query_as::<_, RoleGrantRow>(
                    r#"
                    SELECT
                        roles.id AS role_id,
                        roles.name AS role_name,
                        permissions.key AS permission_key
                    FROM guild_memberships AS memberships
                    INNER JOIN user_guild_roles AS bindings
                        ON bindings.guild_membership_id = memberships.id
                    INNER JOIN roles
                        ON roles.id = bindings.role_id
                    INNER JOIN role_permissions AS grants
                        ON grants.role_id = roles.id
                    INNER JOIN permissions
                        ON permissions.id = grants.permission_id
                    WHERE memberships.user_id = $1
                        AND memberships.guild_id = $2
                        AND (
                            roles.scope_kind = 'system'
                            OR (roles.scope_kind = 'guild_custom' AND roles.scope_id = $2)
                        )
                    "#,
                )
                .bind(user_id.as_uuid())
                .bind(guild_id.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
            Scope::Cluster(cluster_id) => {
                sqlx::query_as::<_, RoleGrantRow>(
                    r#"
                    SELECT
                        roles.id AS role_id,
                        roles.name AS role_name,
                        permissions.key AS permission_key
                    FROM user_cluster_roles AS bindings
                    INNER JOIN roles
                        ON roles.id = bindings.cluster_role_id
                    INNER JOIN role_permissions AS grants
                        ON grants.role_id = roles.id
                    INNER JOIN permissions
                        ON permissions.id = grants.permission_id
                    WHERE bindings.user_id = $1
                        AND bindings.cluster_id = $2
                        AND (
                            roles.scope_kind = 'system'
                            OR (roles.scope_kind = 'cluster_custom' AND roles.scope_id = $2)
                        )
                    "#,
                )
                .bind(user_id.as_uuid())
                .bind(cluster_id.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|error| AppError::Internal(format!("failed to load role grants: {error}")))?;

        rows.into_iter().map(RoleGrant::try_from).collect()
    }

    async fn list_bound_roles(&self, user_id: UserId, scope: Scope) -> AppResult<Vec<Role>> {
        let rows = match scope {
            Scope::Guild(guild_id) => {
                sqlx::query_as::<_, RoleRow>(
                    r#"
                    SELECT roles.id, roles.name, roles.description, roles.scope_kind,
                        roles.scope_id, roles.is_default, roles.created_at
                    FROM guild_memberships AS memberships
                    INNER JOIN user_guild_roles AS bindings
                        ON bindings.guild_membership_id = memberships.id
                    INNER JOIN roles
                        ON roles.id = bindings.role_id
                    WHERE memberships.user_id = $1
                        AND memberships.guild_id = $2
                    ORDER BY roles.created_at, roles.id
                    "#,
                )
                .bind(user_id.as_uuid())
                .bind(guild_id.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
            Scope::Cluster(cluster_id) => {
                sqlx::query_as::<_, RoleRow>(
                    r#"
                    SELECT roles.id, roles.name, roles.description, roles.scope_kind,
                        roles.scope_id, roles.is_default, roles.created_at
                    FROM user_cluster_roles AS bindings
                    INNER JOIN roles
                        ON roles.id = bindings.cluster_role_id
                    WHERE bindings.user_id = $1
                        AND bindings.cluster_id = $2
                    ORDER BY roles.created_at, roles.id
                    "#,
                )
                .bind(user_id.as_uuid())
                .bind(cluster_id.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|error| AppError::Internal(format!("failed to load bound roles: {error}")))?;

        roles_from_rows(rows)
    }
}
