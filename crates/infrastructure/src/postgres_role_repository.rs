use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use guildkeep_application::RoleRepository;
use guildkeep_core::{AppError, AppResult, RoleId};
use guildkeep_domain::{Role, RoleScope, SystemRoleSeed};

use crate::postgres_rows::{RoleRow, is_unique_violation, roles_from_rows};

mod grants;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for roles and role grants.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, scope_kind, scope_id, is_default, created_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?
        .map(Role::try_from)
        .transpose()
    }

    async fn find_role_by_name(&self, scope: RoleScope, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, scope_kind, scope_id, is_default, created_at
            FROM roles
            WHERE scope_kind = $1
                AND scope_id IS NOT DISTINCT FROM $2
                AND name = $3
            "#,
        )
        .bind(scope.kind().as_str())
        .bind(scope.scope_id())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role by name: {error}")))?
        .map(Role::try_from)
        .transpose()
    }

    async fn list_roles(&self, scope: RoleScope) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, scope_kind, scope_id, is_default, created_at
            FROM roles
            WHERE scope_kind = $1
                AND scope_id IS NOT DISTINCT FROM $2
            ORDER BY created_at, id
            "#,
        )
        .bind(scope.kind().as_str())
        .bind(scope.scope_id())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        roles_from_rows(rows)
    }

    async fn create_role(&self, role: &Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, description, scope_kind, scope_id, is_default, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.description())
        .bind(role.scope().kind().as_str())
        .bind(role.scope().scope_id())
        .bind(role.is_default_role())
        .bind(role.created_at())
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, role, "create"))?;

        Ok(())
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2,
                description = $3
            WHERE id = $1
                AND scope_kind <> 'system'
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.description())
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, role, "update"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::UnknownRole(format!(
                "custom role '{}' does not exist",
                role.id()
            )));
        }

        Ok(())
    }

    async fn upsert_system_role(&self, seed: &SystemRoleSeed) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (id, name, description, scope_kind, scope_id, is_default)
            VALUES ($1, $2, $3, 'system', NULL, $4)
            ON CONFLICT (name) WHERE scope_kind = 'system' DO UPDATE
            SET description = EXCLUDED.description,
                is_default = EXCLUDED.is_default
            RETURNING id, name, description, scope_kind, scope_id, is_default, created_at
            "#,
        )
        .bind(RoleId::new().as_uuid())
        .bind(seed.name.as_str())
        .bind(seed.description.as_deref())
        .bind(seed.is_default)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to upsert system role: {error}")))?;

        Role::try_from(row)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let mut removed_rows = 0;
        for statement in [
            "DELETE FROM role_permissions WHERE role_id = $1",
            "DELETE FROM user_guild_roles WHERE role_id = $1",
            "DELETE FROM user_cluster_roles WHERE cluster_role_id = $1",
            "DELETE FROM cluster_role_settings WHERE cluster_role_id = $1",
            "DELETE FROM roles WHERE id = $1",
        ] {
            removed_rows += sqlx::query(statement)
                .bind(role_id.as_uuid())
                .execute(&mut *transaction)
                .await
                .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?
                .rows_affected();
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        debug!(%role_id, removed_rows, "deleted role with its grants and bindings");
        Ok(())
    }
}

fn map_role_conflict(error: sqlx::Error, role: &Role, operation: &str) -> AppError {
    if is_unique_violation(&error) {
        return AppError::DuplicateRoleName(format!(
            "role '{}' already exists in {}",
            role.name(),
            role.scope()
        ));
    }

    AppError::Internal(format!("failed to {operation} role: {error}"))
}
