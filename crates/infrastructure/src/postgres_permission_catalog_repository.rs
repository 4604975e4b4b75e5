use async_trait::async_trait;
use sqlx::PgPool;

use guildkeep_application::PermissionCatalogRepository;
use guildkeep_core::{AppError, AppResult, PermissionId};
use guildkeep_domain::{Permission, PermissionSeed};

use crate::postgres_rows::{PermissionRow, is_foreign_key_violation};

/// PostgreSQL-backed permission catalog.
#[derive(Clone)]
pub struct PostgresPermissionCatalogRepository {
    pool: PgPool,
}

impl PostgresPermissionCatalogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionCatalogRepository for PostgresPermissionCatalogRepository {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, key, description, permission_group
            FROM permissions
            ORDER BY key
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(Permission::try_from).collect()
    }

    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, key, description, permission_group
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?
        .map(Permission::try_from)
        .transpose()
    }

    async fn find_permission_by_key(&self, key: &str) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, key, description, permission_group
            FROM permissions
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find permission by key: {error}"))
        })?
        .map(Permission::try_from)
        .transpose()
    }

    async fn upsert_permission(&self, seed: &PermissionSeed) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO permissions (id, key, description, permission_group)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key) DO UPDATE
            SET description = EXCLUDED.description,
                permission_group = EXCLUDED.permission_group
            RETURNING id, key, description, permission_group
            "#,
        )
        .bind(PermissionId::new().as_uuid())
        .bind(seed.key.as_str())
        .bind(seed.description.as_str())
        .bind(seed.group.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to upsert permission: {error}")))?;

        Permission::try_from(row)
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if is_foreign_key_violation(&error) {
                return AppError::PermissionInUse(format!(
                    "permission '{permission_id}' is still granted to at least one role"
                ));
            }
            AppError::Internal(format!("failed to delete permission: {error}"))
        })?;

        Ok(())
    }
}
