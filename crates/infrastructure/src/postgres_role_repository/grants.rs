use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use guildkeep_application::{RolePermissionGrant, RolePermissionRepository};
use guildkeep_core::{PermissionId, UserId};
use guildkeep_domain::Permission;

use crate::postgres_rows::{PermissionRow, is_assigned_by_violation, is_foreign_key_violation};

use super::*;

#[derive(Debug, FromRow)]
struct GrantRow {
    role_id: Uuid,
    assigned_by: Option<Uuid>,
    granted_at: DateTime<Utc>,
    #[sqlx(flatten)]
    permission: PermissionRow,
}

#[async_trait]
impl RolePermissionRepository for PostgresRoleRepository {
    async fn grant_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        assigned_by: Option<UserId>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id, assigned_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .bind(assigned_by.map(|user_id| user_id.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if is_assigned_by_violation(&error) {
                return AppError::UnknownUser(format!(
                    "assigning user '{}' does not exist",
                    assigned_by.map_or_else(String::new, |user_id| user_id.to_string())
                ));
            }
            if is_foreign_key_violation(&error) {
                return AppError::NotFound(format!(
                    "role '{role_id}' or permission '{permission_id}' no longer exists"
                ));
            }
            AppError::Internal(format!("failed to grant permission: {error}"))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1
                AND permission_id = $2
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke permission: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<RolePermissionGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                grants.role_id,
                grants.assigned_by,
                grants.granted_at,
                permissions.id,
                permissions.key,
                permissions.description,
                permissions.permission_group
            FROM role_permissions AS grants
            INNER JOIN permissions
                ON permissions.id = grants.permission_id
            WHERE grants.role_id = $1
            ORDER BY permissions.key
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role permissions: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(RolePermissionGrant {
                    role_id: RoleId::from_uuid(row.role_id),
                    permission: Permission::try_from(row.permission)?,
                    assigned_by: row.assigned_by.map(UserId::from_uuid),
                    granted_at: row.granted_at,
                })
            })
            .collect()
    }
}
