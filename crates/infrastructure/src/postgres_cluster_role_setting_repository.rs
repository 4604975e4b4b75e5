use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use guildkeep_application::ClusterRoleSettingRepository;
use guildkeep_core::{AppError, AppResult, ClusterId, RoleId, UserId};
use guildkeep_domain::{ClusterRoleSetting, Role};

use crate::postgres_rows::{
    RoleRow, is_assigned_by_violation, is_foreign_key_violation, roles_from_rows,
};

/// PostgreSQL-backed repository for the cluster role display overlay.
#[derive(Clone)]
pub struct PostgresClusterRoleSettingRepository {
    pool: PgPool,
}

impl PostgresClusterRoleSettingRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ClusterRoleSettingRow {
    cluster_id: Uuid,
    cluster_role_id: Uuid,
    hierarchy_order: i32,
    display_sequence: i32,
    assigned_by: Option<Uuid>,
    override_name: Option<String>,
    override_color: Option<String>,
}

impl TryFrom<ClusterRoleSettingRow> for ClusterRoleSetting {
    type Error = AppError;

    fn try_from(row: ClusterRoleSettingRow) -> Result<Self, Self::Error> {
        ClusterRoleSetting::new(
            ClusterId::from_uuid(row.cluster_id),
            RoleId::from_uuid(row.cluster_role_id),
            row.hierarchy_order,
            row.display_sequence,
            row.assigned_by.map(UserId::from_uuid),
            row.override_name,
            row.override_color,
        )
    }
}

#[async_trait]
impl ClusterRoleSettingRepository for PostgresClusterRoleSettingRepository {
    async fn save_setting(&self, setting: &ClusterRoleSetting) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cluster_role_settings (
                cluster_id,
                cluster_role_id,
                hierarchy_order,
                display_sequence,
                assigned_by,
                override_name,
                override_color
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (cluster_id, cluster_role_id) DO UPDATE
            SET hierarchy_order = EXCLUDED.hierarchy_order,
                display_sequence = EXCLUDED.display_sequence,
                assigned_by = EXCLUDED.assigned_by,
                override_name = EXCLUDED.override_name,
                override_color = EXCLUDED.override_color,
                updated_at = now()
            "#,
        )
        .bind(setting.cluster_id().as_uuid())
        .bind(setting.role_id().as_uuid())
        .bind(setting.hierarchy_order())
        .bind(setting.display_sequence())
        .bind(setting.assigned_by().map(|user_id| user_id.as_uuid()))
        .bind(setting.override_name())
        .bind(setting.override_color())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if is_assigned_by_violation(&error) {
                return AppError::UnknownUser(format!(
                    "assigning user '{}' does not exist",
                    setting
                        .assigned_by()
                        .map_or_else(String::new, |user_id| user_id.to_string())
                ));
            }
            if is_foreign_key_violation(&error) {
                return AppError::NotFound(format!(
                    "cluster '{}' or role '{}' no longer exists",
                    setting.cluster_id(),
                    setting.role_id()
                ));
            }
            AppError::Internal(format!("failed to save cluster role setting: {error}"))
        })?;

        Ok(())
    }

    async fn remove_setting(&self, cluster_id: ClusterId, role_id: RoleId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM cluster_role_settings
            WHERE cluster_id = $1
                AND cluster_role_id = $2
            "#,
        )
        .bind(cluster_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove cluster role setting: {error}"))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_settings(&self, cluster_id: ClusterId) -> AppResult<Vec<ClusterRoleSetting>> {
        let rows = sqlx::query_as::<_, ClusterRoleSettingRow>(
            r#"
            SELECT
                cluster_id,
                cluster_role_id,
                hierarchy_order,
                display_sequence,
                assigned_by,
                override_name,
                override_color
            FROM cluster_role_settings
            WHERE cluster_id = $1
            ORDER BY hierarchy_order, display_sequence
            "#,
        )
        .bind(cluster_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list cluster role settings: {error}"))
        })?;

        rows.into_iter().map(ClusterRoleSetting::try_from).collect()
    }

    async fn list_cluster_roles(&self, cluster_id: ClusterId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, scope_kind, scope_id, is_default, created_at
            FROM roles
            WHERE (scope_kind = 'cluster_custom' AND scope_id = $1)
                OR (
                    scope_kind = 'system'
                    AND (
                        EXISTS (
                            SELECT 1
                            FROM user_cluster_roles AS bindings
                            WHERE bindings.cluster_id = $1
                                AND bindings.cluster_role_id = roles.id
                        )
                        OR EXISTS (
                            SELECT 1
                            FROM cluster_role_settings AS settings
                            WHERE settings.cluster_id = $1
                                AND settings.cluster_role_id = roles.id
                        )
                    )
                )
            ORDER BY created_at, id
            "#,
        )
        .bind(cluster_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list cluster roles: {error}")))?;

        roles_from_rows(rows)
    }
}
