use std::str::FromStr;

use chrono::{DateTime, Utc};
use guildkeep_core::{AppError, AppResult, PermissionId, RoleId};
use guildkeep_domain::{Permission, PermissionGroup, PermissionKey, Role, RoleScope, RoleScopeKind};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) scope_kind: String,
    pub(crate) scope_id: Option<Uuid>,
    pub(crate) is_default: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let kind = RoleScopeKind::from_str(row.scope_kind.as_str())?;
        Role::new(
            RoleId::from_uuid(row.id),
            row.name,
            row.description,
            RoleScope::from_parts(kind, row.scope_id)?,
            row.is_default,
            row.created_at,
        )
    }
}

pub(crate) fn roles_from_rows(rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
    rows.into_iter().map(Role::try_from).collect()
}

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    pub(crate) id: Uuid,
    pub(crate) key: String,
    pub(crate) description: String,
    pub(crate) permission_group: String,
}

impl TryFrom<PermissionRow> for Permission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        Ok(Permission::new(
            PermissionId::from_uuid(row.id),
            PermissionKey::new(row.key)?,
            row.description,
            PermissionGroup::from_str(row.permission_group.as_str())?,
        ))
    }
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23505")
    )
}

pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23503")
    )
}

/// Whether the error is the `assigned_by` reference to `users` failing.
pub(crate) fn is_assigned_by_violation(error: &sqlx::Error) -> bool {
    is_foreign_key_violation(error)
        && matches!(
            error,
            sqlx::Error::Database(database_error)
                if database_error
                    .constraint()
                    .is_some_and(|constraint| constraint.ends_with("_assigned_by_fkey"))
        )
}
