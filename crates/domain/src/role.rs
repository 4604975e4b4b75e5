use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use guildkeep_core::{AppError, AppResult, ClusterId, GuildId, NonEmptyString, RoleId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scope::Scope;

/// Maximum accepted role name length in characters.
pub const ROLE_NAME_MAX_LENGTH: usize = 64;

/// Storage discriminator for role ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScopeKind {
    /// Shared scope-less template.
    System,
    /// Custom role owned by one guild.
    GuildCustom,
    /// Custom role owned by one cluster.
    ClusterCustom,
}

impl RoleScopeKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::GuildCustom => "guild_custom",
            Self::ClusterCustom => "cluster_custom",
        }
    }
}

impl FromStr for RoleScopeKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "system" => Ok(Self::System),
            "guild_custom" => Ok(Self::GuildCustom),
            "cluster_custom" => Ok(Self::ClusterCustom),
            _ => Err(AppError::Validation(format!(
                "unknown role scope kind '{value}'"
            ))),
        }
    }
}

/// Owner of a role. System roles carry no scope id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RoleScope {
    /// Shared template referenced by every scope.
    System,
    /// Custom role owned by a guild.
    Guild(GuildId),
    /// Custom role owned by a cluster.
    Cluster(ClusterId),
}

impl RoleScope {
    /// Rebuilds a scope from its storage columns.
    ///
    /// Fails when the scope id is present for a system role or missing for a
    /// custom role.
    pub fn from_parts(kind: RoleScopeKind, scope_id: Option<Uuid>) -> AppResult<Self> {
        match (kind, scope_id) {
            (RoleScopeKind::System, None) => Ok(Self::System),
            (RoleScopeKind::GuildCustom, Some(id)) => Ok(Self::Guild(GuildId::from_uuid(id))),
            (RoleScopeKind::ClusterCustom, Some(id)) => {
                Ok(Self::Cluster(ClusterId::from_uuid(id)))
            }
            (RoleScopeKind::System, Some(id)) => Err(AppError::Validation(format!(
                "system role must not carry scope id '{id}'"
            ))),
            (kind, None) => Err(AppError::Validation(format!(
                "{} role requires a scope id",
                kind.as_str()
            ))),
        }
    }

    /// Returns the storage discriminator.
    #[must_use]
    pub fn kind(&self) -> RoleScopeKind {
        match self {
            Self::System => RoleScopeKind::System,
            Self::Guild(_) => RoleScopeKind::GuildCustom,
            Self::Cluster(_) => RoleScopeKind::ClusterCustom,
        }
    }

    /// Returns the owning scope id, `None` for system roles.
    #[must_use]
    pub fn scope_id(&self) -> Option<Uuid> {
        match self {
            Self::System => None,
            Self::Guild(guild_id) => Some(guild_id.as_uuid()),
            Self::Cluster(cluster_id) => Some(cluster_id.as_uuid()),
        }
    }

    /// Returns whether this is the shared system scope.
    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    /// Returns the owning guild or cluster, `None` for system roles.
    #[must_use]
    pub fn owner(&self) -> Option<Scope> {
        match self {
            Self::System => None,
            Self::Guild(guild_id) => Some(Scope::Guild(*guild_id)),
            Self::Cluster(cluster_id) => Some(Scope::Cluster(*cluster_id)),
        }
    }
}

impl From<Scope> for RoleScope {
    fn from(value: Scope) -> Self {
        match value {
            Scope::Guild(guild_id) => Self::Guild(guild_id),
            Scope::Cluster(cluster_id) => Self::Cluster(cluster_id),
        }
    }
}

impl Display for RoleScope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => formatter.write_str("system"),
            Self::Guild(guild_id) => write!(formatter, "guild '{guild_id}'"),
            Self::Cluster(cluster_id) => write!(formatter, "cluster '{cluster_id}'"),
        }
    }
}

/// Validates and normalizes a role name.
pub fn validate_role_name(name: impl Into<String>) -> AppResult<NonEmptyString> {
    let name = NonEmptyString::new(name)?;
    if name.as_str().chars().count() > ROLE_NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "role name must be at most {ROLE_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(name)
}

/// Normalizes an optional free-text description.
#[must_use]
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

/// System template or scope-owned custom role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    description: Option<String>,
    scope: RoleScope,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl Role {
    /// Creates a validated role.
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        description: Option<String>,
        scope: RoleScope,
        is_default: bool,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: validate_role_name(name)?,
            description: normalize_description(description),
            scope,
            is_default,
            created_at,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the owning scope.
    #[must_use]
    pub fn scope(&self) -> RoleScope {
        self.scope
    }

    /// Returns whether this role is a shared system template.
    #[must_use]
    pub fn is_system_role(&self) -> bool {
        self.scope.is_system()
    }

    /// Returns whether new members receive this role by default.
    #[must_use]
    pub fn is_default_role(&self) -> bool {
        self.is_default
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the role may be bound to principals in the given scope.
    ///
    /// System roles fit every scope; custom roles only fit the scope that owns them.
    #[must_use]
    pub fn fits_scope(&self, scope: Scope) -> bool {
        match (self.scope, scope) {
            (RoleScope::System, _) => true,
            (RoleScope::Guild(owner), Scope::Guild(target)) => owner == target,
            (RoleScope::Cluster(owner), Scope::Cluster(target)) => owner == target,
            _ => false,
        }
    }

    /// Returns a copy with updated name and description.
    ///
    /// System roles are immutable templates.
    pub fn with_details(
        &self,
        name: Option<String>,
        description: Option<Option<String>>,
    ) -> AppResult<Self> {
        if self.is_system_role() {
            return Err(AppError::SystemRoleImmutable(format!(
                "system role '{}' cannot be renamed or described",
                self.name
            )));
        }

        let mut updated = self.clone();
        if let Some(name) = name {
            updated.name = validate_role_name(name)?;
        }
        if let Some(description) = description {
            updated.description = normalize_description(description);
        }

        Ok(updated)
    }
}
