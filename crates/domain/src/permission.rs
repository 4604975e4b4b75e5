use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use guildkeep_core::{AppError, AppResult, PermissionId};
use serde::{Deserialize, Serialize};

/// Stable permission key such as `GUILD_EDIT_DETAILS`.
///
/// Keys are upper snake case: ASCII uppercase letters, digits and single
/// underscores, starting with a letter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionKey(String);

impl PermissionKey {
    /// Creates a validated permission key.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        let starts_with_letter = trimmed
            .chars()
            .next()
            .is_some_and(|character| character.is_ascii_uppercase());
        let valid_characters = trimmed.chars().all(|character| {
            character.is_ascii_uppercase() || character.is_ascii_digit() || character == '_'
        });

        if !starts_with_letter
            || !valid_characters
            || trimmed.ends_with('_')
            || trimmed.contains("__")
        {
            return Err(AppError::Validation(format!(
                "permission key '{trimmed}' must be upper snake case"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionKey> for String {
    fn from(value: PermissionKey) -> Self {
        value.0
    }
}

impl Borrow<str> for PermissionKey {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Functional area a permission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionGroup {
    /// Guild profile and settings.
    GuildManagement,
    /// Inviting, removing and ranking guild members.
    MemberManagement,
    /// Custom roles and rank configuration.
    RoleManagement,
    /// Badge templates and awards.
    BadgeManagement,
    /// Guild categories.
    CategoryManagement,
    /// Cluster profile, guild roster and cluster roles.
    ClusterManagement,
    /// Platform-wide administration.
    SystemAdministration,
}

impl PermissionGroup {
    /// Returns a stable storage value for this group.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GuildManagement => "guild_management",
            Self::MemberManagement => "member_management",
            Self::RoleManagement => "role_management",
            Self::BadgeManagement => "badge_management",
            Self::CategoryManagement => "category_management",
            Self::ClusterManagement => "cluster_management",
            Self::SystemAdministration => "system_administration",
        }
    }
}

impl FromStr for PermissionGroup {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "guild_management" => Ok(Self::GuildManagement),
            "member_management" => Ok(Self::MemberManagement),
            "role_management" => Ok(Self::RoleManagement),
            "badge_management" => Ok(Self::BadgeManagement),
            "category_management" => Ok(Self::CategoryManagement),
            "cluster_management" => Ok(Self::ClusterManagement),
            "system_administration" => Ok(Self::SystemAdministration),
            _ => Err(AppError::Validation(format!(
                "unknown permission group '{value}'"
            ))),
        }
    }
}

/// Catalog permission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    key: PermissionKey,
    description: String,
    group: PermissionGroup,
}

impl Permission {
    /// Creates a catalog permission.
    #[must_use]
    pub fn new(
        id: PermissionId,
        key: PermissionKey,
        description: impl Into<String>,
        group: PermissionGroup,
    ) -> Self {
        Self {
            id,
            key,
            description: description.into(),
            group,
        }
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the stable permission key.
    #[must_use]
    pub fn key(&self) -> &PermissionKey {
        &self.key
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the functional group.
    #[must_use]
    pub fn group(&self) -> PermissionGroup {
        self.group
    }
}

/// Bootstrap payload for one catalog permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSeed {
    /// Stable permission key.
    pub key: PermissionKey,
    /// Human-readable description.
    pub description: String,
    /// Functional group.
    pub group: PermissionGroup,
}

impl PermissionSeed {
    /// Creates a validated permission seed.
    pub fn new(
        key: impl Into<String>,
        description: impl Into<String>,
        group: PermissionGroup,
    ) -> AppResult<Self> {
        Ok(Self {
            key: PermissionKey::new(key)?,
            description: description.into(),
            group,
        })
    }
}
