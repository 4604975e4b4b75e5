//! Per-cluster display overlay for shared and custom roles.

use guildkeep_core::{AppError, AppResult, ClusterId, NonEmptyString, RoleId, UserId};
use serde::{Deserialize, Serialize};

use crate::role::{Role, validate_role_name};

/// Display color in `#RRGGBB` form, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayColor(String);

impl DisplayColor {
    /// Creates a validated color.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        let valid = trimmed.len() == 7
            && trimmed.starts_with('#')
            && trimmed[1..].chars().all(|character| character.is_ascii_hexdigit());

        if !valid {
            return Err(AppError::Validation(format!(
                "color '{trimmed}' must use the #RRGGBB form"
            )));
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the color string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for DisplayColor {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DisplayColor> for String {
    fn from(value: DisplayColor) -> Self {
        value.0
    }
}

/// Cluster-local ordering and cosmetic override for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRoleSetting {
    cluster_id: ClusterId,
    role_id: RoleId,
    hierarchy_order: i32,
    display_sequence: i32,
    assigned_by: Option<UserId>,
    override_name: Option<NonEmptyString>,
    override_color: Option<DisplayColor>,
}

impl ClusterRoleSetting {
    /// Creates a validated setting.
    pub fn new(
        cluster_id: ClusterId,
        role_id: RoleId,
        hierarchy_order: i32,
        display_sequence: i32,
        assigned_by: Option<UserId>,
        override_name: Option<String>,
        override_color: Option<String>,
    ) -> AppResult<Self> {
        let override_name = override_name
            .filter(|value| !value.trim().is_empty())
            .map(validate_role_name)
            .transpose()?;
        let override_color = override_color
            .filter(|value| !value.trim().is_empty())
            .map(DisplayColor::new)
            .transpose()?;

        Ok(Self {
            cluster_id,
            role_id,
            hierarchy_order,
            display_sequence,
            assigned_by,
            override_name,
            override_color,
        })
    }

    /// Returns the cluster.
    #[must_use]
    pub fn cluster_id(&self) -> ClusterId {
        self.cluster_id
    }

    /// Returns the role the setting applies to.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns the seniority position, lower is more senior.
    #[must_use]
    pub fn hierarchy_order(&self) -> i32 {
        self.hierarchy_order
    }

    /// Returns the secondary display position.
    #[must_use]
    pub fn display_sequence(&self) -> i32 {
        self.display_sequence
    }

    /// Returns who last saved the setting.
    #[must_use]
    pub fn assigned_by(&self) -> Option<UserId> {
        self.assigned_by
    }

    /// Returns the display name override.
    #[must_use]
    pub fn override_name(&self) -> Option<&str> {
        self.override_name.as_ref().map(NonEmptyString::as_str)
    }

    /// Returns the color override.
    #[must_use]
    pub fn override_color(&self) -> Option<&str> {
        self.override_color.as_ref().map(DisplayColor::as_str)
    }
}

/// Role as presented inside one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRoleEntry {
    /// Underlying role row.
    pub role: Role,
    /// Cluster overlay, when one exists.
    pub setting: Option<ClusterRoleSetting>,
}

impl ClusterRoleEntry {
    /// Returns the override name or the role name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.setting
            .as_ref()
            .and_then(ClusterRoleSetting::override_name)
            .unwrap_or_else(|| self.role.name().as_str())
    }

    /// Returns the override color, if any.
    #[must_use]
    pub fn display_color(&self) -> Option<&str> {
        self.setting
            .as_ref()
            .and_then(ClusterRoleSetting::override_color)
    }

    /// Returns the hierarchy position, if the role has a setting.
    #[must_use]
    pub fn hierarchy_order(&self) -> Option<i32> {
        self.setting.as_ref().map(ClusterRoleSetting::hierarchy_order)
    }
}

/// Orders cluster roles for display.
///
/// Roles with a setting come first by `hierarchy_order` then `display_sequence`;
/// roles without one follow in creation order.
#[must_use]
pub fn order_cluster_roles(
    roles: Vec<Role>,
    settings: Vec<ClusterRoleSetting>,
) -> Vec<ClusterRoleEntry> {
    let mut entries = roles
        .into_iter()
        .map(|role| {
            let setting = settings
                .iter()
                .find(|setting| setting.role_id() == role.id())
                .cloned();
            ClusterRoleEntry { role, setting }
        })
        .collect::<Vec<_>>();

    entries.sort_by_key(|entry| {
        (
            entry.setting.is_none(),
            entry.setting.as_ref().map(ClusterRoleSetting::hierarchy_order),
            entry
                .setting
                .as_ref()
                .map(ClusterRoleSetting::display_sequence),
            entry.role.created_at(),
        )
    });

    entries
}
