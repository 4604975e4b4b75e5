use std::fmt::{Display, Formatter};

use guildkeep_core::{AppError, AppResult, ClusterId, GuildId, GuildMembershipId, UserId};
use serde::{Deserialize, Serialize};

use crate::membership::GuildMembership;
use crate::role::Role;

/// Unit within which roles and permissions are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Scope {
    /// A single guild.
    Guild(GuildId),
    /// A single cluster of guilds.
    Cluster(ClusterId),
}

/// Scope discriminator without the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Guild scope.
    Guild,
    /// Cluster scope.
    Cluster,
}

impl ScopeKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guild => "guild",
            Self::Cluster => "cluster",
        }
    }
}

impl Scope {
    /// Returns the scope discriminator.
    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        match self {
            Self::Guild(_) => ScopeKind::Guild,
            Self::Cluster(_) => ScopeKind::Cluster,
        }
    }

    /// Returns the scope identifier as a UUID.
    #[must_use]
    pub fn id(&self) -> uuid::Uuid {
        match self {
            Self::Guild(guild_id) => guild_id.as_uuid(),
            Self::Cluster(cluster_id) => cluster_id.as_uuid(),
        }
    }
}

impl Display for Scope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Guild(guild_id) => write!(formatter, "guild '{guild_id}'"),
            Self::Cluster(cluster_id) => write!(formatter, "cluster '{cluster_id}'"),
        }
    }
}

/// Guild-side binding target. Only exists once a membership row exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildScopeBinding {
    /// Membership the role is attached to.
    pub membership_id: GuildMembershipId,
    /// Member user.
    pub user_id: UserId,
    /// Guild owning the membership.
    pub guild_id: GuildId,
}

impl From<&GuildMembership> for GuildScopeBinding {
    fn from(membership: &GuildMembership) -> Self {
        Self {
            membership_id: membership.id(),
            user_id: membership.user_id(),
            guild_id: membership.guild_id(),
        }
    }
}

/// Cluster-side binding target. The binding itself is the membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterScopeBinding {
    /// Bound user.
    pub user_id: UserId,
    /// Cluster the role applies to.
    pub cluster_id: ClusterId,
}

/// Target of a user-role binding in either scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeBinding {
    /// Binding through an existing guild membership.
    Guild(GuildScopeBinding),
    /// Self-sufficient cluster binding.
    Cluster(ClusterScopeBinding),
}

impl ScopeBinding {
    /// Returns the scope the binding lives in.
    #[must_use]
    pub fn scope(&self) -> Scope {
        match self {
            Self::Guild(binding) => Scope::Guild(binding.guild_id),
            Self::Cluster(binding) => Scope::Cluster(binding.cluster_id),
        }
    }

    /// Returns the bound user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Guild(binding) => binding.user_id,
            Self::Cluster(binding) => binding.user_id,
        }
    }

    /// Ensures the role may be attached to this binding target.
    pub fn ensure_role_fits(&self, role: &Role) -> AppResult<()> {
        if role.fits_scope(self.scope()) {
            return Ok(());
        }

        Err(AppError::ScopeMismatch(format!(
            "role '{}' belongs to {} and cannot be bound in {}",
            role.name(),
            role.scope(),
            self.scope()
        )))
    }

    /// Returns a stable resource label for audit entries.
    #[must_use]
    pub fn resource_id(&self, role: &Role) -> String {
        match self {
            Self::Guild(binding) => format!("{}:{}", binding.membership_id, role.id()),
            Self::Cluster(binding) => {
                format!("{}:{}:{}", binding.user_id, binding.cluster_id, role.id())
            }
        }
    }
}
