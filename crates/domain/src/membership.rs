use std::str::FromStr;

use guildkeep_core::{AppError, ClusterId, GuildId, GuildMembershipId, UserId};
use serde::{Deserialize, Serialize};

/// Prestige rank of a guild member. Confers no permission by itself.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Rank {
    /// Highest rank.
    S,
    /// Second rank.
    A,
    /// Third rank.
    B,
    /// Fourth rank.
    C,
    /// Fifth rank.
    D,
    /// Entry rank given to new members.
    #[default]
    E,
}

impl Rank {
    /// Returns a stable storage value for this rank.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }
}

impl FromStr for Rank {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "S" => Ok(Self::S),
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "E" => Ok(Self::E),
            _ => Err(AppError::Validation(format!("unknown rank '{value}'"))),
        }
    }
}

/// A user's participation in one guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMembership {
    id: GuildMembershipId,
    user_id: UserId,
    guild_id: GuildId,
    rank: Rank,
    is_primary: bool,
}

impl GuildMembership {
    /// Creates a membership projection.
    #[must_use]
    pub fn new(
        id: GuildMembershipId,
        user_id: UserId,
        guild_id: GuildId,
        rank: Rank,
        is_primary: bool,
    ) -> Self {
        Self {
            id,
            user_id,
            guild_id,
            rank,
            is_primary,
        }
    }

    /// Returns the membership identifier.
    #[must_use]
    pub fn id(&self) -> GuildMembershipId {
        self.id
    }

    /// Returns the member user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the guild.
    #[must_use]
    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// Returns the prestige rank.
    #[must_use]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Returns whether this is the user's primary guild.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

/// A guild's participation in a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMembership {
    /// Participating guild.
    pub guild_id: GuildId,
    /// Cluster joined by the guild.
    pub cluster_id: ClusterId,
    /// Whether the cluster is the guild's primary cluster.
    pub is_primary: bool,
}
