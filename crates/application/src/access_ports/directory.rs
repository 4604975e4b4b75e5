use async_trait::async_trait;
use guildkeep_core::{AppResult, ClusterId, GuildId, UserId};

/// Port answering existence questions about platform entities the engine
/// does not own.
#[async_trait]
pub trait ScopeDirectory: Send + Sync {
    /// Returns whether the user exists.
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool>;

    /// Returns whether the guild exists.
    async fn guild_exists(&self, guild_id: GuildId) -> AppResult<bool>;

    /// Returns whether the cluster exists.
    async fn cluster_exists(&self, cluster_id: ClusterId) -> AppResult<bool>;
}
