use async_trait::async_trait;
use sqlx::PgPool;

use guildkeep_application::ScopeDirectory;
use guildkeep_core::{AppError, AppResult, ClusterId, GuildId, UserId};

/// Scope directory reading the platform's `users`, `guilds` and `clusters`
/// tables.
#[derive(Clone)]
pub struct PostgresScopeDirectory {
    pool: PgPool,
}

impl PostgresScopeDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScopeDirectory for PostgresScopeDirectory {
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to look up user: {error}")))
    }

    async fn guild_exists(&self, guild_id: GuildId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM guilds WHERE id = $1)")
            .bind(guild_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to look up guild: {error}")))
    }

    async fn cluster_exists(&self, cluster_id: ClusterId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM clusters WHERE id = $1)")
            .bind(cluster_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to look up cluster: {error}")))
    }
}
