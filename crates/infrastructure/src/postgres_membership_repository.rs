use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use guildkeep_application::MembershipRepository;
use guildkeep_core::{AppError, AppResult, ClusterId, GuildId, GuildMembershipId, RoleId, UserId};
use guildkeep_domain::{ClusterMembership, GuildMembership, Rank};

/// PostgreSQL-backed repository for memberships, user-role bindings and
/// guild to cluster links.
#[derive(Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct GuildMembershipRow {
    id: Uuid,
    user_id: Uuid,
    guild_id: Uuid,
    rank: String,
    is_primary: bool,
}

impl TryFrom<GuildMembershipRow> for GuildMembership {
    type Error = AppError;

    fn try_from(row: GuildMembershipRow) -> Result<Self, Self::Error> {
        Ok(GuildMembership::new(
            GuildMembershipId::from_uuid(row.id),
            UserId::from_uuid(row.user_id),
            GuildId::from_uuid(row.guild_id),
            Rank::from_str(row.rank.as_str())?,
            row.is_primary,
        ))
    }
}

#[derive(Debug, FromRow)]
struct ClusterMembershipRow {
    guild_id: Uuid,
    cluster_id: Uuid,
    is_primary: bool,
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn find_guild_membership(
        &self,
        user_id: UserId,
        guild_id: GuildId,
    ) -> AppResult<Option<GuildMembership>> {
        sqlx::query_as::<_, GuildMembershipRow>(
            r#"
            SELECT id, user_id, guild_id, rank, is_primary
            FROM guild_memberships
            WHERE user_id = $1
                AND guild_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(guild_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find membership: {error}")))?
        .map(GuildMembership::try_from)
        .transpose()
    }

    async fn find_guild_membership_by_id(
        &self,
        membership_id: GuildMembershipId,
    ) -> AppResult<Option<GuildMembership>> {
        sqlx::query_as::<_, GuildMembershipRow>(
            r#"
            SELECT id, user_id, guild_id, rank, is_primary
            FROM guild_memberships
            WHERE id = $1
            "#,
        )
        .bind(membership_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find membership: {error}")))?
        .map(GuildMembership::try_from)
        .transpose()
    }

    async fn create_guild_membership(&self, membership: &GuildMembership) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO guild_memberships (id, user_id, guild_id, rank, is_primary)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, guild_id) DO NOTHING
            "#,
        )
        .bind(membership.id().as_uuid())
        .bind(membership.user_id().as_uuid())
        .bind(membership.guild_id().as_uuid())
        .bind(membership.rank().as_str())
        .bind(membership.is_primary())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create membership: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_rank(&self, membership_id: GuildMembershipId, rank: Rank) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE guild_memberships
            SET rank = $2
            WHERE id = $1
            "#,
        )
        .bind(membership_id.as_uuid())
        .bind(rank.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to set rank: {error}")))?;

        Ok(())
    }

    async fn set_primary_guild(&self, user_id: UserId, guild_id: GuildId) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            UPDATE guild_memberships
            SET is_primary = false
            WHERE user_id = $1
                AND guild_id <> $2
                AND is_primary
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(guild_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to clear primary membership: {error}"))
        })?;

        sqlx::query(
            r#"
            UPDATE guild_memberships
            SET is_primary = true
            WHERE user_id = $1
                AND guild_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(guild_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to set primary membership: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    async fn bind_guild_role(
        &self,
        membership_id: GuildMembershipId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_guild_roles (guild_membership_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (guild_membership_id, role_id) DO NOTHING
            "#,
        )
        .bind(membership_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind guild role: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn unbind_guild_role(
        &self,
        membership_id: GuildMembershipId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_guild_roles
            WHERE guild_membership_id = $1
                AND role_id = $2
            "#,
        )
        .bind(membership_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to unbind guild role: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn bind_cluster_role(
        &self,
        user_id: UserId,
        cluster_id: ClusterId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_cluster_roles (user_id, cluster_id, cluster_role_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, cluster_id, cluster_role_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(cluster_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind cluster role: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn unbind_cluster_role(
        &self,
        user_id: UserId,
        cluster_id: ClusterId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_cluster_roles
            WHERE user_id = $1
                AND cluster_id = $2
                AND cluster_role_id = $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(cluster_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to unbind cluster role: {error}"))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn link_guild_to_cluster(
        &self,
        guild_id: GuildId,
        cluster_id: ClusterId,
        make_primary: bool,
    ) -> AppResult<bool> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let result = sqlx::query(
            r#"
            INSERT INTO cluster_memberships (guild_id, cluster_id)
            VALUES ($1, $2)
            ON CONFLICT (guild_id, cluster_id) DO NOTHING
            "#,
        )
        .bind(guild_id.as_uuid())
        .bind(cluster_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to link guild to cluster: {error}"))
        })?;

        if make_primary {
            sqlx::query(
                r#"
                UPDATE guilds
                SET primary_cluster_id = $2
                WHERE id = $1
                "#,
            )
            .bind(guild_id.as_uuid())
            .bind(cluster_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to set primary cluster: {error}"))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn unlink_guild_from_cluster(
        &self,
        guild_id: GuildId,
        cluster_id: ClusterId,
    ) -> AppResult<bool> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let result = sqlx::query(
            r#"
            DELETE FROM cluster_memberships
            WHERE guild_id = $1
                AND cluster_id = $2
            "#,
        )
        .bind(guild_id.as_uuid())
        .bind(cluster_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to unlink guild from cluster: {error}"))
        })?;

        sqlx::query(
            r#"
            UPDATE guilds
            SET primary_cluster_id = NULL
            WHERE id = $1
                AND primary_cluster_id = $2
            "#,
        )
        .bind(guild_id.as_uuid())
        .bind(cluster_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to clear primary cluster: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_guild_clusters(&self, guild_id: GuildId) -> AppResult<Vec<ClusterMembership>> {
        let rows = sqlx::query_as::<_, ClusterMembershipRow>(
            r#"
            SELECT
                memberships.guild_id,
                memberships.cluster_id,
                COALESCE(guilds.primary_cluster_id = memberships.cluster_id, false) AS is_primary
            FROM cluster_memberships AS memberships
            INNER JOIN guilds
                ON guilds.id = memberships.guild_id
            WHERE memberships.guild_id = $1
            ORDER BY memberships.joined_at, memberships.cluster_id
            "#,
        )
        .bind(guild_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list guild clusters: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| ClusterMembership {
                guild_id: GuildId::from_uuid(row.guild_id),
                cluster_id: ClusterId::from_uuid(row.cluster_id),
                is_primary: row.is_primary,
            })
            .collect())
    }
}
