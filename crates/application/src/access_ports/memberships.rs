use async_trait::async_trait;
use guildkeep_core::{AppResult, ClusterId, GuildId, GuildMembershipId, RoleId, UserId};
use guildkeep_domain::{ClusterMembership, GuildMembership, Rank};

/// Repository port for guild memberships, user-role bindings and guild to
/// cluster links.
///
/// Every bind/link write is idempotent and reports whether it changed a row.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Finds the membership of a user in a guild.
    async fn find_guild_membership(
        &self,
        user_id: UserId,
        guild_id: GuildId,
    ) -> AppResult<Option<GuildMembership>>;

    /// Finds a membership by identifier.
    async fn find_guild_membership_by_id(
        &self,
        membership_id: GuildMembershipId,
    ) -> AppResult<Option<GuildMembership>>;

    /// Inserts a membership unless the user already belongs to the guild.
    async fn create_guild_membership(&self, membership: &GuildMembership) -> AppResult<bool>;

    /// Changes the prestige rank of a membership.
    async fn set_rank(&self, membership_id: GuildMembershipId, rank: Rank) -> AppResult<()>;

    /// Marks one membership as primary and clears the flag on the user's others.
    async fn set_primary_guild(&self, user_id: UserId, guild_id: GuildId) -> AppResult<()>;

    /// Attaches a role to a guild membership.
    async fn bind_guild_role(
        &self,
        membership_id: GuildMembershipId,
        role_id: RoleId,
    ) -> AppResult<bool>;

    /// Detaches a role from a guild membership.
    async fn unbind_guild_role(
        &self,
        membership_id: GuildMembershipId,
        role_id: RoleId,
    ) -> AppResult<bool>;

    /// Attaches a role to a user inside a cluster.
    async fn bind_cluster_role(
        &self,
        user_id: UserId,
        cluster_id: ClusterId,
        role_id: RoleId,
    ) -> AppResult<bool>;

    /// Detaches a role from a user inside a cluster.
    async fn unbind_cluster_role(
        &self,
        user_id: UserId,
        cluster_id: ClusterId,
        role_id: RoleId,
    ) -> AppResult<bool>;

    /// Records that a guild participates in a cluster.
    async fn link_guild_to_cluster(
        &self,
        guild_id: GuildId,
        cluster_id: ClusterId,
        make_primary: bool,
    ) -> AppResult<bool>;

    /// Removes a guild from a cluster and clears a primary pointer naming it.
    async fn unlink_guild_from_cluster(
        &self,
        guild_id: GuildId,
        cluster_id: ClusterId,
    ) -> AppResult<bool>;

    /// Lists the clusters a guild participates in.
    async fn list_guild_clusters(&self, guild_id: GuildId) -> AppResult<Vec<ClusterMembership>>;
}
