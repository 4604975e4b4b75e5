use guildkeep_application::MembershipRepository;
use guildkeep_core::AppError;
use guildkeep_domain::{ClusterMembership, Rank};

use super::*;

fn membership_not_found(membership_id: GuildMembershipId) -> AppError {
    AppError::NotFound(format!("guild membership '{membership_id}' does not exist"))
}

#[async_trait]
impl MembershipRepository for InMemoryAccessStore {
    async fn find_guild_membership(
        &self,
        user_id: UserId,
        guild_id: GuildId,
    ) -> AppResult<Option<GuildMembership>> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .values()
            .find(|membership| {
                membership.user_id() == user_id && membership.guild_id() == guild_id
            })
            .cloned())
    }

    async fn find_guild_membership_by_id(
        &self,
        membership_id: GuildMembershipId,
    ) -> AppResult<Option<GuildMembership>> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .get(&membership_id)
            .cloned())
    }

    async fn create_guild_membership(&self, membership: &GuildMembership) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let exists = state.memberships.values().any(|existing| {
            existing.user_id() == membership.user_id()
                && existing.guild_id() == membership.guild_id()
        });
        if exists {
            return Ok(false);
        }

        state.memberships.insert(membership.id(), membership.clone());
        Ok(true)
    }

    async fn set_rank(&self, membership_id: GuildMembershipId, rank: Rank) -> AppResult<()> {
        let mut state = self.state.write().await;
        let membership = state
            .memberships
            .get_mut(&membership_id)
            .ok_or_else(|| membership_not_found(membership_id))?;

        *membership = GuildMembership::new(
            membership.id(),
            membership.user_id(),
            membership.guild_id(),
            rank,
            membership.is_primary(),
        );
        Ok(())
    }

    async fn set_primary_guild(&self, user_id: UserId, guild_id: GuildId) -> AppResult<()> {
        let mut state = self.state.write().await;
        for membership in state
            .memberships
            .values_mut()
            .filter(|membership| membership.user_id() == user_id)
        {
            *membership = GuildMembership::new(
                membership.id(),
                membership.user_id(),
                membership.guild_id(),
                membership.rank(),
                membership.guild_id() == guild_id,
            );
        }
        Ok(())
    }

    async fn bind_guild_role(
        &self,
        membership_id: GuildMembershipId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if !state.memberships.contains_key(&membership_id) {
            return Err(membership_not_found(membership_id));
        }

        Ok(state.guild_bindings.insert((membership_id, role_id)))
    }

    async fn unbind_guild_role(
        &self,
        membership_id: GuildMembershipId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .guild_bindings
            .remove(&(membership_id, role_id)))
    }

    async fn bind_cluster_role(
        &self,
        user_id: UserId,
        cluster_id: ClusterId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .cluster_bindings
            .insert((user_id, cluster_id, role_id)))
    }

    async fn unbind_cluster_role(
        &self,
        user_id: UserId,
        cluster_id: ClusterId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .cluster_bindings
            .remove(&(user_id, cluster_id, role_id)))
    }

    async fn link_guild_to_cluster(
        &self,
        guild_id: GuildId,
        cluster_id: ClusterId,
        make_primary: bool,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let created = !state.cluster_links.contains_key(&(guild_id, cluster_id));
        if created {
            state
                .cluster_links
                .insert((guild_id, cluster_id), Utc::now());
        }
        if make_primary {
            state.primary_clusters.insert(guild_id, cluster_id);
        }

        Ok(created)
    }

    async fn unlink_guild_from_cluster(
        &self,
        guild_id: GuildId,
        cluster_id: ClusterId,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.cluster_links.remove(&(guild_id, cluster_id)).is_some();
        if state.primary_clusters.get(&guild_id) == Some(&cluster_id) {
            state.primary_clusters.remove(&guild_id);
        }

        Ok(removed)
    }

    async fn list_guild_clusters(&self, guild_id: GuildId) -> AppResult<Vec<ClusterMembership>> {
        let state = self.state.read().await;
        let primary = state.primary_clusters.get(&guild_id).copied();
        let mut links = state
            .cluster_links
            .iter()
            .filter(|((linked_guild, _), _)| *linked_guild == guild_id)
            .map(|((_, cluster_id), joined_at)| (*joined_at, *cluster_id))
            .collect::<Vec<_>>();
        links.sort();

        Ok(links
            .into_iter()
            .map(|(_, cluster_id)| ClusterMembership {
                guild_id,
                cluster_id,
                is_primary: primary == Some(cluster_id),
            })
            .collect())
    }
}
