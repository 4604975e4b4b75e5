use std::sync::Arc;

use guildkeep_core::{AppError, AppResult, ClusterId, GuildId, GuildMembershipId, RoleId, UserId};
use guildkeep_domain::{
    AuditAction, ClusterMembership, ClusterScopeBinding, GuildMembership, GuildScopeBinding, Rank,
    Role, Scope, ScopeBinding,
};
use tracing::debug;

use crate::scope_checks::{ensure_scope_exists, ensure_user_exists, require_role};
use crate::{AuditEvent, AuditRepository, MembershipRepository, RoleRepository, ScopeDirectory};

/// Result of attaching a role to a user in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBindingOutcome {
    /// Binding target the role was attached to.
    pub binding: ScopeBinding,
    /// Bound role.
    pub role: Role,
    /// Whether a new binding row was written.
    pub created: bool,
}

/// Application service for guild memberships, user-role bindings and guild
/// participation in clusters.
#[derive(Clone)]
pub struct MembershipService {
    memberships: Arc<dyn MembershipRepository>,
    roles: Arc<dyn RoleRepository>,
    directory: Arc<dyn ScopeDirectory>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl MembershipService {
    /// Creates a new membership service.
    #[must_use]
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        roles: Arc<dyn RoleRepository>,
        directory: Arc<dyn ScopeDirectory>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            memberships,
            roles,
            directory,
            audit_repository,
        }
    }

    /// Returns the user's membership in the guild, creating it with the
    /// entry rank when absent.
    pub async fn ensure_membership(
        &self,
        actor: Option<UserId>,
        user_id: UserId,
        guild_id: GuildId,
    ) -> AppResult<GuildMembership> {
        ensure_user_exists(self.directory.as_ref(), user_id).await?;
        ensure_scope_exists(self.directory.as_ref(), Scope::Guild(guild_id)).await?;

        if let Some(existing) = self
            .memberships
            .find_guild_membership(user_id, guild_id)
            .await?
        {
            return Ok(existing);
        }

        let membership = GuildMembership::new(
            GuildMembershipId::new(),
            user_id,
            guild_id,
            Rank::default(),
            false,
        );
        if !self.memberships.create_guild_membership(&membership).await? {
            debug!(%user_id, %guild_id, "membership created concurrently");
            return self
                .memberships
                .find_guild_membership(user_id, guild_id)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "membership of user '{user_id}' in guild '{guild_id}' vanished after insert"
                    ))
                });
        }

        self.audit_repository
            .append_event(AuditEvent {
                scope: Some(Scope::Guild(guild_id)),
                actor,
                action: AuditAction::MembershipCreated,
                resource_type: "guild_membership".to_owned(),
                resource_id: membership.id().to_string(),
                detail: Some(format!(
                    "user '{user_id}' joined with rank {}",
                    membership.rank().as_str()
                )),
            })
            .await?;

        Ok(membership)
    }

    /// Attaches a system role or a role owned by the membership's guild.
    pub async fn bind_role(
        &self,
        actor: Option<UserId>,
        membership_id: GuildMembershipId,
        role_id: RoleId,
    ) -> AppResult<RoleBindingOutcome> {
        let membership = self.require_membership(membership_id).await?;
        let role = require_role(self.roles.as_ref(), role_id).await?;
        let binding = ScopeBinding::Guild(GuildScopeBinding::from(&membership));
        binding.ensure_role_fits(&role)?;

        let created = self
            .memberships
            .bind_guild_role(membership_id, role_id)
            .await?;
        if created {
            self.append_binding_event(actor, AuditAction::RoleBound, &binding, &role)
                .await?;
        }

        Ok(RoleBindingOutcome {
            binding,
            role,
            created,
        })
    }

    /// Detaches a role from a guild membership. Rank and membership remain.
    pub async fn unbind_role(
        &self,
        actor: Option<UserId>,
        membership_id: GuildMembershipId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let membership = self.require_membership(membership_id).await?;
        let removed = self
            .memberships
            .unbind_guild_role(membership_id, role_id)
            .await?;

        if removed && let Some(role) = self.roles.find_role(role_id).await? {
            let binding = ScopeBinding::Guild(GuildScopeBinding::from(&membership));
            self.append_binding_event(actor, AuditAction::RoleUnbound, &binding, &role)
                .await?;
        }

        Ok(removed)
    }

    /// Attaches a system role or a role owned by the cluster. Holding any
    /// cluster role is what makes the user a participant of the cluster.
    pub async fn bind_cluster_role(
        &self,
        actor: Option<UserId>,
        user_id: UserId,
        cluster_id: ClusterId,
        role_id: RoleId,
    ) -> AppResult<RoleBindingOutcome> {
        ensure_user_exists(self.directory.as_ref(), user_id).await?;
        ensure_scope_exists(self.directory.as_ref(), Scope::Cluster(cluster_id)).await?;
        let role = require_role(self.roles.as_ref(), role_id).await?;
        let binding = ScopeBinding::Cluster(ClusterScopeBinding {
            user_id,
            cluster_id,
        });
        binding.ensure_role_fits(&role)?;

        let created = self
            .memberships
            .bind_cluster_role(user_id, cluster_id, role_id)
            .await?;
        if created {
            self.append_binding_event(actor, AuditAction::RoleBound, &binding, &role)
                .await?;
        }

        Ok(RoleBindingOutcome {
            binding,
            role,
            created,
        })
    }

    /// Detaches a role from a user inside a cluster.
    pub async fn unbind_cluster_role(
        &self,
        actor: Option<UserId>,
        user_id: UserId,
        cluster_id: ClusterId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let removed = self
            .memberships
            .unbind_cluster_role(user_id, cluster_id, role_id)
            .await?;

        if removed && let Some(role) = self.roles.find_role(role_id).await? {
            let binding = ScopeBinding::Cluster(ClusterScopeBinding {
                user_id,
                cluster_id,
            });
            self.append_binding_event(actor, AuditAction::RoleUnbound, &binding, &role)
                .await?;
        }

        Ok(removed)
    }

    /// Changes a member's prestige rank. Role bindings are untouched.
    pub async fn set_rank(
        &self,
        actor: Option<UserId>,
        membership_id: GuildMembershipId,
        rank: Rank,
    ) -> AppResult<GuildMembership> {
        let membership = self.require_membership(membership_id).await?;
        if membership.rank() == rank {
            return Ok(membership);
        }

        self.memberships.set_rank(membership_id, rank).await?;

        self.audit_repository
            .append_event(AuditEvent {
                scope: Some(Scope::Guild(membership.guild_id())),
                actor,
                action: AuditAction::MembershipRankChanged,
                resource_type: "guild_membership".to_owned(),
                resource_id: membership_id.to_string(),
                detail: Some(format!(
                    "rank changed from {} to {}",
                    membership.rank().as_str(),
                    rank.as_str()
                )),
            })
            .await?;

        Ok(GuildMembership::new(
            membership.id(),
            membership.user_id(),
            membership.guild_id(),
            rank,
            membership.is_primary(),
        ))
    }

    /// Marks the guild as the user's primary guild. Already primary is a no-op.
    pub async fn set_primary_guild(
        &self,
        actor: Option<UserId>,
        user_id: UserId,
        guild_id: GuildId,
    ) -> AppResult<()> {
        let membership = self
            .memberships
            .find_guild_membership(user_id, guild_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user '{user_id}' is not a member of guild '{guild_id}'"
                ))
            })?;
        if membership.is_primary() {
            return Ok(());
        }

        self.memberships.set_primary_guild(user_id, guild_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                scope: Some(Scope::Guild(guild_id)),
                actor,
                action: AuditAction::MembershipPrimaryChanged,
                resource_type: "guild_membership".to_owned(),
                resource_id: membership.id().to_string(),
                detail: Some(format!("primary guild of user '{user_id}'")),
            })
            .await
    }

    /// Records that a guild participates in a cluster. With `make_primary`
    /// the cluster also becomes the guild's primary, for new and existing
    /// links alike.
    pub async fn link_guild_to_cluster(
        &self,
        actor: Option<UserId>,
        guild_id: GuildId,
        cluster_id: ClusterId,
        make_primary: bool,
    ) -> AppResult<bool> {
        ensure_scope_exists(self.directory.as_ref(), Scope::Guild(guild_id)).await?;
        ensure_scope_exists(self.directory.as_ref(), Scope::Cluster(cluster_id)).await?;

        let was_primary = make_primary
            && self
                .memberships
                .list_guild_clusters(guild_id)
                .await?
                .iter()
                .any(|link| link.cluster_id == cluster_id && link.is_primary);

        let created = self
            .memberships
            .link_guild_to_cluster(guild_id, cluster_id, make_primary)
            .await?;
        let action = if created {
            AuditAction::ClusterGuildLinked
        } else if make_primary && !was_primary {
            AuditAction::ClusterPrimaryChanged
        } else {
            return Ok(false);
        };

        self.audit_repository
            .append_event(AuditEvent {
                scope: Some(Scope::Cluster(cluster_id)),
                actor,
                action,
                resource_type: "cluster_membership".to_owned(),
                resource_id: format!("{guild_id}:{cluster_id}"),
                detail: make_primary.then(|| "linked as primary cluster".to_owned()),
            })
            .await?;

        Ok(created)
    }

    /// Removes a guild from a cluster.
    pub async fn unlink_guild_from_cluster(
        &self,
        actor: Option<UserId>,
        guild_id: GuildId,
        cluster_id: ClusterId,
    ) -> AppResult<bool> {
        let removed = self
            .memberships
            .unlink_guild_from_cluster(guild_id, cluster_id)
            .await?;
        if removed {
            self.audit_repository
                .append_event(AuditEvent {
                    scope: Some(Scope::Cluster(cluster_id)),
                    actor,
                    action: AuditAction::ClusterGuildUnlinked,
                    resource_type: "cluster_membership".to_owned(),
                    resource_id: format!("{guild_id}:{cluster_id}"),
                    detail: None,
                })
                .await?;
        }

        Ok(removed)
    }

    /// Lists the clusters a guild participates in.
    pub async fn list_guild_clusters(
        &self,
        guild_id: GuildId,
    ) -> AppResult<Vec<ClusterMembership>> {
        self.memberships.list_guild_clusters(guild_id).await
    }

    async fn require_membership(
        &self,
        membership_id: GuildMembershipId,
    ) -> AppResult<GuildMembership> {
        self.memberships
            .find_guild_membership_by_id(membership_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("guild membership '{membership_id}' does not exist"))
            })
    }

    async fn append_binding_event(
        &self,
        actor: Option<UserId>,
        action: AuditAction,
        binding: &ScopeBinding,
        role: &Role,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                scope: Some(binding.scope()),
                actor,
                action,
                resource_type: "role_binding".to_owned(),
                resource_id: binding.resource_id(role),
                detail: Some(format!(
                    "role '{}' for user '{}'",
                    role.name(),
                    binding.user_id()
                )),
            })
            .await
    }
}
