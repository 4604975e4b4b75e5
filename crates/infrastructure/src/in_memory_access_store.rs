use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use guildkeep_application::{AuditEvent, AuditRepository, ScopeDirectory};
use guildkeep_core::{
    AppError, AppResult, ClusterId, GuildId, GuildMembershipId, PermissionId, RoleId, UserId,
};
use guildkeep_domain::{ClusterRoleSetting, GuildMembership, Permission, Role};

mod authorization;
mod catalog;
mod hierarchy;
mod memberships;
mod roles;


#[derive(Debug, Clone, Copy)]
struct GrantRecord {
    assigned_by: Option<UserId>,
    granted_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct AccessState {
    users: HashSet<UserId>,
    guilds: HashSet<GuildId>,
    clusters: HashSet<ClusterId>,
    permissions: HashMap<PermissionId, Permission>,
    roles: HashMap<RoleId, Role>,
    grants: BTreeMap<(RoleId, PermissionId), GrantRecord>,
    memberships: HashMap<GuildMembershipId, GuildMembership>,
    guild_bindings: BTreeSet<(GuildMembershipId, RoleId)>,
    cluster_bindings: BTreeSet<(UserId, ClusterId, RoleId)>,
    cluster_links: BTreeMap<(GuildId, ClusterId), DateTime<Utc>>,
    primary_clusters: HashMap<GuildId, ClusterId>,
    settings: BTreeMap<(ClusterId, RoleId), ClusterRoleSetting>,
    audit_events: Vec<AuditEvent>,
}

impl AccessState {
    fn sorted_roles<'a>(roles: impl Iterator<Item = &'a Role>) -> Vec<Role> {
        let mut roles = roles.cloned().collect::<Vec<_>>();
        roles.sort_by_key(|role| (role.created_at(), role.id()));
        roles
    }

    fn ensure_assigner_known(&self, assigned_by: Option<UserId>) -> AppResult<()> {
        match assigned_by {
            Some(user_id) if !self.users.contains(&user_id) => Err(AppError::UnknownUser(
                format!("assigning user '{user_id}' does not exist"),
            )),
            _ => Ok(()),
        }
    }
}

/// In-memory implementation of every access port.
///
/// All tables live behind one lock so cascades and multi-row updates are
/// atomic, matching the transactional PostgreSQL adapter.
#[derive(Debug, Default)]
pub struct InMemoryAccessStore {
    state: RwLock<AccessState>,
}

impl InMemoryAccessStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a platform user so directory lookups find it.
    pub async fn register_user(&self, user_id: UserId) {
        self.state.write().await.users.insert(user_id);
    }

    /// Registers a platform guild so directory lookups find it.
    pub async fn register_guild(&self, guild_id: GuildId) {
        self.state.write().await.guilds.insert(guild_id);
    }

    /// Registers a platform cluster so directory lookups find it.
    pub async fn register_cluster(&self, cluster_id: ClusterId) {
        self.state.write().await.clusters.insert(cluster_id);
    }

    /// Returns the audit events appended so far, oldest first.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.read().await.audit_events.clone()
    }
}

#[async_trait]
impl ScopeDirectory for InMemoryAccessStore {
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool> {
        Ok(self.state.read().await.users.contains(&user_id))
    }

    async fn guild_exists(&self, guild_id: GuildId) -> AppResult<bool> {
        Ok(self.state.read().await.guilds.contains(&guild_id))
    }

    async fn cluster_exists(&self, cluster_id: ClusterId) -> AppResult<bool> {
        Ok(self.state.read().await.clusters.contains(&cluster_id))
    }
}

#[async_trait]
impl AuditRepository for InMemoryAccessStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.audit_events.push(event);
        Ok(())
    }
}
