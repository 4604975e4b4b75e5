use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guildkeep_core::{
    AppError, AppResult, ClusterId, GuildId, GuildMembershipId, PermissionId, RoleId, UserId,
};
use guildkeep_domain::{
    ClusterMembership, ClusterRoleSetting, GuildMembership, Permission, PermissionSeed, Rank,
    Role, RoleScope, SystemRoleSeed,
};
use tokio::sync::Mutex;

use crate::{
    AuditEvent, AuditRepository, ClusterRoleSettingRepository, MembershipRepository,
    PermissionCatalogRepository, RolePermissionGrant, RolePermissionRepository, RoleRepository,
    ScopeDirectory,
};

#[derive(Default)]
struct FakeState {
    users: HashSet<UserId>,
    guilds: HashSet<GuildId>,
    clusters: HashSet<ClusterId>,
    permissions: Vec<Permission>,
    roles: Vec<Role>,
    grants: Vec<(RoleId, PermissionId, Option<UserId>, DateTime<Utc>)>,
    memberships: Vec<GuildMembership>,
    guild_roles: Vec<(GuildMembershipId, RoleId)>,
    cluster_roles: Vec<(UserId, ClusterId, RoleId)>,
    links: Vec<ClusterMembership>,
    settings: Vec<ClusterRoleSetting>,
    events: Vec<AuditEvent>,
    lose_next_membership_insert: bool,
}

/// Single fake backing every write-side port in service tests.
#[derive(Default)]
pub(crate) struct FakeAccessStore {
    state: Mutex<FakeState>,
}

impl FakeAccessStore {
    pub(crate) async fn add_user(&self) -> UserId {
        let user_id = UserId::new();
        self.state.lock().await.users.insert(user_id);
        user_id
    }

    pub(crate) async fn add_guild(&self) -> GuildId {
        let guild_id = GuildId::new();
        self.state.lock().await.guilds.insert(guild_id);
        guild_id
    }

    pub(crate) async fn add_cluster(&self) -> ClusterId {
        let cluster_id = ClusterId::new();
        self.state.lock().await.clusters.insert(cluster_id);
        cluster_id
    }

    /// Makes the next membership insert lose to a concurrent writer: a rival
    /// row is stored and the insert reports `false`.
    pub(crate) async fn lose_next_membership_insert(&self) {
        self.state.lock().await.lose_next_membership_insert = true;
    }

    pub(crate) async fn events(&self) -> Vec<AuditEvent> {
        self.state.lock().await.events.clone()
    }

    pub(crate) async fn guild_role_count(&self) -> usize {
        self.state.lock().await.guild_roles.len()
    }

    pub(crate) async fn cluster_role_count(&self) -> usize {
        self.state.lock().await.cluster_roles.len()
    }
}

#[async_trait]
impl AuditRepository for FakeAccessStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.lock().await.events.push(event);
        Ok(())
    }
}

#[async_trait]
impl ScopeDirectory for FakeAccessStore {
    async fn user_exists(&self, user_id: UserId) -> AppResult<bool> {
        Ok(self.state.lock().await.users.contains(&user_id))
    }

    async fn guild_exists(&self, guild_id: GuildId) -> AppResult<bool> {
        Ok(self.state.lock().await.guilds.contains(&guild_id))
    }

    async fn cluster_exists(&self, cluster_id: ClusterId) -> AppResult<bool> {
        Ok(self.state.lock().await.clusters.contains(&cluster_id))
    }
}

#[async_trait]
impl PermissionCatalogRepository for FakeAccessStore {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self.state.lock().await.permissions.clone())
    }

    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .lock()
            .await
            .permissions
            .iter()
            .find(|permission| permission.id() == permission_id)
            .cloned())
    }

    async fn find_permission_by_key(&self, key: &str) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .lock()
            .await
            .permissions
            .iter()
            .find(|permission| permission.key().as_str() == key)
            .cloned())
    }

    async fn upsert_permission(&self, seed: &PermissionSeed) -> AppResult<Permission> {
        let mut state = self.state.lock().await;
        let id = state
            .permissions
            .iter()
            .find(|permission| permission.key() == &seed.key)
            .map(Permission::id)
            .unwrap_or_default();
        let permission =
            Permission::new(id, seed.key.clone(), seed.description.clone(), seed.group);
        state.permissions.retain(|existing| existing.id() != id);
        state.permissions.push(permission.clone());
        Ok(permission)
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state
            .grants
            .iter()
            .any(|(_, granted, _, _)| *granted == permission_id)
        {
            return Err(AppError::PermissionInUse(format!(
                "permission '{permission_id}' is still granted"
            )));
        }
        state
            .permissions
            .retain(|permission| permission.id() != permission_id);
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for FakeAccessStore {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .find(|role| role.id() == role_id)
            .cloned())
    }

    async fn find_role_by_name(&self, scope: RoleScope, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .find(|role| role.scope() == scope && role.name().as_str() == name)
            .cloned())
    }

    async fn list_roles(&self, scope: RoleScope) -> AppResult<Vec<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .filter(|role| role.scope() == scope)
            .cloned()
            .collect())
    }

    async fn create_role(&self, role: &Role) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state
            .roles
            .iter()
            .any(|existing| existing.scope() == role.scope() && existing.name() == role.name())
        {
            return Err(AppError::DuplicateRoleName(role.name().to_string()));
        }
        state.roles.push(role.clone());
        Ok(())
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state
            .roles
            .iter_mut()
            .find(|existing| existing.id() == role.id())
        {
            *existing = role.clone();
        }
        Ok(())
    }

    async fn upsert_system_role(&self, seed: &SystemRoleSeed) -> AppResult<Role> {
        let mut state = self.state.lock().await;
        let existing = state
            .roles
            .iter()
            .find(|role| role.is_system_role() && role.name() == &seed.name)
            .map(|role| (role.id(), role.created_at()));
        let (id, created_at) = existing.unwrap_or_else(|| (RoleId::new(), Utc::now()));
        let role = Role::new(
            id,
            seed.name.as_str(),
            seed.description.clone(),
            RoleScope::System,
            seed.is_default,
            created_at,
        )?;
        state.roles.retain(|stored| stored.id() != id);
        state.roles.push(role.clone());
        Ok(role)
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.roles.retain(|role| role.id() != role_id);
        state.grants.retain(|(granted, _, _, _)| *granted != role_id);
        state.guild_roles.retain(|(_, bound)| *bound != role_id);
        state.cluster_roles.retain(|(_, _, bound)| *bound != role_id);
        state
            .settings
            .retain(|setting| setting.role_id() != role_id);
        Ok(())
    }
}

#[async_trait]
impl RolePermissionRepository for FakeAccessStore {
    async fn grant_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        assigned_by: Option<UserId>,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state
            .grants
            .iter()
            .any(|(role, permission, _, _)| *role == role_id && *permission == permission_id)
        {
            return Ok(false);
        }
        state
            .grants
            .push((role_id, permission_id, assigned_by, Utc::now()));
        Ok(true)
    }

    async fn revoke_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.grants.len();
        state
            .grants
            .retain(|(role, permission, _, _)| !(*role == role_id && *permission == permission_id));
        Ok(state.grants.len() != before)
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<RolePermissionGrant>> {
        let state = self.state.lock().await;
        let mut grants = state
            .grants
            .iter()
            .filter(|(role, _, _, _)| *role == role_id)
            .filter_map(|(role, permission_id, assigned_by, granted_at)| {
                state
                    .permissions
                    .iter()
                    .find(|permission| permission.id() == *permission_id)
                    .map(|permission| RolePermissionGrant {
                        role_id: *role,
                        permission: permission.clone(),
                        assigned_by: *assigned_by,
                        granted_at: *granted_at,
                    })
            })
            .collect::<Vec<_>>();
        grants.sort_by(|left, right| left.permission.key().cmp(right.permission.key()));
        Ok(grants)
    }
}

#[async_trait]
impl MembershipRepository for FakeAccessStore {
    async fn find_guild_membership(
        &self,
        user_id: UserId,
        guild_id: GuildId,
    ) -> AppResult<Option<GuildMembership>> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .iter()
            .find(|membership| membership.user_id() == user_id && membership.guild_id() == guild_id)
            .cloned())
    }

    async fn find_guild_membership_by_id(
        &self,
        membership_id: GuildMembershipId,
    ) -> AppResult<Option<GuildMembership>> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .iter()
            .find(|membership| membership.id() == membership_id)
            .cloned())
    }

    async fn create_guild_membership(&self, membership: &GuildMembership) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.memberships.iter().any(|existing| {
            existing.user_id() == membership.user_id()
                && existing.guild_id() == membership.guild_id()
        }) {
            return Ok(false);
        }
        if std::mem::take(&mut state.lose_next_membership_insert) {
            state.memberships.push(GuildMembership::new(
                GuildMembershipId::new(),
                membership.user_id(),
                membership.guild_id(),
                membership.rank(),
                false,
            ));
            return Ok(false);
        }
        state.memberships.push(membership.clone());
        Ok(true)
    }

    async fn set_rank(&self, membership_id: GuildMembershipId, rank: Rank) -> AppResult<()> {
        let mut state = self.state.lock().await;
        for membership in &mut state.memberships {
            if membership.id() == membership_id {
                *membership = GuildMembership::new(
                    membership.id(),
                    membership.user_id(),
                    membership.guild_id(),
                    rank,
                    membership.is_primary(),
                );
            }
        }
        Ok(())
    }

    async fn set_primary_guild(&self, user_id: UserId, guild_id: GuildId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        for membership in &mut state.memberships {
            if membership.user_id() == user_id {
                *membership = GuildMembership::new(
                    membership.id(),
                    membership.user_id(),
                    membership.guild_id(),
                    membership.rank(),
                    membership.guild_id() == guild_id,
                );
            }
        }
        Ok(())
    }

    async fn bind_guild_role(
        &self,
        membership_id: GuildMembershipId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.guild_roles.contains(&(membership_id, role_id)) {
            return Ok(false);
        }
        state.guild_roles.push((membership_id, role_id));
        Ok(true)
    }

    async fn unbind_guild_role(
        &self,
        membership_id: GuildMembershipId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.guild_roles.len();
        state
            .guild_roles
            .retain(|binding| *binding != (membership_id, role_id));
        Ok(state.guild_roles.len() != before)
    }

    async fn bind_cluster_role(
        &self,
        user_id: UserId,
        cluster_id: ClusterId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.cluster_roles.contains(&(user_id, cluster_id, role_id)) {
            return Ok(false);
        }
        state.cluster_roles.push((user_id, cluster_id, role_id));
        Ok(true)
    }

    async fn unbind_cluster_role(
        &self,
        user_id: UserId,
        cluster_id: ClusterId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.cluster_roles.len();
        state
            .cluster_roles
            .retain(|binding| *binding != (user_id, cluster_id, role_id));
        Ok(state.cluster_roles.len() != before)
    }

    async fn link_guild_to_cluster(
        &self,
        guild_id: GuildId,
        cluster_id: ClusterId,
        make_primary: bool,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if make_primary {
            for link in &mut state.links {
                if link.guild_id == guild_id {
                    link.is_primary = link.cluster_id == cluster_id;
                }
            }
        }
        if state
            .links
            .iter()
            .any(|link| link.guild_id == guild_id && link.cluster_id == cluster_id)
        {
            return Ok(false);
        }
        state.links.push(ClusterMembership {
            guild_id,
            cluster_id,
            is_primary: make_primary,
        });
        Ok(true)
    }

    async fn unlink_guild_from_cluster(
        &self,
        guild_id: GuildId,
        cluster_id: ClusterId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.links.len();
        state
            .links
            .retain(|link| !(link.guild_id == guild_id && link.cluster_id == cluster_id));
        Ok(state.links.len() != before)
    }

    async fn list_guild_clusters(&self, guild_id: GuildId) -> AppResult<Vec<ClusterMembership>> {
        Ok(self
            .state
            .lock()
            .await
            .links
            .iter()
            .filter(|link| link.guild_id == guild_id)
            .copied()
            .collect())
    }
}

#[async_trait]
impl ClusterRoleSettingRepository for FakeAccessStore {
    async fn save_setting(&self, setting: &ClusterRoleSetting) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.settings.retain(|existing| {
            !(existing.cluster_id() == setting.cluster_id()
                && existing.role_id() == setting.role_id())
        });
        state.settings.push(setting.clone());
        Ok(())
    }

    async fn remove_setting(&self, cluster_id: ClusterId, role_id: RoleId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.settings.len();
        state.settings.retain(|setting| {
            !(setting.cluster_id() == cluster_id && setting.role_id() == role_id)
        });
        Ok(state.settings.len() != before)
    }

    async fn list_settings(&self, cluster_id: ClusterId) -> AppResult<Vec<ClusterRoleSetting>> {
        Ok(self
            .state
            .lock()
            .await
            .settings
            .iter()
            .filter(|setting| setting.cluster_id() == cluster_id)
            .cloned()
            .collect())
    }

    async fn list_cluster_roles(&self, cluster_id: ClusterId) -> AppResult<Vec<Role>> {
        let state = self.state.lock().await;
        Ok(state
            .roles
            .iter()
            .filter(|role| match role.scope() {
                RoleScope::Cluster(owner) => owner == cluster_id,
                RoleScope::Guild(_) => false,
                RoleScope::System => {
                    state.cluster_roles.iter().any(|(_, cluster, bound)| {
                        *cluster == cluster_id && *bound == role.id()
                    }) || state.settings.iter().any(|setting| {
                        setting.cluster_id() == cluster_id && setting.role_id() == role.id()
                    })
                }
            })
            .cloned()
            .collect())
    }
}
