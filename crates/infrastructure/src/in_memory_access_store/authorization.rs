use guildkeep_application::AuthorizationRepository;
use guildkeep_domain::{RoleGrant, Scope};

use super::*;

impl AccessState {
    /// Roles bound to the user in the scope that are valid there.
    fn bound_role_ids(&self, user_id: UserId, scope: Scope) -> Vec<RoleId> {
        let candidates = match scope {
            Scope::Guild(guild_id) => {
                let Some(membership) = self.memberships.values().find(|membership| {
                    membership.user_id() == user_id && membership.guild_id() == guild_id
                }) else {
                    return Vec::new();
                };

                self.guild_bindings
                    .iter()
                    .filter(|(bound_membership, _)| *bound_membership == membership.id())
                    .map(|(_, role_id)| *role_id)
                    .collect::<Vec<_>>()
            }
            Scope::Cluster(cluster_id) => self
                .cluster_bindings
                .iter()
                .filter(|(bound_user, bound_cluster, _)| {
                    *bound_user == user_id && *bound_cluster == cluster_id
                })
                .map(|(_, _, role_id)| *role_id)
                .collect::<Vec<_>>(),
        };

        candidates
            .into_iter()
            .filter(|role_id| {
                self.roles
                    .get(role_id)
                    .is_some_and(|role| role.fits_scope(scope))
            })
            .collect()
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAccessStore {
    async fn list_role_grants(&self, user_id: UserId, scope: Scope) -> AppResult<Vec<RoleGrant>> {
        let state = self.state.read().await;
        let mut grants = Vec::new();

        for role_id in state.bound_role_ids(user_id, scope) {
            let Some(role) = state.roles.get(&role_id) else {
                continue;
            };

            for (_, permission_id) in state
                .grants
                .keys()
                .filter(|(granted_to, _)| *granted_to == role_id)
            {
                if let Some(permission) = state.permissions.get(permission_id) {
                    grants.push(RoleGrant {
                        role_id,
                        role_name: role.name().as_str().to_owned(),
                        permission_key: permission.key().clone(),
                    });
                }
            }
        }

        Ok(grants)
    }

    async fn list_bound_roles(&self, user_id: UserId, scope: Scope) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let bound = state.bound_role_ids(user_id, scope);

        Ok(AccessState::sorted_roles(
            bound.iter().filter_map(|role_id| state.roles.get(role_id)),
        ))
    }
}
