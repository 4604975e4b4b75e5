use guildkeep_core::{AppError, AppResult, RoleId, UserId};
use guildkeep_domain::{Role, Scope};

use crate::{RoleRepository, ScopeDirectory};

pub(crate) async fn ensure_user_exists(
    directory: &dyn ScopeDirectory,
    user_id: UserId,
) -> AppResult<()> {
    if directory.user_exists(user_id).await? {
        return Ok(());
    }

    Err(AppError::UnknownUser(format!("user '{user_id}' does not exist")))
}

/// Checks an acting user that gets persisted on the written row.
pub(crate) async fn ensure_actor_exists(
    directory: &dyn ScopeDirectory,
    actor: Option<UserId>,
) -> AppResult<()> {
    match actor {
        Some(user_id) => ensure_user_exists(directory, user_id).await,
        None => Ok(()),
    }
}

pub(crate) async fn ensure_scope_exists(
    directory: &dyn ScopeDirectory,
    scope: Scope,
) -> AppResult<()> {
    let exists = match scope {
        Scope::Guild(guild_id) => directory.guild_exists(guild_id).await?,
        Scope::Cluster(cluster_id) => directory.cluster_exists(cluster_id).await?,
    };

    if exists {
        return Ok(());
    }

    Err(AppError::InvalidScope(format!("{scope} does not exist")))
}

pub(crate) async fn require_role(roles: &dyn RoleRepository, role_id: RoleId) -> AppResult<Role> {
    roles
        .find_role(role_id)
        .await?
        .ok_or_else(|| AppError::UnknownRole(format!("role '{role_id}' does not exist")))
}
