use chrono::Utc;
use guildkeep_application::{
    AuthorizationRepository, ClusterRoleSettingRepository, MembershipRepository,
    PermissionCatalogRepository, RolePermissionRepository, RoleRepository,
};
use guildkeep_core::{AppError, ClusterId, GuildId, GuildMembershipId, RoleId, UserId};
use guildkeep_domain::{
    ClusterRoleSetting, GuildMembership, Permission, PermissionGroup, PermissionSeed, Rank, Role,
    RoleScope, Scope, SystemRoleSeed,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresRoleRepository;
use crate::{
    PostgresAuthorizationRepository, PostgresClusterRoleSettingRepository,
    PostgresMembershipRepository, PostgresPermissionCatalogRepository,
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres role tests: {error}");
    }

    Some(pool)
}

async fn insert_directory_row(pool: &PgPool, table: &str, id: Uuid) {
    let statement = match table {
        "users" => "INSERT INTO users (id, display_name) VALUES ($1, 'test user')",
        "guilds" => "INSERT INTO guilds (id, name) VALUES ($1, 'test guild')",
        _ => "INSERT INTO clusters (id, name) VALUES ($1, 'test cluster')",
    };

    let insert = sqlx::query(statement).bind(id).execute(pool).await;
    assert!(insert.is_ok());
}

async fn seed_permission(pool: &PgPool) -> Permission {
    let key = format!("TEST_{}", Uuid::new_v4().simple()).to_uppercase();
    let seed = PermissionSeed::new(key, "test permission", PermissionGroup::GuildManagement)
        .unwrap_or_else(|_| unreachable!());

    PostgresPermissionCatalogRepository::new(pool.clone())
        .upsert_permission(&seed)
        .await
        .unwrap_or_else(|_| unreachable!())
}

fn custom_role(scope: RoleScope, name: &str) -> Role {
    Role::new(RoleId::new(), name, None, scope, false, Utc::now())
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn custom_role_names_are_unique_per_scope() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleRepository::new(pool.clone());
    let first_guild = GuildId::new();
    let second_guild = GuildId::new();
    insert_directory_row(&pool, "guilds", first_guild.as_uuid()).await;
    insert_directory_row(&pool, "guilds", second_guild.as_uuid()).await;

    let created = repository
        .create_role(&custom_role(RoleScope::Guild(first_guild), "Events Lead"))
        .await;
    assert!(created.is_ok());

    let duplicate = repository
        .create_role(&custom_role(RoleScope::Guild(first_guild), "Events Lead"))
        .await;
    assert!(matches!(duplicate, Err(AppError::DuplicateRoleName(_))));

    let other_scope = repository
        .create_role(&custom_role(RoleScope::Guild(second_guild), "Events Lead"))
        .await;
    assert!(other_scope.is_ok());

    let found = repository
        .find_role_by_name(RoleScope::Guild(first_guild), "Events Lead")
        .await
        .unwrap_or_default();
    assert!(found.is_some());
}

#[tokio::test]
async fn system_role_upsert_keeps_identity() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleRepository::new(pool);
    let name = format!("Test Role {}", Uuid::new_v4().simple());
    let first_seed = SystemRoleSeed::new(name.as_str(), "first", false)
        .unwrap_or_else(|_| unreachable!());
    let second_seed = SystemRoleSeed::new(name.as_str(), "second", true)
        .unwrap_or_else(|_| unreachable!());

    let first = repository
        .upsert_system_role(&first_seed)
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = repository
        .upsert_system_role(&second_seed)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(first.id(), second.id());
    assert_eq!(second.description(), Some("second"));
    assert!(second.is_default_role());
    assert!(second.is_system_role());
}

#[tokio::test]
async fn grants_are_idempotent_and_block_permission_deletion() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleRepository::new(pool.clone());
    let catalog = PostgresPermissionCatalogRepository::new(pool.clone());
    let guild_id = GuildId::new();
    insert_directory_row(&pool, "guilds", guild_id.as_uuid()).await;

    let role = custom_role(RoleScope::Guild(guild_id), "Quartermaster");
    assert!(repository.create_role(&role).await.is_ok());
    let permission = seed_permission(&pool).await;

    let first = repository
        .grant_permission(role.id(), permission.id(), None)
        .await;
    let second = repository
        .grant_permission(role.id(), permission.id(), None)
        .await;
    assert!(matches!(first, Ok(true)));
    assert!(matches!(second, Ok(false)));

    let blocked = catalog.delete_permission(permission.id()).await;
    assert!(matches!(blocked, Err(AppError::PermissionInUse(_))));

    let revoked = repository
        .revoke_permission(role.id(), permission.id())
        .await;
    assert!(matches!(revoked, Ok(true)));
    assert!(catalog.delete_permission(permission.id()).await.is_ok());
}

#[tokio::test]
async fn unknown_assigning_user_is_reported_as_unknown_user() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleRepository::new(pool.clone());
    let settings = PostgresClusterRoleSettingRepository::new(pool.clone());
    let cluster_id = ClusterId::new();
    insert_directory_row(&pool, "clusters", cluster_id.as_uuid()).await;
    let ghost = UserId::new();

    let role = custom_role(RoleScope::Cluster(cluster_id), "Envoy");
    assert!(repository.create_role(&role).await.is_ok());
    let permission = seed_permission(&pool).await;

    let grant = repository
        .grant_permission(role.id(), permission.id(), Some(ghost))
        .await;
    assert!(matches!(grant, Err(AppError::UnknownUser(_))));

    let setting = ClusterRoleSetting::new(cluster_id, role.id(), 1, 0, Some(ghost), None, None)
        .unwrap_or_else(|_| unreachable!());
    let saved = settings.save_setting(&setting).await;
    assert!(matches!(saved, Err(AppError::UnknownUser(_))));
}

#[tokio::test]
async fn deleting_custom_role_cascades_bindings_and_settings() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleRepository::new(pool.clone());
    let memberships = PostgresMembershipRepository::new(pool.clone());
    let settings = PostgresClusterRoleSettingRepository::new(pool.clone());
    let authorization = PostgresAuthorizationRepository::new(pool.clone());

    let user_id = UserId::new();
    let cluster_id = ClusterId::new();
    insert_directory_row(&pool, "users", user_id.as_uuid()).await;
    insert_directory_row(&pool, "clusters", cluster_id.as_uuid()).await;

    let role = custom_role(RoleScope::Cluster(cluster_id), "Alliance Herald");
    assert!(repository.create_role(&role).await.is_ok());
    let permission = seed_permission(&pool).await;
    assert!(
        repository
            .grant_permission(role.id(), permission.id(), None)
            .await
            .is_ok()
    );
    assert!(
        memberships
            .bind_cluster_role(user_id, cluster_id, role.id())
            .await
            .is_ok()
    );
    let setting = ClusterRoleSetting::new(cluster_id, role.id(), 1, 0, None, None, None)
        .unwrap_or_else(|_| unreachable!());
    assert!(settings.save_setting(&setting).await.is_ok());

    let before = authorization
        .list_role_grants(user_id, Scope::Cluster(cluster_id))
        .await
        .unwrap_or_default();
    assert_eq!(before.len(), 1);

    assert!(repository.delete_role(role.id()).await.is_ok());

    let after = authorization
        .list_role_grants(user_id, Scope::Cluster(cluster_id))
        .await
        .unwrap_or_default();
    assert!(after.is_empty());
    assert!(
        settings
            .list_settings(cluster_id)
            .await
            .unwrap_or_default()
            .is_empty()
    );
    assert!(
        repository
            .find_role(role.id())
            .await
            .unwrap_or_default()
            .is_none()
    );
}

#[tokio::test]
async fn guild_grants_stay_inside_the_guild() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleRepository::new(pool.clone());
    let memberships = PostgresMembershipRepository::new(pool.clone());
    let authorization = PostgresAuthorizationRepository::new(pool.clone());

    let user_id = UserId::new();
    let guild_id = GuildId::new();
    let other_guild_id = GuildId::new();
    insert_directory_row(&pool, "users", user_id.as_uuid()).await;
    insert_directory_row(&pool, "guilds", guild_id.as_uuid()).await;
    insert_directory_row(&pool, "guilds", other_guild_id.as_uuid()).await;

    let membership = GuildMembership::new(
        GuildMembershipId::new(),
        user_id,
        guild_id,
        Rank::default(),
        true,
    );
    assert!(matches!(
        memberships.create_guild_membership(&membership).await,
        Ok(true)
    ));

    let role = custom_role(RoleScope::Guild(guild_id), "Treasurer");
    assert!(repository.create_role(&role).await.is_ok());
    let permission = seed_permission(&pool).await;
    assert!(
        repository
            .grant_permission(role.id(), permission.id(), None)
            .await
            .is_ok()
    );
    assert!(matches!(
        memberships.bind_guild_role(membership.id(), role.id()).await,
        Ok(true)
    ));

    let inside = authorization
        .list_role_grants(user_id, Scope::Guild(guild_id))
        .await
        .unwrap_or_default();
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].permission_key, *permission.key());

    let outside = authorization
        .list_role_grants(user_id, Scope::Guild(other_guild_id))
        .await
        .unwrap_or_default();
    assert!(outside.is_empty());
}

#[tokio::test]
async fn unlinking_primary_cluster_clears_the_pointer() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let memberships = PostgresMembershipRepository::new(pool.clone());
    let guild_id = GuildId::new();
    let cluster_id = ClusterId::new();
    insert_directory_row(&pool, "guilds", guild_id.as_uuid()).await;
    insert_directory_row(&pool, "clusters", cluster_id.as_uuid()).await;

    assert!(matches!(
        memberships
            .link_guild_to_cluster(guild_id, cluster_id, true)
            .await,
        Ok(true)
    ));
    let linked = memberships
        .list_guild_clusters(guild_id)
        .await
        .unwrap_or_default();
    assert_eq!(linked.len(), 1);
    assert!(linked[0].is_primary);

    assert!(matches!(
        memberships
            .unlink_guild_from_cluster(guild_id, cluster_id)
            .await,
        Ok(true)
    ));
    let primary = sqlx::query_scalar::<_, Option<Uuid>>(
        r#"
            SELECT primary_cluster_id
            FROM guilds
            WHERE id = $1
            "#,
    )
    .bind(guild_id.as_uuid())
    .fetch_one(&pool)
    .await;
    assert!(matches!(primary, Ok(None)));
}
