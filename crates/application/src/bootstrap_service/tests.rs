use std::sync::Arc;

use guildkeep_core::AppError;
use guildkeep_domain::{
    BootstrapPlan, PermissionGroup, PermissionSeed, RoleScope, SystemRoleSeed, catalog::keys,
    system_roles,
};

use crate::test_support::FakeAccessStore;
use crate::{PermissionCatalogRepository, RolePermissionRepository, RoleRepository};

use super::BootstrapService;

fn build_service(store: &Arc<FakeAccessStore>) -> BootstrapService {
    BootstrapService::new(store.clone(), store.clone(), store.clone(), store.clone())
}

#[tokio::test]
async fn standard_plan_applies_idempotently() {
    let store = Arc::new(FakeAccessStore::default());
    let service = build_service(&store);
    let plan = BootstrapPlan::standard().unwrap_or_else(|_| unreachable!());

    let first = service
        .apply(&plan)
        .await
        .unwrap_or_else(|_| unreachable!());
    let events_after_first = store.events().await.len();
    let second = service
        .apply(&plan)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(first.permissions, plan.permissions().len());
    assert_eq!(first.system_roles, plan.system_roles().len());
    assert!(first.grants_created > 0);
    assert_eq!(second.grants_created, 0);
    assert_eq!(store.events().await.len(), events_after_first);

    let founder = store
        .find_role_by_name(RoleScope::System, system_roles::FOUNDER)
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| unreachable!());
    let founder_keys = store
        .list_role_permissions(founder.id())
        .await
        .unwrap_or_default()
        .iter()
        .map(|grant| grant.permission.key().to_string())
        .collect::<Vec<_>>();
    assert!(founder_keys.contains(&keys::GUILD_DELETE.to_owned()));
    assert!(!founder_keys.contains(&keys::CLUSTER_EDIT_DETAILS.to_owned()));
}

#[tokio::test]
async fn divergent_role_names_are_rejected_before_writing() {
    let store = Arc::new(FakeAccessStore::default());
    let service = build_service(&store);
    let plan = BootstrapPlan::new()
        .with_permission(
            PermissionSeed::new(
                keys::GUILD_EDIT_DETAILS,
                "Edit guild details",
                PermissionGroup::GuildManagement,
            )
            .unwrap_or_else(|_| unreachable!()),
        )
        .with_system_role(
            SystemRoleSeed::new("FOUNDER", "Guild creator", false)
                .unwrap_or_else(|_| unreachable!()),
        )
        .with_grants("OWNER", &[keys::GUILD_EDIT_DETAILS])
        .unwrap_or_else(|_| unreachable!())
        .with_role_reference("CREATOR", "guild creator membership");

    let result = service.apply(&plan).await;

    match result {
        Err(AppError::UnresolvedRoleReference(names)) => {
            assert_eq!(names, vec!["CREATOR".to_owned(), "OWNER".to_owned()]);
        }
        other => panic!("expected unresolved role reference, got {other:?}"),
    }
    assert!(
        store
            .list_permissions()
            .await
            .unwrap_or_default()
            .is_empty()
    );
    assert!(
        store
            .list_roles(RoleScope::System)
            .await
            .unwrap_or_default()
            .is_empty()
    );
}

#[tokio::test]
async fn verify_reports_every_missing_name() {
    let store = Arc::new(FakeAccessStore::default());
    let service = build_service(&store);
    assert!(
        service
            .ensure_system_role(
                &SystemRoleSeed::new("FOUNDER", "Guild creator", false)
                    .unwrap_or_else(|_| unreachable!()),
            )
            .await
            .is_ok()
    );

    assert!(service.verify_role_references(["FOUNDER"]).await.is_ok());

    let result = service
        .verify_role_references(["FOUNDER", "OWNER", "CREATOR"])
        .await;
    assert!(matches!(
        result,
        Err(AppError::UnresolvedRoleReference(names))
            if names == vec!["CREATOR".to_owned(), "OWNER".to_owned()]
    ));
}

#[tokio::test]
async fn ensure_updates_changed_descriptions() {
    let store = Arc::new(FakeAccessStore::default());
    let service = build_service(&store);
    let original = service
        .ensure_permission(
            &PermissionSeed::new(
                keys::BADGE_AWARD,
                "Award badges",
                PermissionGroup::BadgeManagement,
            )
            .unwrap_or_else(|_| unreachable!()),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let updated = service
        .ensure_permission(
            &PermissionSeed::new(
                keys::BADGE_AWARD,
                "Award badges to members",
                PermissionGroup::BadgeManagement,
            )
            .unwrap_or_else(|_| unreachable!()),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(original.id(), updated.id());
    assert_eq!(updated.description(), "Award badges to members");
    assert_eq!(store.events().await.len(), 2);
}

#[tokio::test]
async fn blank_and_padded_role_descriptions_settle_after_one_write() {
    let store = Arc::new(FakeAccessStore::default());
    let service = build_service(&store);
    let blank = SystemRoleSeed::new("SCRIBE", "", false).unwrap_or_else(|_| unreachable!());
    let padded =
        SystemRoleSeed::new("HERALD", "Trailing ", false).unwrap_or_else(|_| unreachable!());

    for _ in 0..3 {
        service
            .ensure_system_role(&blank)
            .await
            .unwrap_or_else(|_| unreachable!());
    }
    assert_eq!(store.events().await.len(), 1);

    let mut herald = None;
    for _ in 0..3 {
        herald = Some(
            service
                .ensure_system_role(&padded)
                .await
                .unwrap_or_else(|_| unreachable!()),
        );
    }
    assert_eq!(store.events().await.len(), 2);
    assert_eq!(
        herald.and_then(|role| role.description().map(str::to_owned)),
        Some("Trailing".to_owned())
    );
}
