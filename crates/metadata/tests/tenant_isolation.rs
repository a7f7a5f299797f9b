//! Testable property 10 (spec §8): no storage query returns a row whose
//! `tenant_id` differs from the caller's.

use metadata::{TenantsService, WorkspacesService};

#[sqlx::test(migrations = "./migrations")]
async fn workspace_list_never_crosses_tenant_boundary(pool: sqlx::PgPool) {
    let tenants = TenantsService::new(&pool);
    let workspaces = WorkspacesService::new(&pool);

    let alice = tenants.create("alice").await.unwrap();
    let bob = tenants.create("bob").await.unwrap();

    workspaces.create(alice.id, "alice-workspace").await.unwrap();
    workspaces.create(bob.id, "bob-workspace").await.unwrap();

    let alice_workspaces = workspaces.list(alice.id).await.unwrap();
    assert_eq!(alice_workspaces.len(), 1);
    assert_eq!(alice_workspaces[0].name, "alice-workspace");

    let bob_workspaces = workspaces.list(bob.id).await.unwrap();
    assert_eq!(bob_workspaces.len(), 1);
    assert_eq!(bob_workspaces[0].name, "bob-workspace");
}

#[sqlx::test(migrations = "./migrations")]
async fn get_by_id_from_the_wrong_tenant_is_not_found(pool: sqlx::PgPool) {
    let tenants = TenantsService::new(&pool);
    let workspaces = WorkspacesService::new(&pool);

    let alice = tenants.create("alice").await.unwrap();
    let bob = tenants.create("bob").await.unwrap();
    let workspace = workspaces.create(alice.id, "alice-workspace").await.unwrap();

    let err = workspaces.get(bob.id, workspace.id).await.unwrap_err();
    assert!(matches!(err, metadata::MetadataError::NotFound { .. }));
}
