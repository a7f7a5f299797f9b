//! `resource_items` are ordered by `ordinal_position` with null positions
//! sorted last (spec §4.3).

use metadata::{DatabasesService, InstancesService, ResourcesService, TenantsService, WorkspacesService};

#[sqlx::test(migrations = "./migrations")]
async fn items_order_by_ordinal_position_nulls_last(pool: sqlx::PgPool) {
    let tenants = TenantsService::new(&pool);
    let workspaces = WorkspacesService::new(&pool);
    let instances = InstancesService::new(&pool);
    let databases = DatabasesService::new(&pool);
    let resources = ResourcesService::new(&pool);

    let tenant = tenants.create("acme").await.unwrap();
    let workspace = workspaces.create(tenant.id, "main").await.unwrap();
    let instance = instances
        .create(
            tenant.id,
            workspace.id,
            "pg-primary",
            "relational",
            "db.internal",
            Some(5432),
            "svc",
            &[],
        )
        .await
        .unwrap();
    let database = databases
        .create(tenant.id, instance.id, "library", None)
        .await
        .unwrap();
    let container = resources
        .create_container(tenant.id, database.id, "books", "table", None)
        .await
        .unwrap();

    resources
        .create_item(tenant.id, container.id, "untyped_extra", "jsonb", None)
        .await
        .unwrap();
    resources
        .create_item(tenant.id, container.id, "title", "text", Some(1))
        .await
        .unwrap();
    resources
        .create_item(tenant.id, container.id, "book_id", "bigint", Some(0))
        .await
        .unwrap();

    let items = resources.list_items(tenant.id, container.id).await.unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["book_id", "title", "untyped_extra"]);
}
