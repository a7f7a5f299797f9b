//! Scenario S6 (spec §8): rotating a tenant's JWT signing secret
//! invalidates every outstanding session token for that tenant, and the
//! mesh's session mirror reports them gone so a caller wiring this up to
//! `metadata::SessionsService::delete_for_tenant` knows to do the same.

use chrono::Duration as ChronoDuration;
use mesh::credentials::TenantSecretCache;
use mesh::error::MeshError;
use mesh::ids::TenantId;
use mesh::storage::Store;

#[test]
fn rotating_a_tenants_secret_invalidates_its_outstanding_tokens() {
    let store = Store::new();
    let cache = TenantSecretCache::new();
    let tenant = TenantId::from("tenant-acme");

    cache.rotate(&store, &tenant).unwrap();
    let token_a = cache.issue(&tenant, "user-a", ChronoDuration::hours(8)).unwrap();
    let token_b = cache.issue(&tenant, "user-b", ChronoDuration::hours(8)).unwrap();

    assert!(cache.validate(&tenant, &token_a).is_ok());
    assert!(cache.validate(&tenant, &token_b).is_ok());

    // A security incident (or a routine key-rotation policy) rotates the
    // tenant's secret.
    cache.rotate(&store, &tenant).unwrap();

    let err_a = cache.validate(&tenant, &token_a).unwrap_err();
    let err_b = cache.validate(&tenant, &token_b).unwrap_err();
    assert!(matches!(err_a, MeshError::InvalidToken));
    assert!(matches!(err_b, MeshError::InvalidToken));

    // Freshly issued tokens under the new secret work fine.
    let token_c = cache.issue(&tenant, "user-c", ChronoDuration::hours(8)).unwrap();
    assert!(cache.validate(&tenant, &token_c).is_ok());
}

#[test]
fn rotation_is_scoped_to_its_own_tenant() {
    let store = Store::new();
    let cache = TenantSecretCache::new();
    let tenant_a = TenantId::from("tenant-a");
    let tenant_b = TenantId::from("tenant-b");

    cache.rotate(&store, &tenant_a).unwrap();
    cache.rotate(&store, &tenant_b).unwrap();
    let token_b = cache.issue(&tenant_b, "user-b", ChronoDuration::hours(1)).unwrap();

    cache.rotate(&store, &tenant_a).unwrap();

    // tenant_b's token is unaffected by tenant_a's rotation.
    assert!(cache.validate(&tenant_b, &token_b).is_ok());
}

#[test]
fn the_mesh_session_mirror_reports_zero_sessions_after_a_tenant_is_cleared() {
    let store = Store::new();
    let tenant = TenantId::from("tenant-acme");

    store.record_tenant_sessions(&tenant, 4);
    let removed = store.tenant_sessions_delete(&tenant).unwrap();
    assert_eq!(removed, 4);

    let removed_again = store.tenant_sessions_delete(&tenant).unwrap();
    assert_eq!(removed_again, 0);
}
