//! Typed catalog service over the metadata store (spec §4.3). Every list/
//! read method takes `tenant_id` first and threads it into the `WHERE`
//! clause so no row crosses a tenant boundary (testable property 10).

pub mod databases;
pub mod error;
pub mod ids;
pub mod instances;
pub mod policies;
pub mod resources;
pub mod sessions;
pub mod tenants;
pub mod workspaces;

pub use databases::{DatabaseRow, DatabasesService};
pub use error::{ErrorKind, MetadataError, Result};
pub use ids::{
    DatabaseId, InstanceId, PolicyId, ResourceContainerId, ResourceItemId, SessionId, TenantId,
    WorkspaceId,
};
pub use instances::{InstanceRow, InstancesService};
pub use policies::{PoliciesService, PolicyRow};
pub use resources::{ResourceContainerRow, ResourceItemRow, ResourcesService};
pub use sessions::{SessionRow, SessionsService};
pub use tenants::{Tenant, TenantsService};
pub use workspaces::{Workspace, WorkspacesService};
