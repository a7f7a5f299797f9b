//! Workspace existence checks scoped to a tenant (spec §4.3).

use crate::error::{MetadataError, Result};
use crate::ids::{TenantId, WorkspaceId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub tenant_id: TenantId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub struct WorkspacesService<'a> {
    pool: &'a PgPool,
}

impl<'a> WorkspacesService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every read takes `tenant_id` first and threads it into the `WHERE`
    /// clause (spec §4.3, testable property 10): no row crosses a tenant
    /// boundary even for a workspace ID the caller already has in hand.
    pub async fn get(&self, tenant_id: TenantId, workspace_id: WorkspaceId) -> Result<Workspace> {
        let row: Option<Workspace> = sqlx::query_as(
            "select id, tenant_id, name, created_at from workspaces
             where tenant_id = $1 and id = $2",
        )
        .bind(tenant_id.0)
        .bind(workspace_id.0)
        .fetch_optional(self.pool)
        .await?;
        row.ok_or_else(|| MetadataError::NotFound {
            resource: "workspace",
            id: workspace_id.to_string(),
        })
    }

    pub async fn list(&self, tenant_id: TenantId) -> Result<Vec<Workspace>> {
        let rows: Vec<Workspace> = sqlx::query_as(
            "select id, tenant_id, name, created_at from workspaces where tenant_id = $1
             order by name",
        )
        .bind(tenant_id.0)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, tenant_id: TenantId, name: &str) -> Result<Workspace> {
        let id = WorkspaceId::new();
        let row: Workspace = sqlx::query_as(
            "insert into workspaces (id, tenant_id, name) values ($1, $2, $3)
             returning id, tenant_id, name, created_at",
        )
        .bind(id.0)
        .bind(tenant_id.0)
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => MetadataError::AlreadyExists {
                resource: "workspace",
                id: name.to_string(),
            },
            other => MetadataError::Database(other),
        })?;
        Ok(row)
    }
}
