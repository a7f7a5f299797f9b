//! Tenant-scoped policy documents (spec §4.3).

use crate::error::{MetadataError, Result};
use crate::ids::{PolicyId, TenantId, WorkspaceId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PolicyRow {
    pub id: PolicyId,
    pub tenant_id: TenantId,
    pub workspace_id: WorkspaceId,
    pub name: String,
    pub document: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

pub struct PoliciesService<'a> {
    pool: &'a PgPool,
}

impl<'a> PoliciesService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, tenant_id: TenantId, policy_id: PolicyId) -> Result<PolicyRow> {
        let row: Option<PolicyRow> = sqlx::query_as(
            "select id, tenant_id, workspace_id, name, document, created_at
             from policies where tenant_id = $1 and id = $2",
        )
        .bind(tenant_id.0)
        .bind(policy_id.0)
        .fetch_optional(self.pool)
        .await?;
        row.ok_or_else(|| MetadataError::NotFound {
            resource: "policy",
            id: policy_id.to_string(),
        })
    }

    pub async fn list(&self, tenant_id: TenantId, workspace_id: WorkspaceId) -> Result<Vec<PolicyRow>> {
        let rows: Vec<PolicyRow> = sqlx::query_as(
            "select id, tenant_id, workspace_id, name, document, created_at
             from policies where tenant_id = $1 and workspace_id = $2
             order by name",
        )
        .bind(tenant_id.0)
        .bind(workspace_id.0)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert(
        &self,
        tenant_id: TenantId,
        workspace_id: WorkspaceId,
        name: &str,
        document: &serde_json::Value,
    ) -> Result<PolicyRow> {
        let id = PolicyId::new();
        let row: PolicyRow = sqlx::query_as(
            "insert into policies (id, tenant_id, workspace_id, name, document)
             values ($1, $2, $3, $4, $5)
             on conflict (tenant_id, name) do update set document = excluded.document
             returning id, tenant_id, workspace_id, name, document, created_at",
        )
        .bind(id.0)
        .bind(tenant_id.0)
        .bind(workspace_id.0)
        .bind(name)
        .bind(document)
        .fetch_one(self.pool)
        .await
        .map_err(MetadataError::Database)?;
        Ok(row)
    }
}
