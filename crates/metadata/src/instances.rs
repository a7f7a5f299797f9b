//! Instance catalog rows (spec §4.3: "`databases` and `instances` hold
//! encrypted passwords only; access requires tenant ID for key release").
//! The decryption itself is the anchor crate's job (spec §4.2.1); this
//! service only ever hands back the sealed ciphertext.

use crate::error::{MetadataError, Result};
use crate::ids::{InstanceId, TenantId, WorkspaceId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InstanceRow {
    pub id: InstanceId,
    pub tenant_id: TenantId,
    pub workspace_id: WorkspaceId,
    pub name: String,
    pub database_type: String,
    pub host: String,
    pub port: Option<i32>,
    pub username: String,
    pub encrypted_password: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

pub struct InstancesService<'a> {
    pool: &'a PgPool,
}

impl<'a> InstancesService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, tenant_id: TenantId, instance_id: InstanceId) -> Result<InstanceRow> {
        let row: Option<InstanceRow> = sqlx::query_as(
            "select id, tenant_id, workspace_id, name, database_type, host, port, username,
                    encrypted_password, created_at
             from instances where tenant_id = $1 and id = $2",
        )
        .bind(tenant_id.0)
        .bind(instance_id.0)
        .fetch_optional(self.pool)
        .await?;
        row.ok_or_else(|| MetadataError::NotFound {
            resource: "instance",
            id: instance_id.to_string(),
        })
    }

    pub async fn list(&self, tenant_id: TenantId, workspace_id: WorkspaceId) -> Result<Vec<InstanceRow>> {
        let rows: Vec<InstanceRow> = sqlx::query_as(
            "select id, tenant_id, workspace_id, name, database_type, host, port, username,
                    encrypted_password, created_at
             from instances where tenant_id = $1 and workspace_id = $2
             order by name",
        )
        .bind(tenant_id.0)
        .bind(workspace_id.0)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        tenant_id: TenantId,
        workspace_id: WorkspaceId,
        name: &str,
        database_type: &str,
        host: &str,
        port: Option<i32>,
        username: &str,
        encrypted_password: &[u8],
    ) -> Result<InstanceRow> {
        let id = InstanceId::new();
        let row: InstanceRow = sqlx::query_as(
            "insert into instances
                (id, tenant_id, workspace_id, name, database_type, host, port, username, encrypted_password)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             returning id, tenant_id, workspace_id, name, database_type, host, port, username,
                       encrypted_password, created_at",
        )
        .bind(id.0)
        .bind(tenant_id.0)
        .bind(workspace_id.0)
        .bind(name)
        .bind(database_type)
        .bind(host)
        .bind(port)
        .bind(username)
        .bind(encrypted_password)
        .fetch_one(self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => MetadataError::AlreadyExists {
                resource: "instance",
                id: name.to_string(),
            },
            other => MetadataError::Database(other),
        })?;
        Ok(row)
    }
}
