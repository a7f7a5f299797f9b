//! Database catalog rows, one level beneath an instance (spec §3.4, §4.3).

use crate::error::{MetadataError, Result};
use crate::ids::{DatabaseId, InstanceId, TenantId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DatabaseRow {
    pub id: DatabaseId,
    pub tenant_id: TenantId,
    pub instance_id: InstanceId,
    pub name: String,
    pub schema_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct DatabasesService<'a> {
    pool: &'a PgPool,
}

impl<'a> DatabasesService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, tenant_id: TenantId, database_id: DatabaseId) -> Result<DatabaseRow> {
        let row: Option<DatabaseRow> = sqlx::query_as(
            "select id, tenant_id, instance_id, name, schema_name, created_at
             from databases where tenant_id = $1 and id = $2",
        )
        .bind(tenant_id.0)
        .bind(database_id.0)
        .fetch_optional(self.pool)
        .await?;
        row.ok_or_else(|| MetadataError::NotFound {
            resource: "database",
            id: database_id.to_string(),
        })
    }

    pub async fn list(&self, tenant_id: TenantId, instance_id: InstanceId) -> Result<Vec<DatabaseRow>> {
        let rows: Vec<DatabaseRow> = sqlx::query_as(
            "select id, tenant_id, instance_id, name, schema_name, created_at
             from databases where tenant_id = $1 and instance_id = $2
             order by name",
        )
        .bind(tenant_id.0)
        .bind(instance_id.0)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        &self,
        tenant_id: TenantId,
        instance_id: InstanceId,
        name: &str,
        schema_name: Option<&str>,
    ) -> Result<DatabaseRow> {
        let id = DatabaseId::new();
        let row: DatabaseRow = sqlx::query_as(
            "insert into databases (id, tenant_id, instance_id, name, schema_name)
             values ($1, $2, $3, $4, $5)
             returning id, tenant_id, instance_id, name, schema_name, created_at",
        )
        .bind(id.0)
        .bind(tenant_id.0)
        .bind(instance_id.0)
        .bind(name)
        .bind(schema_name)
        .fetch_one(self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => MetadataError::AlreadyExists {
                resource: "database",
                id: name.to_string(),
            },
            other => MetadataError::Database(other),
        })?;
        Ok(row)
    }
}
