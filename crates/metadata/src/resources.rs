//! Normalized persistence of discovered schema (spec §4.3, §3.2): a
//! `resource_container` is a table/collection/node-label/etc., a
//! `resource_item` is a column/field/property beneath it, optionally
//! carrying its [`unified_model::enrichment`] classification.

use crate::error::{MetadataError, Result};
use crate::ids::{DatabaseId, ResourceContainerId, ResourceItemId, TenantId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResourceContainerRow {
    pub id: ResourceContainerId,
    pub tenant_id: TenantId,
    pub database_id: DatabaseId,
    pub name: String,
    pub kind: String,
    pub comment: Option<String>,
    pub classification: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResourceItemRow {
    pub id: ResourceItemId,
    pub tenant_id: TenantId,
    pub container_id: ResourceContainerId,
    pub name: String,
    pub data_type: String,
    pub ordinal_position: Option<i32>,
    pub enrichment: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

pub struct ResourcesService<'a> {
    pool: &'a PgPool,
}

impl<'a> ResourcesService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_containers(
        &self,
        tenant_id: TenantId,
        database_id: DatabaseId,
    ) -> Result<Vec<ResourceContainerRow>> {
        let rows: Vec<ResourceContainerRow> = sqlx::query_as(
            "select id, tenant_id, database_id, name, kind, comment, classification, created_at
             from resource_containers where tenant_id = $1 and database_id = $2
             order by name",
        )
        .bind(tenant_id.0)
        .bind(database_id.0)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create_container(
        &self,
        tenant_id: TenantId,
        database_id: DatabaseId,
        name: &str,
        kind: &str,
        comment: Option<&str>,
    ) -> Result<ResourceContainerRow> {
        let id = ResourceContainerId::new();
        let row: ResourceContainerRow = sqlx::query_as(
            "insert into resource_containers (id, tenant_id, database_id, name, kind, comment)
             values ($1, $2, $3, $4, $5, $6)
             returning id, tenant_id, database_id, name, kind, comment, classification, created_at",
        )
        .bind(id.0)
        .bind(tenant_id.0)
        .bind(database_id.0)
        .bind(name)
        .bind(kind)
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => MetadataError::AlreadyExists {
                resource: "resource_container",
                id: name.to_string(),
            },
            other => MetadataError::Database(other),
        })?;
        Ok(row)
    }

    /// Items ordered by `ordinal_position` with null positions sorted last
    /// (spec §4.3 exactly).
    pub async fn list_items(
        &self,
        tenant_id: TenantId,
        container_id: ResourceContainerId,
    ) -> Result<Vec<ResourceItemRow>> {
        let rows: Vec<ResourceItemRow> = sqlx::query_as(
            "select id, tenant_id, container_id, name, data_type, ordinal_position,
                    enrichment, created_at
             from resource_items where tenant_id = $1 and container_id = $2
             order by ordinal_position nulls last, name",
        )
        .bind(tenant_id.0)
        .bind(container_id.0)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create_item(
        &self,
        tenant_id: TenantId,
        container_id: ResourceContainerId,
        name: &str,
        data_type: &str,
        ordinal_position: Option<i32>,
    ) -> Result<ResourceItemRow> {
        let id = ResourceItemId::new();
        let row: ResourceItemRow = sqlx::query_as(
            "insert into resource_items (id, tenant_id, container_id, name, data_type, ordinal_position)
             values ($1, $2, $3, $4, $5, $6)
             returning id, tenant_id, container_id, name, data_type, ordinal_position,
                       enrichment, created_at",
        )
        .bind(id.0)
        .bind(tenant_id.0)
        .bind(container_id.0)
        .bind(name)
        .bind(data_type)
        .bind(ordinal_position)
        .fetch_one(self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => MetadataError::AlreadyExists {
                resource: "resource_item",
                id: name.to_string(),
            },
            other => MetadataError::Database(other),
        })?;
        Ok(row)
    }

    pub async fn set_enrichment(
        &self,
        tenant_id: TenantId,
        item_id: ResourceItemId,
        enrichment: &serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            "update resource_items set enrichment = $3 where tenant_id = $1 and id = $2",
        )
        .bind(tenant_id.0)
        .bind(item_id.0)
        .bind(enrichment)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
