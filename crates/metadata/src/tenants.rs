//! Tenant existence checks (spec §4.3: "Tenant/workspace existence checks
//! before creating downstream objects; missing parents yield `NotFound`").

use crate::error::{MetadataError, Result};
use crate::ids::TenantId;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub struct TenantsService<'a> {
    pool: &'a PgPool,
}

impl<'a> TenantsService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, tenant_id: TenantId) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("select 1 from tenants where id = $1")
            .bind(tenant_id.0)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn require(&self, tenant_id: TenantId) -> Result<()> {
        if self.exists(tenant_id).await? {
            Ok(())
        } else {
            Err(MetadataError::NotFound {
                resource: "tenant",
                id: tenant_id.to_string(),
            })
        }
    }

    pub async fn create(&self, name: &str) -> Result<Tenant> {
        let id = TenantId::new();
        let row: Tenant = sqlx::query_as(
            "insert into tenants (id, name) values ($1, $2) returning id, name, created_at",
        )
        .bind(id.0)
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => MetadataError::AlreadyExists {
                resource: "tenant",
                id: name.to_string(),
            },
            other => MetadataError::Database(other),
        })?;
        Ok(row)
    }
}
