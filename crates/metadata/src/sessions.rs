//! JWT session rows (spec §6.5, §4.4.2): one row per issued refresh
//! token, keyed by its hash so the table never stores the token itself.
//! Rotating a tenant's signing secret deletes every row for that tenant
//! (scenario S6); logout deletes every row for one user, or a single row
//! when the user can't be extracted from the presented token (spec §6.5).

use crate::error::Result;
use crate::ids::{SessionId, TenantId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    pub id: SessionId,
    pub tenant_id: TenantId,
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionsService<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionsService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        tenant_id: TenantId,
        user_id: Uuid,
        refresh_token_hash: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<SessionRow> {
        let id = SessionId::new();
        let row: SessionRow = sqlx::query_as(
            "insert into sessions (id, tenant_id, user_id, refresh_token_hash, issued_at, expires_at)
             values ($1, $2, $3, $4, $5, $6)
             returning id, tenant_id, user_id, refresh_token_hash, issued_at, expires_at",
        )
        .bind(id.0)
        .bind(tenant_id.0)
        .bind(user_id)
        .bind(refresh_token_hash)
        .bind(issued_at)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<SessionRow>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "select id, tenant_id, user_id, refresh_token_hash, issued_at, expires_at
             from sessions where tenant_id = $1",
        )
        .bind(tenant_id.0)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Invoked on JWT secret rotation (spec §4.4.2): every outstanding
    /// session for `tenant_id` becomes unusable because no valid token can
    /// reference it anymore.
    pub async fn delete_for_tenant(&self, tenant_id: TenantId) -> Result<u64> {
        let result = sqlx::query("delete from sessions where tenant_id = $1")
            .bind(tenant_id.0)
            .execute(self.pool)
            .await?;
        let removed = result.rows_affected();
        tracing::info!(%tenant_id, removed, "invalidated sessions after secret rotation");
        Ok(removed)
    }

    /// Logout: deletes every session for one user within a tenant (spec
    /// §6.5).
    pub async fn delete_for_user(&self, tenant_id: TenantId, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("delete from sessions where tenant_id = $1 and user_id = $2")
            .bind(tenant_id.0)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Logout fallback when the user can't be extracted from the
    /// presented token: deletes the single session row matching the
    /// refresh token hash (spec §6.5).
    pub async fn delete_by_refresh_token_hash(
        &self,
        tenant_id: TenantId,
        refresh_token_hash: &str,
    ) -> Result<u64> {
        let result = sqlx::query(
            "delete from sessions where tenant_id = $1 and refresh_token_hash = $2",
        )
        .bind(tenant_id.0)
        .bind(refresh_token_hash)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
