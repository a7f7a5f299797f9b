//! The uniform operation surface every database adapter implements (spec
//! §4.2). Mirrors the capability-set shape spec §9 calls for: one trait,
//! one object per vendor, no adapter-specific config outside
//! [`crate::config::InstanceConfig`]/[`crate::config::DatabaseConfig`]
//! (spec §6.4).

use crate::client::{DatabaseClient, InstanceClient};
use crate::config::{DatabaseConfig, InstanceConfig};
use crate::error::Result;
use crate::replication::{CdcHandler, ReplicationHandle};
use crate::streaming::{StreamBatch, StreamCursor};
use async_trait::async_trait;
use unified_model::UnifiedModel;

/// Metadata collected about a reachable instance or database, independent
/// of paradigm (spec §4.2 `CollectInstanceMetadata`/
/// `CollectDatabaseMetadata`). `details` carries whatever per-engine extras
/// don't fit the typed fields (SPEC_FULL §9 open question 2: the typed
/// struct wins over a bare map, with `details` as the escape hatch).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct DescribeDetails {
    pub version: Option<String>,
    pub size_bytes: Option<u64>,
    pub object_count: Option<u64>,
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// One row count result; `is_exact` is false when the adapter falls back
/// to a planner estimate rather than `COUNT(*)` (spec §4.2
/// `GetTableRowCount`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCount {
    pub count: u64,
    pub is_exact: bool,
}

/// The uniform contract every database adapter implements (spec §4.2).
/// Unsupported operations must return
/// [`crate::error::AdapterError::UnsupportedOperation`], never silently
/// succeed (spec §4.2, §6.4).
#[async_trait]
pub trait Adapter: Send + Sync {
    fn database_type(&self) -> unified_model::DatabaseType;

    async fn connect(&self, config: &DatabaseConfig, instance: &InstanceClient) -> Result<DatabaseClient>;
    async fn connect_instance(&self, config: &InstanceConfig) -> Result<InstanceClient>;
    async fn close(&self, client: &DatabaseClient) -> Result<()>;

    async fn discover_schema(&self, client: &DatabaseClient) -> Result<UnifiedModel>;
    async fn create_structure(&self, client: &DatabaseClient, model: &UnifiedModel) -> Result<()>;

    async fn collect_database_metadata(&self, client: &DatabaseClient) -> Result<DescribeDetails>;
    async fn collect_instance_metadata(&self, client: &InstanceClient) -> Result<DescribeDetails>;

    async fn execute_query(
        &self,
        client: &DatabaseClient,
        query: &str,
        args: &[serde_json::Value],
    ) -> Result<Vec<serde_json::Value>>;

    async fn execute_count_query(&self, client: &DatabaseClient, query: &str) -> Result<i64>;

    /// Streams one page of `table`, starting from `cursor` (`None` means
    /// start of table) and returning at most `batch_size` rows restricted
    /// to `columns` when non-empty (spec §4.2.2).
    async fn stream_table_data(
        &self,
        client: &DatabaseClient,
        table: &str,
        batch_size: usize,
        cursor: Option<StreamCursor>,
        columns: &[String],
    ) -> Result<StreamBatch>;

    async fn get_table_row_count(
        &self,
        client: &DatabaseClient,
        table: &str,
        where_clause: Option<&str>,
    ) -> Result<RowCount>;

    async fn fetch_data(
        &self,
        client: &DatabaseClient,
        table: &str,
        limit: usize,
    ) -> Result<Vec<serde_json::Value>>;

    async fn insert_data(
        &self,
        client: &DatabaseClient,
        table: &str,
        rows: &[serde_json::Value],
    ) -> Result<u64>;

    /// Starts a push-model CDC stream over `object_names` on `database_id`,
    /// dispatching every change to `handler` (spec §4.2.3). Adapters that
    /// can't do CDC return `UnsupportedOperation`.
    async fn create_replication_source(
        &self,
        client: &DatabaseClient,
        object_names: &[String],
        database_id: &crate::ids::DatabaseId,
        handler: CdcHandler,
    ) -> Result<ReplicationHandle>;
}
