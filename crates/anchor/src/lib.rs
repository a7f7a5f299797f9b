//! Anchor connector kernel (spec §4.2): the uniform contract every
//! database adapter implements, plus the connection lifecycle, streaming
//! pagination, and replication plumbing shared by all of them.

pub mod adapter;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ids;
pub mod lifecycle;
pub mod replication;
pub mod streaming;
pub mod tunnel;

pub use adapter::{Adapter, DescribeDetails, RowCount};
pub use client::{DatabaseClient, InstanceClient};
pub use config::{DatabaseConfig, InstanceConfig, SshTunnelConfig};
pub use crypto::{decrypt_password, KeyRelease};
pub use error::{AdapterError, ErrorKind, Result};
pub use ids::{DatabaseId, InstanceId, TenantId};
pub use lifecycle::{connect_with_fallback, ProbeOutcome, TlsOptions};
pub use replication::{
    run_polling_replication, CdcEvent, CdcHandler, CdcOperation, PollingReplicationConfig,
    ReplicationHandle,
};
pub use streaming::{StreamBatch, StreamCursor};
