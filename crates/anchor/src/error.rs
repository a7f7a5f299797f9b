//! Error types for the anchor connector kernel (spec §4.2).

use crate::ids::TenantId;
use unified_model::DatabaseType;

#[derive(thiserror::Error, Debug)]
pub enum AdapterError {
    #[error("{operation} is not supported by the {database_type} adapter")]
    UnsupportedOperation {
        database_type: DatabaseType,
        operation: &'static str,
    },

    #[error("failed to decrypt stored credentials for tenant {tenant_id}")]
    DecryptionFailed { tenant_id: TenantId },

    #[error("backpressure: outbox/enqueue depth exceeds the configured high-water mark")]
    Backpressure,

    #[error("failed to connect to {instance}: {source}")]
    ConnectionFailed {
        instance: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("connection probe to {instance} exhausted all candidate ports {ports:?}")]
    AllPortsExhausted { instance: String, ports: Vec<u16> },

    #[error("database {database:?} does not exist on instance {instance:?}")]
    UnknownDatabase { instance: String, database: String },

    #[error("replication slot {slot:?} is not active on {instance:?}")]
    ReplicationSlotInactive { instance: String, slot: String },

    #[error("ssh tunnel setup failed: {0}")]
    Tunnel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AdapterError>;

/// The shared taxonomy every crate boundary collapses to (spec §7,
/// SPEC_FULL §7): lets a caller composing `anchor` with `mesh`/`metadata`
/// match one enum regardless of which crate raised the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FailedPrecondition,
    Unavailable,
    NotFound,
    BackpressureExceeded,
    Internal,
}

impl AdapterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::UnsupportedOperation { .. } => ErrorKind::FailedPrecondition,
            AdapterError::DecryptionFailed { .. } => ErrorKind::Internal,
            AdapterError::Backpressure => ErrorKind::BackpressureExceeded,
            AdapterError::ConnectionFailed { .. } | AdapterError::AllPortsExhausted { .. } => {
                ErrorKind::Unavailable
            }
            AdapterError::UnknownDatabase { .. } => ErrorKind::NotFound,
            AdapterError::ReplicationSlotInactive { .. } => ErrorKind::FailedPrecondition,
            AdapterError::Tunnel(_) => ErrorKind::Unavailable,
            AdapterError::Io(_) => ErrorKind::Internal,
        }
    }
}
