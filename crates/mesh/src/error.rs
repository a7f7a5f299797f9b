//! Error taxonomy for the mesh fabric (spec §7).

use crate::ids::{NodeId, StreamId, TenantId};

#[derive(thiserror::Error, Debug)]
pub enum MeshError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("stream {0} not found")]
    StreamNotFound(StreamId),

    #[error("tenant {0} has no JWT signing secret provisioned")]
    NoTenantSecret(TenantId),

    #[error("token is invalid")]
    InvalidToken,

    #[error("backpressure: outbox depth exceeds the configured high-water mark")]
    Backpressure,

    #[error("raft group {0} rejected the proposal: not the leader")]
    NotLeader(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invariant violation: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, MeshError>;

/// The shared taxonomy every crate boundary collapses to (spec §7,
/// SPEC_FULL §7): lets a caller composing `mesh` with `anchor`/`metadata`
/// match one enum regardless of which crate raised the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    FailedPrecondition,
    Unavailable,
    Internal,
    BackpressureExceeded,
    Unauthenticated,
}

impl MeshError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::NodeNotFound(_) | MeshError::StreamNotFound(_) => ErrorKind::NotFound,
            MeshError::NoTenantSecret(_) => ErrorKind::FailedPrecondition,
            MeshError::InvalidToken => ErrorKind::Unauthenticated,
            MeshError::Backpressure => ErrorKind::BackpressureExceeded,
            MeshError::NotLeader(_) => ErrorKind::Unavailable,
            MeshError::Certificate(_) | MeshError::Io(_) => ErrorKind::Internal,
            MeshError::Internal(_) => ErrorKind::Internal,
        }
    }
}
