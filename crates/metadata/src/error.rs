//! Error taxonomy for the metadata store's typed service layer (spec §7),
//! collapsed to the shared `ErrorKind` surface so callers composing this
//! with `mesh`/`anchor` can match on one taxonomy (SPEC_FULL §7).

#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} {id} already exists")]
    AlreadyExists { resource: &'static str, id: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, MetadataError>;

/// The shared taxonomy every crate boundary collapses to (spec §7,
/// SPEC_FULL §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Unavailable,
    Internal,
}

impl MetadataError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetadataError::NotFound { .. } => ErrorKind::NotFound,
            MetadataError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            MetadataError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => {
                ErrorKind::Unavailable
            }
            MetadataError::Database(_) => ErrorKind::Internal,
        }
    }
}
