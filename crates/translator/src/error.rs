use unified_model::DatabaseType;

#[derive(thiserror::Error, Debug)]
pub enum TranslatorError {
    #[error("no translation strategy is registered for {source:?} -> {target:?}")]
    ErrUnsupportedParadigm {
        source: DatabaseType,
        target: DatabaseType,
    },

    #[error("a strategy named {0:?} is already registered")]
    DuplicateStrategyName(String),

    #[error("strategy {strategy:?} requires sample data, but none was provided")]
    MissingSampleData { strategy: String },

    #[error("strategy {strategy:?} requires enrichment, but none was provided")]
    MissingEnrichment { strategy: String },

    #[error(transparent)]
    Model(#[from] unified_model::ModelError),
}

pub type Result<T> = std::result::Result<T, TranslatorError>;

/// The shared taxonomy every crate boundary collapses to (spec §7,
/// SPEC_FULL §7): lets a caller composing `translator` with `mesh`/`anchor`
/// match one enum regardless of which crate raised the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FailedPrecondition,
    AlreadyExists,
    Internal,
}

impl TranslatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslatorError::ErrUnsupportedParadigm { .. } => ErrorKind::FailedPrecondition,
            TranslatorError::DuplicateStrategyName(_) => ErrorKind::AlreadyExists,
            TranslatorError::MissingSampleData { .. }
            | TranslatorError::MissingEnrichment { .. } => ErrorKind::FailedPrecondition,
            TranslatorError::Model(_) => ErrorKind::Internal,
        }
    }
}
