/// Errors raised while constructing or validating a [`crate::UnifiedModel`].
///
/// These are invariant violations (spec §3.1), not transport or storage
/// failures — callers that compose this crate with `anchor` or `mesh` map
/// these onto the shared `Internal` error kind.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate name {name:?} in {collection} collection")]
    DuplicateName {
        collection: &'static str,
        name: String,
    },

    #[error("table {table:?} declares primary key column {column:?} but no column with that name has is_primary_key=true")]
    PrimaryKeyMismatch { table: String, column: String },

    #[error("foreign key constraint {constraint:?} on table {table:?} references unknown table {referenced_table:?}")]
    UnknownReferencedTable {
        table: String,
        constraint: String,
        referenced_table: String,
    },

    #[error("foreign key constraint {constraint:?} on table {table:?} has {local_count} local columns but {referenced_count} referenced columns")]
    ForeignKeyArityMismatch {
        table: String,
        constraint: String,
        local_count: usize,
        referenced_count: usize,
    },

    #[error("foreign key constraint {constraint:?} on table {table:?} references unknown column {column:?} on table {referenced_table:?}")]
    UnknownReferencedColumn {
        table: String,
        constraint: String,
        referenced_table: String,
        column: String,
    },

    #[error("relationship {relationship:?} refers to unknown node label {label:?}")]
    UnknownNodeLabel { relationship: String, label: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
