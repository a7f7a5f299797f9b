//! The paradigm-agnostic schema container (`UnifiedModel`) and its
//! classifier side-car (`UnifiedModelEnrichment`) that the rest of the
//! workspace pivots on: `translator` converts between paradigms of it,
//! `anchor` produces it from schema discovery, `metadata` persists it as
//! normalized catalog rows.

mod enrichment;
mod error;
mod model;
mod types;

pub use enrichment::{
    AccessPattern, ColumnEnrichment, IndexEnrichment, RiskLevel, TableEnrichment,
    UnifiedModelEnrichment, ViewEnrichment,
};
pub use error::{ModelError, Result};
pub use model::{
    Column, Constraint, ConstraintKind, DocumentCollection, Embedding, Field, Function,
    GraphNode, GraphRelationship, Index, ReferentialAction, Schema, Table, TimeSeriesPoint,
    UnifiedModel, Vector, VectorIndex, View,
};
pub use types::{DatabaseType, Options, PrimitiveType};
