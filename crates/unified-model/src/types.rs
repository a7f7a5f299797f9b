use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A paradigm-neutral tag for the database engine family a [`crate::UnifiedModel`]
/// was discovered from, or is being translated toward.
///
/// This is the `SourceParadigm`/`TargetParadigm` key used to resolve
/// translation strategies in the `translator` crate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatabaseType {
    Relational,
    Columnar,
    Document,
    KeyValue,
    Graph,
    TimeSeries,
    Vector,
    Search,
}

/// Open, engine-specific hints that ride alongside a typed object record.
/// Keys are engine-defined (e.g. `"postgres.fillfactor"`); values are
/// arbitrary JSON so adapters can stash whatever their driver needs without
/// widening the core schema.
pub type Options = BTreeMap<String, serde_json::Value>;

/// A primitive value shape observed in sample data, used by the property
/// distribution analyzer (spec §4.1) to decide "core" vs. "long tail"
/// properties ahead of a schema-flattening translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}
