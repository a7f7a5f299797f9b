//! Central data-type conversion (spec §4.1): every strategy routes type
//! decisions through here instead of hand-rolling its own vendor-type
//! tables, so "exact, lossy, or hard error — never silent coercion"
//! (testable property 3) is enforced in one place.

use serde::{Deserialize, Serialize};
use unified_model::DatabaseType;

/// A paradigm-neutral type, independent of any one engine's spelling of it.
/// `normalize` maps an engine-native type string onto one of these;
/// `to_native` maps back out to a target engine's spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalType {
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Decimal,
    Boolean,
    String,
    Text,
    Json,
    Binary,
    Date,
    Timestamp,
    Uuid,
}

/// Result of [`TypeConverter::convert`]: the target-engine type name, plus
/// whether the conversion loses precision or information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedType {
    pub target_type: String,
    pub is_lossy: bool,
}

#[derive(thiserror::Error, Debug)]
#[error("no known mapping for source type {source_type:?} from {source_db:?}")]
pub struct UnknownTypeError {
    pub source_type: String,
    pub source_db: DatabaseType,
}

pub trait TypeConverter: Send + Sync {
    fn convert(
        &self,
        source_type: &str,
        source_db: DatabaseType,
        target_db: DatabaseType,
    ) -> Result<ConvertedType, UnknownTypeError>;

    /// The target engine's canonical big-integer type, used for surrogate
    /// keys like `node_id` (spec §4.1 GraphToRelational node conversion).
    fn canonical_big_integer(&self, target_db: DatabaseType) -> &'static str;

    /// The target engine's JSON-capable type, used for hybrid/overflow
    /// property columns (spec §4.1 "hybrid-property column").
    fn canonical_json(&self, target_db: DatabaseType) -> &'static str;
}

/// The standard converter: normalizes common vendor spellings into
/// [`CanonicalType`], then re-renders into the target engine's native
/// spelling. Narrowing (e.g. double -> float) and family changes that drop
/// information (e.g. json -> text) are flagged lossy; anything with no
/// known mapping in either direction is a hard [`UnknownTypeError`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardTypeConverter;

impl StandardTypeConverter {
    fn normalize(source_type: &str) -> Option<CanonicalType> {
        let lower = source_type.to_ascii_lowercase();
        let lower = lower.trim();
        Some(match lower {
            "smallint" | "int2" | "short" => CanonicalType::SmallInt,
            "int" | "int4" | "integer" | "int32" => CanonicalType::Integer,
            "bigint" | "int8" | "long" | "int64" | "number" => CanonicalType::BigInt,
            "float" | "float4" | "real" | "float32" => CanonicalType::Float,
            "double" | "float8" | "double precision" | "float64" => CanonicalType::Double,
            "decimal" | "numeric" => CanonicalType::Decimal,
            "bool" | "boolean" => CanonicalType::Boolean,
            "char" | "varchar" | "string" | "keyword" => CanonicalType::String,
            "text" | "longtext" | "clob" => CanonicalType::Text,
            "json" | "jsonb" | "object" | "document" | "map" => CanonicalType::Json,
            "bytea" | "binary" | "blob" | "bytes" => CanonicalType::Binary,
            "date" => CanonicalType::Date,
            "timestamp" | "timestamptz" | "datetime" => CanonicalType::Timestamp,
            "uuid" | "guid" => CanonicalType::Uuid,
            _ => return None,
        })
    }

    fn to_native(canonical: &CanonicalType, target_db: DatabaseType) -> (String, bool) {
        use CanonicalType::*;
        use DatabaseType::*;

        match (canonical, target_db) {
            (SmallInt, Relational | Columnar) => ("smallint".into(), false),
            (SmallInt, _) => ("integer".into(), false),

            (Integer, Relational | Columnar) => ("integer".into(), false),
            (Integer, _) => ("integer".into(), false),

            (BigInt, Relational | Columnar) => ("bigint".into(), false),
            (BigInt, Document | KeyValue | Graph) => ("long".into(), false),
            (BigInt, TimeSeries | Search | Vector) => ("long".into(), false),

            (Float, Relational | Columnar) => ("real".into(), false),
            (Float, _) => ("float".into(), false),

            (Double, Relational | Columnar) => ("double precision".into(), false),
            (Double, _) => ("double".into(), false),

            (Decimal, Relational | Columnar) => ("numeric".into(), false),
            // Most document/search/graph stores lack arbitrary-precision
            // decimals and fall back to a float representation.
            (Decimal, _) => ("double".into(), true),

            (Boolean, _) => ("boolean".into(), false),

            (String, Relational | Columnar) => ("varchar".into(), false),
            (String, _) => ("string".into(), false),

            (Text, Relational | Columnar) => ("text".into(), false),
            (Text, _) => ("string".into(), false),

            (Json, Relational) => ("jsonb".into(), false),
            (Json, Columnar) => ("jsonb".into(), false),
            (Json, Document | KeyValue) => ("object".into(), false),
            // Vector/TimeSeries/Search engines typically have no native
            // nested-object type; round-tripping through a string loses
            // the ability to query inside the structure.
            (Json, Vector | TimeSeries | Search | Graph) => ("string".into(), true),

            (Binary, _) => ("bytea".into(), false),

            (Date, _) => ("date".into(), false),

            (Timestamp, _) => ("timestamp".into(), false),

            (Uuid, Relational | Columnar) => ("uuid".into(), false),
            // Engines without a native UUID type store it as a string,
            // which is lossless in value but loses the type-level guarantee.
            (Uuid, _) => ("string".into(), true),
        }
    }
}

impl TypeConverter for StandardTypeConverter {
    fn convert(
        &self,
        source_type: &str,
        source_db: DatabaseType,
        target_db: DatabaseType,
    ) -> Result<ConvertedType, UnknownTypeError> {
        let canonical = Self::normalize(source_type).ok_or_else(|| UnknownTypeError {
            source_type: source_type.to_string(),
            source_db,
        })?;
        let (target_type, is_lossy) = Self::to_native(&canonical, target_db);
        Ok(ConvertedType {
            target_type,
            is_lossy,
        })
    }

    fn canonical_big_integer(&self, target_db: DatabaseType) -> &'static str {
        match target_db {
            DatabaseType::Relational | DatabaseType::Columnar => "bigint",
            _ => "long",
        }
    }

    fn canonical_json(&self, target_db: DatabaseType) -> &'static str {
        match target_db {
            DatabaseType::Relational | DatabaseType::Columnar => "jsonb",
            _ => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_mapping_is_not_lossy() {
        let converter = StandardTypeConverter;
        let converted = converter
            .convert("integer", DatabaseType::Relational, DatabaseType::Relational)
            .unwrap();
        assert_eq!(converted.target_type, "integer");
        assert!(!converted.is_lossy);
    }

    #[test]
    fn json_into_search_engine_is_lossy() {
        let converter = StandardTypeConverter;
        let converted = converter
            .convert("jsonb", DatabaseType::Relational, DatabaseType::Search)
            .unwrap();
        assert!(converted.is_lossy);
    }

    #[test]
    fn unknown_type_is_a_hard_error_not_silent_coercion() {
        let converter = StandardTypeConverter;
        let err = converter
            .convert("frobnicator", DatabaseType::Relational, DatabaseType::Graph)
            .unwrap_err();
        assert_eq!(err.source_type, "frobnicator");
    }
}
