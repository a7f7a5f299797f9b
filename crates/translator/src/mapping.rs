//! Output mapping records (spec §4.1 "Output mappings").

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    Direct,
    HybridProperty,
    ForeignKey,
    JunctionTable,
    Transformation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMappingRule {
    pub source_field: String,
    pub target_field: String,
    pub source_type: String,
    pub target_type: String,
    pub cardinality: Cardinality,
    pub transformation: Option<String>,
    pub required: bool,
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMapping {
    pub mapping_id: String,
    pub mapping_type: MappingType,
    pub source_object: String,
    pub target_object: String,
    pub rules: Vec<GeneratedMappingRule>,
}

impl GeneratedMapping {
    /// Mapping IDs are derived deterministically from sanitized source/
    /// target identifiers, so re-translating the same schema produces the
    /// same IDs (spec §4.1: "re-translating the same schema is idempotent").
    pub fn deterministic_id(
        mapping_type: MappingType,
        source_object: &str,
        target_object: &str,
    ) -> String {
        let kind = match mapping_type {
            MappingType::Direct => "direct",
            MappingType::HybridProperty => "hybrid_property",
            MappingType::ForeignKey => "foreign_key",
            MappingType::JunctionTable => "junction_table",
            MappingType::Transformation => "transformation",
        };
        format!(
            "{kind}:{}->{}",
            crate::sanitize::sanitize(source_object),
            crate::sanitize::sanitize(target_object)
        )
    }

    pub fn new(mapping_type: MappingType, source_object: &str, target_object: &str) -> Self {
        Self {
            mapping_id: Self::deterministic_id(mapping_type, source_object, target_object),
            mapping_type,
            source_object: source_object.to_string(),
            target_object: target_object.to_string(),
            rules: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_ids_are_stable_across_repeated_translation() {
        let first = GeneratedMapping::deterministic_id(MappingType::ForeignKey, "Book", "Author");
        let second = GeneratedMapping::deterministic_id(MappingType::ForeignKey, "Book", "Author");
        assert_eq!(first, second);
    }
}
