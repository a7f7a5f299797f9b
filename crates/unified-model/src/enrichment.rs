use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A side-car structure attached to a schema ID (spec §3.2). Produced by the
/// classifier/ML pipeline this crate treats as an external collaborator
/// (spec §1) — `unified-model` only defines the shape the translator reads.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnifiedModelEnrichment {
    pub schema_id: String,
    pub tables: BTreeMap<String, TableEnrichment>,
    pub columns: BTreeMap<String, BTreeMap<String, ColumnEnrichment>>,
    pub indexes: BTreeMap<String, IndexEnrichment>,
    pub views: BTreeMap<String, ViewEnrichment>,
}

impl UnifiedModelEnrichment {
    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnEnrichment> {
        self.columns.get(table).and_then(|cols| cols.get(column))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPattern {
    ReadHeavy,
    WriteHeavy,
    Mixed,
    Archival,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableEnrichment {
    pub primary_category: String,
    pub classification_confidence: f64,
    pub access_pattern: AccessPattern,
    pub sensitivity: RiskLevel,
}

/// Pointer-valued numeric fields indicate absence per spec §3.2: an unset
/// `quality_score` is `None`, never `Some(0.0)`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ColumnEnrichment {
    pub is_privileged_data: bool,
    pub data_category: Option<String>,
    pub risk_level: Option<RiskLevel>,
    pub compliance_impact: Option<String>,
    pub quality_score: Option<f64>,
    pub recommended_index_type: Option<String>,
    pub should_encrypt: bool,
    pub should_mask: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexEnrichment {
    pub is_redundant: bool,
    pub optimization_hints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ViewEnrichment {
    pub complexity: Option<String>,
    pub dependencies: Vec<String>,
    pub is_materializable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_quality_score_is_none_not_zero() {
        let enrichment = ColumnEnrichment::default();
        assert_eq!(enrichment.quality_score, None);
    }

    #[test]
    fn column_lookup_traverses_table_then_column() {
        let mut model = UnifiedModelEnrichment {
            schema_id: "schema-1".into(),
            ..Default::default()
        };
        model.columns.entry("person".into()).or_default().insert(
            "email".into(),
            ColumnEnrichment {
                is_privileged_data: true,
                ..Default::default()
            },
        );
        assert!(model.column("person", "email").unwrap().is_privileged_data);
        assert!(model.column("person", "missing").is_none());
    }
}
