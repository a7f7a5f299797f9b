//! Translation context: the per-call bag of inputs/decisions/stats that
//! every [`crate::Strategy`] is handed (spec §4.1).

use crate::mapping::GeneratedMapping;
use crate::property_analysis::SampleDataSet;
use crate::warning::TranslationWarning;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use unified_model::UnifiedModel;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub String);

impl DecisionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOption {
    pub id: String,
    pub label: String,
}

/// A pending decision a strategy would like the host to make explicitly,
/// with a recommended default it will fall back to otherwise
/// (spec §4.1 `GetUserDecisions`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDecision {
    pub decision_id: DecisionId,
    pub object: String,
    pub options: Vec<DecisionOption>,
    pub recommended_default: String,
}

/// Running counters a [`crate::Strategy`] updates as it converts; satisfies
/// testable property 1 (`processed = converted + skipped`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationStats {
    pub lossy_conversions: u64,
    pub objects_converted: u64,
    pub objects_skipped: u64,
}

impl TranslationStats {
    pub fn processed(&self) -> u64 {
        self.objects_converted + self.objects_skipped
    }
}

pub struct TranslationContext<'a> {
    pub source_model: &'a UnifiedModel,
    pub sample_data: Option<&'a SampleDataSet>,
    pub strategy_overrides: HashMap<DecisionId, String>,
    pub stats: TranslationStats,
}

impl<'a> TranslationContext<'a> {
    pub fn new(source_model: &'a UnifiedModel) -> Self {
        Self {
            source_model,
            sample_data: None,
            strategy_overrides: HashMap::new(),
            stats: TranslationStats::default(),
        }
    }

    pub fn with_sample_data(mut self, sample_data: &'a SampleDataSet) -> Self {
        self.sample_data = Some(sample_data);
        self
    }

    pub fn with_override(mut self, decision: DecisionId, option_id: impl Into<String>) -> Self {
        self.strategy_overrides.insert(decision, option_id.into());
        self
    }

    /// Selection order named repeatedly in spec §4.1: explicit user
    /// override, then the caller-supplied suggestion (usually derived from
    /// sample data), then a configured default.
    pub fn resolve_choice(
        &self,
        decision: &DecisionId,
        sample_suggestion: Option<&str>,
        configured_default: &str,
    ) -> String {
        if let Some(overridden) = self.strategy_overrides.get(decision) {
            return overridden.clone();
        }
        if let Some(suggestion) = sample_suggestion {
            return suggestion.to_string();
        }
        configured_default.to_string()
    }
}

/// The result of [`crate::Strategy::convert`].
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub target_schema: UnifiedModel,
    pub mappings: Vec<GeneratedMapping>,
    pub warnings: Vec<TranslationWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use unified_model::DatabaseType;

    #[test]
    fn override_wins_over_suggestion_and_default() {
        let model = UnifiedModel::new(DatabaseType::Graph);
        let decision = DecisionId::new("person.property_mapping");
        let ctx = TranslationContext::new(&model)
            .with_override(decision.clone(), "all_to_columns");

        assert_eq!(
            ctx.resolve_choice(&decision, Some("core_to_columns"), "minimal_to_columns"),
            "all_to_columns"
        );
    }

    #[test]
    fn suggestion_wins_over_default_absent_override() {
        let model = UnifiedModel::new(DatabaseType::Graph);
        let decision = DecisionId::new("person.property_mapping");
        let ctx = TranslationContext::new(&model);

        assert_eq!(
            ctx.resolve_choice(&decision, Some("core_to_columns"), "minimal_to_columns"),
            "core_to_columns"
        );
    }

    #[test]
    fn processed_equals_converted_plus_skipped() {
        let mut stats = TranslationStats::default();
        stats.objects_converted = 7;
        stats.objects_skipped = 3;
        assert_eq!(stats.processed(), 10);
    }
}
