//! Property distribution analysis (spec §4.1): when sample data is
//! available, decide which properties of a node label / table are "core"
//! (present often enough to deserve their own column) versus long-tail
//! (better folded into a hybrid JSON column).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use unified_model::PrimitiveType;

/// Frequency at or above which a property is classified "core" (spec §4.1).
pub const CORE_FREQUENCY_THRESHOLD: f64 = 0.7;

/// Sample documents/rows keyed by object name (table or node label), used
/// only when a strategy declares `requires_sample_data`.
#[derive(Debug, Clone, Default)]
pub struct SampleDataSet {
    pub samples_by_object: BTreeMap<String, Vec<serde_json::Value>>,
}

impl SampleDataSet {
    pub fn samples_for(&self, object: &str) -> &[serde_json::Value] {
        self.samples_by_object
            .get(object)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyProfile {
    pub name: String,
    pub frequency: f64,
    pub observed_types: BTreeSet<PrimitiveType>,
    pub is_core: bool,
}

/// Computes, per property of an object's sample documents, the presence
/// frequency and observed primitive-type set.
pub fn analyze_properties(samples: &[serde_json::Value]) -> Vec<PropertyProfile> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut presence: BTreeMap<String, usize> = BTreeMap::new();
    let mut types: BTreeMap<String, BTreeSet<PrimitiveType>> = BTreeMap::new();

    for sample in samples {
        let serde_json::Value::Object(fields) = sample else {
            continue;
        };
        for (key, value) in fields {
            *presence.entry(key.clone()).or_insert(0) += 1;
            types
                .entry(key.clone())
                .or_default()
                .insert(primitive_type_of(value));
        }
    }

    let total = samples.len() as f64;
    presence
        .into_iter()
        .map(|(name, count)| {
            let frequency = count as f64 / total;
            PropertyProfile {
                observed_types: types.remove(&name).unwrap_or_default(),
                is_core: frequency >= CORE_FREQUENCY_THRESHOLD,
                name,
                frequency,
            }
        })
        .collect()
}

fn primitive_type_of(value: &serde_json::Value) -> PrimitiveType {
    match value {
        serde_json::Value::Null => PrimitiveType::Null,
        serde_json::Value::Bool(_) => PrimitiveType::Boolean,
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => PrimitiveType::Integer,
        serde_json::Value::Number(_) => PrimitiveType::Float,
        serde_json::Value::String(_) => PrimitiveType::String,
        serde_json::Value::Array(_) => PrimitiveType::Array,
        serde_json::Value::Object(_) => PrimitiveType::Object,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyMappingStrategy {
    AllToColumns,
    CoreToColumns,
    MinimalToColumns,
}
