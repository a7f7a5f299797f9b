//! Relational -> Graph strategy (spec §4.1 "RelationalToGraph").
//!
//! Classifies each table as an entity or a junction (a junction has at
//! least two foreign keys and at most three non-key, non-foreign-key
//! columns), turns entity tables into node labels and junction tables
//! into relationships, and derives foreign-key relationship type names
//! either from the constraint name or from `PARENT_HAS_CHILD`.

use crate::context::{ConversionOutput, DecisionId, PendingDecision, TranslationContext};
use crate::error::Result;
use crate::mapping::{Cardinality, GeneratedMapping, GeneratedMappingRule, MappingType};
use crate::registry::Strategy;
use crate::sanitize::Sanitizer;
use crate::type_converter::TypeConverter;
use crate::warning::TranslationWarning;
use std::collections::BTreeMap;
use std::sync::Arc;
use unified_model::{
    ConstraintKind, DatabaseType, Field, GraphNode, GraphRelationship, Table, UnifiedModel,
    UnifiedModelEnrichment,
};

/// Junction tables carry at most this many non-key, non-foreign-key
/// columns before they're reclassified as entities in their own right.
const JUNCTION_MAX_EXTRA_COLUMNS: usize = 3;

pub struct RelationalToGraph {
    converter: Arc<dyn TypeConverter>,
}

impl RelationalToGraph {
    pub fn new(converter: Arc<dyn TypeConverter>) -> Self {
        Self { converter }
    }

    fn decision_id(table: &str) -> DecisionId {
        DecisionId::new(format!("{table}.classification"))
    }

    fn foreign_keys(table: &Table) -> Vec<(&str, &str, &[String])> {
        table
            .constraints
            .iter()
            .filter_map(|c| match &c.kind {
                ConstraintKind::ForeignKey {
                    referenced_table, ..
                } => Some((
                    referenced_table.as_str(),
                    c.name.as_str(),
                    c.columns.as_slice(),
                )),
                _ => None,
            })
            .collect()
    }

    fn primary_key_columns(table: &Table) -> std::collections::BTreeSet<&str> {
        table
            .columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// A table is a junction when it has at least two foreign keys and at
    /// most [`JUNCTION_MAX_EXTRA_COLUMNS`] columns that are neither part of
    /// the primary key nor a foreign-key column.
    fn is_junction(table: &Table) -> bool {
        let foreign_keys = Self::foreign_keys(table);
        if foreign_keys.len() < 2 {
            return false;
        }
        let fk_columns: std::collections::BTreeSet<&str> = foreign_keys
            .iter()
            .flat_map(|(_, _, cols)| cols.iter().map(String::as_str))
            .collect();
        let pk_columns = Self::primary_key_columns(table);
        let extra = table
            .columns
            .iter()
            .filter(|c| !fk_columns.contains(c.name.as_str()) && !pk_columns.contains(c.name.as_str()))
            .count();
        extra <= JUNCTION_MAX_EXTRA_COLUMNS
    }

    fn resolve_classification(&self, ctx: &TranslationContext, table: &Table) -> bool {
        let decision = Self::decision_id(&table.name);
        let default = if Self::is_junction(table) {
            "junction"
        } else {
            "entity"
        };
        ctx.resolve_choice(&decision, None, default) == "junction"
    }

    fn node_label(table_name: &str, sanitizer: &mut Sanitizer) -> String {
        to_pascal_case(&singular(&sanitizer.sanitize(table_name)))
    }

    fn property_name(column_name: &str, sanitizer: &mut Sanitizer) -> String {
        to_camel_case(&sanitizer.sanitize(column_name))
    }

    fn relationship_type(
        constraint_name: &str,
        source_table: &str,
        target_table: &str,
        sanitizer: &mut Sanitizer,
    ) -> String {
        if let Some(derived) = derive_from_constraint_name(constraint_name) {
            return derived;
        }
        format!(
            "{}_HAS_{}",
            singular(&sanitizer.sanitize(source_table)).to_ascii_uppercase(),
            singular(&sanitizer.sanitize(target_table)).to_ascii_uppercase(),
        )
    }

    fn convert_entity_table(
        &self,
        table: &Table,
        sanitizer: &mut Sanitizer,
        target: &mut UnifiedModel,
        mappings: &mut Vec<GeneratedMapping>,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Result<()> {
        let label = Self::node_label(&table.name, sanitizer);
        let fk_columns: std::collections::BTreeSet<&str> = Self::foreign_keys(table)
            .iter()
            .flat_map(|(_, _, cols)| cols.iter().map(String::as_str))
            .collect();

        let mut node = GraphNode {
            name: label.clone(),
            comment: table.comment.clone(),
            ..Default::default()
        };
        let mut mapping = GeneratedMapping::new(MappingType::Direct, &table.name, &label);

        for column in &table.columns {
            if fk_columns.contains(column.name.as_str()) {
                continue;
            }
            let property = Self::property_name(&column.name, sanitizer);
            let converted = self
                .converter
                .convert(&column.data_type, DatabaseType::Relational, DatabaseType::Graph)
                .unwrap_or_else(|_| {
                    warnings.push(TranslationWarning::compatibility(
                        format!("{}.{}", table.name, column.name),
                        crate::warning::Severity::Medium,
                        format!("unknown source type {:?}; falling back to string", column.data_type),
                    ));
                    crate::type_converter::ConvertedType {
                        target_type: "string".to_string(),
                        is_lossy: true,
                    }
                });
            node.properties.push(Field {
                name: property.clone(),
                data_type: converted.target_type.clone(),
                nullable: column.nullable,
                options: Default::default(),
            });
            mapping.rules.push(GeneratedMappingRule {
                source_field: column.name.clone(),
                target_field: property,
                source_type: column.data_type.clone(),
                target_type: converted.target_type,
                cardinality: Cardinality::OneToOne,
                transformation: None,
                required: !column.nullable,
                default_value: None,
                metadata: BTreeMap::from([(
                    "is_lossy_conversion".to_string(),
                    serde_json::Value::Bool(converted.is_lossy),
                )]),
            });
        }

        target.insert_node(node)?;
        mappings.push(mapping);
        Ok(())
    }

    fn convert_foreign_key_relationship(
        &self,
        table: &Table,
        constraint_name: &str,
        referenced_table: &str,
        columns: &[String],
        sanitizer: &mut Sanitizer,
        target: &mut UnifiedModel,
        mappings: &mut Vec<GeneratedMapping>,
    ) {
        // The referenced ("one") side plays the relationship's source role
        // and the owning ("many") side its target, so a foreign key from
        // `books.author_id` to `authors` reads as `AUTHOR_HAS_BOOK` rather
        // than the reverse.
        let parent_label = Self::node_label(referenced_table, sanitizer);
        let child_label = Self::node_label(&table.name, sanitizer);
        let rel_type = Self::relationship_type(constraint_name, referenced_table, &table.name, sanitizer);

        let rel = GraphRelationship {
            name: rel_type.clone(),
            comment: None,
            from_label: parent_label,
            to_label: child_label,
            properties: Vec::new(),
            options: Default::default(),
        };
        // Two different foreign keys on the same table can legitimately
        // derive the same relationship type name (e.g. two constraints
        // both named without a distinguishing suffix); a duplicate insert
        // here means the derivation produced a real name collision rather
        // than a translation bug, so it's surfaced rather than silently
        // dropped.
        if target.insert_relationship(rel).is_ok() {
            let mut mapping =
                GeneratedMapping::new(MappingType::ForeignKey, constraint_name, &rel_type);
            mapping.rules.push(GeneratedMappingRule {
                source_field: columns.join(","),
                target_field: rel_type,
                source_type: "foreign_key".to_string(),
                target_type: "relationship".to_string(),
                cardinality: Cardinality::ManyToOne,
                transformation: None,
                required: false,
                default_value: None,
                metadata: BTreeMap::new(),
            });
            mappings.push(mapping);
        }
    }

    fn convert_junction_table(
        &self,
        table: &Table,
        sanitizer: &mut Sanitizer,
        target: &mut UnifiedModel,
        mappings: &mut Vec<GeneratedMapping>,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Result<()> {
        let foreign_keys = Self::foreign_keys(table);
        let Some((source_ref, _, _)) = foreign_keys.first() else {
            return Ok(());
        };
        let Some((target_ref, constraint_name, _)) = foreign_keys.get(1) else {
            return Ok(());
        };

        let source_label = Self::node_label(source_ref, sanitizer);
        let target_label = Self::node_label(target_ref, sanitizer);
        let rel_type = Self::relationship_type(constraint_name, source_ref, target_ref, sanitizer);

        let fk_columns: std::collections::BTreeSet<&str> = foreign_keys
            .iter()
            .flat_map(|(_, _, cols)| cols.iter().map(String::as_str))
            .collect();
        let pk_columns = Self::primary_key_columns(table);

        let mut rel = GraphRelationship {
            name: rel_type.clone(),
            comment: table.comment.clone(),
            from_label: source_label,
            to_label: target_label,
            properties: Vec::new(),
            options: Default::default(),
        };
        let mut mapping = GeneratedMapping::new(MappingType::JunctionTable, &table.name, &rel_type);

        for column in &table.columns {
            if fk_columns.contains(column.name.as_str()) || pk_columns.contains(column.name.as_str()) {
                continue;
            }
            let property = Self::property_name(&column.name, sanitizer);
            let converted = self
                .converter
                .convert(&column.data_type, DatabaseType::Relational, DatabaseType::Graph)
                .unwrap_or_else(|_| {
                    warnings.push(TranslationWarning::compatibility(
                        format!("{}.{}", table.name, column.name),
                        crate::warning::Severity::Medium,
                        format!("unknown source type {:?}; falling back to string", column.data_type),
                    ));
                    crate::type_converter::ConvertedType {
                        target_type: "string".to_string(),
                        is_lossy: true,
                    }
                });
            rel.properties.push(Field {
                name: property.clone(),
                data_type: converted.target_type.clone(),
                nullable: column.nullable,
                options: Default::default(),
            });
            mapping.rules.push(GeneratedMappingRule {
                source_field: column.name.clone(),
                target_field: property,
                source_type: column.data_type.clone(),
                target_type: converted.target_type,
                cardinality: Cardinality::OneToOne,
                transformation: None,
                required: !column.nullable,
                default_value: None,
                metadata: BTreeMap::from([(
                    "is_lossy_conversion".to_string(),
                    serde_json::Value::Bool(converted.is_lossy),
                )]),
            });
        }
        target.insert_relationship(rel)?;
        mappings.push(mapping);
        Ok(())
    }
}

fn to_pascal_case(sanitized: &str) -> String {
    sanitized
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn to_camel_case(sanitized: &str) -> String {
    let pascal = to_pascal_case(sanitized);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => pascal,
    }
}

/// Best-effort singularization: strips a trailing `s` (but not `ss`),
/// which is sufficient for the `authors`/`books`/`tags`-style identifiers
/// this strategy is expected to see.
fn singular(word: &str) -> String {
    if word.len() > 1 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Honors a constraint explicitly named to carry a relationship type, by
/// convention prefixed `rel_` (e.g. `rel_authored_by`). Plain
/// engine-generated FK constraint names (`books_author_id_fkey`) don't
/// match and fall back to the `SOURCE_HAS_TARGET` derivation instead.
fn derive_from_constraint_name(constraint_name: &str) -> Option<String> {
    let stripped = constraint_name.strip_prefix("rel_")?;
    if stripped.is_empty() {
        return None;
    }
    Some(stripped.to_ascii_uppercase())
}

impl Strategy for RelationalToGraph {
    fn name(&self) -> &'static str {
        "relational_to_graph"
    }

    fn source_paradigm(&self) -> DatabaseType {
        DatabaseType::Relational
    }

    fn target_paradigm(&self) -> DatabaseType {
        DatabaseType::Graph
    }

    fn requires_sample_data(&self) -> bool {
        false
    }

    fn requires_enrichment(&self) -> bool {
        false
    }

    fn supported_source_types(&self) -> &'static [&'static str] {
        &["table"]
    }

    fn get_user_decisions(&self, ctx: &TranslationContext) -> Vec<PendingDecision> {
        ctx.source_model
            .tables
            .values()
            .map(|table| {
                let default = if Self::is_junction(table) {
                    "junction"
                } else {
                    "entity"
                };
                PendingDecision {
                    decision_id: Self::decision_id(&table.name),
                    object: table.name.clone(),
                    options: vec![
                        crate::context::DecisionOption {
                            id: "entity".to_string(),
                            label: "entity".to_string(),
                        },
                        crate::context::DecisionOption {
                            id: "junction".to_string(),
                            label: "junction".to_string(),
                        },
                    ],
                    recommended_default: default.to_string(),
                }
            })
            .collect()
    }

    #[tracing::instrument(skip_all, fields(tables = ctx.source_model.tables.len()))]
    fn convert(
        &self,
        ctx: &mut TranslationContext,
        _enrichment: Option<&UnifiedModelEnrichment>,
    ) -> Result<ConversionOutput> {
        let mut target = UnifiedModel::new(DatabaseType::Graph);
        let mut mappings = Vec::new();
        let mut warnings = Vec::new();
        let mut sanitizer = Sanitizer::new();

        let tables: Vec<Table> = ctx.source_model.tables.values().cloned().collect();

        let mut junction_tables = Vec::new();
        for table in &tables {
            if self.resolve_classification(ctx, table) {
                junction_tables.push(table);
            } else {
                self.convert_entity_table(table, &mut sanitizer, &mut target, &mut mappings, &mut warnings)?;
                ctx.stats.objects_converted += 1;
            }
        }

        for table in &tables {
            if !self.resolve_classification(ctx, table) {
                for (referenced_table, constraint_name, columns) in Self::foreign_keys(table) {
                    self.convert_foreign_key_relationship(
                        table,
                        constraint_name,
                        referenced_table,
                        columns,
                        &mut sanitizer,
                        &mut target,
                        &mut mappings,
                    );
                }
            }
        }

        for table in &junction_tables {
            self.convert_junction_table(table, &mut sanitizer, &mut target, &mut mappings, &mut warnings)?;
            ctx.stats.objects_converted += 1;
        }

        Ok(ConversionOutput {
            target_schema: target,
            mappings,
            warnings,
        })
    }
}
