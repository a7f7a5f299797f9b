//! Graph -> Relational strategy (spec §4.1 "GraphToRelational").

use crate::context::{ConversionOutput, DecisionId, DecisionOption, PendingDecision, TranslationContext};
use crate::error::Result;
use crate::mapping::{Cardinality, GeneratedMapping, GeneratedMappingRule, MappingType};
use crate::property_analysis::{analyze_properties, PropertyMappingStrategy};
use crate::registry::Strategy;
use crate::sanitize::Sanitizer;
use crate::type_converter::{ConvertedType, TypeConverter};
use crate::warning::{Severity, TranslationWarning};
use std::collections::BTreeMap;
use std::sync::Arc;
use unified_model::{
    Column, Constraint, ConstraintKind, DatabaseType, GraphNode, GraphRelationship, Index,
    ReferentialAction, Table, UnifiedModel, UnifiedModelEnrichment,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelationshipMappingStrategy {
    ForeignKey,
    JunctionTable,
    Hybrid,
}

pub struct GraphToRelational {
    converter: Arc<dyn TypeConverter>,
    default_node_strategy: PropertyMappingStrategy,
    default_relationship_strategy: RelationshipMappingStrategy,
}

impl GraphToRelational {
    pub fn new(converter: Arc<dyn TypeConverter>) -> Self {
        Self {
            converter,
            default_node_strategy: PropertyMappingStrategy::CoreToColumns,
            default_relationship_strategy: RelationshipMappingStrategy::Hybrid,
        }
    }

    fn node_decision_id(label: &str) -> DecisionId {
        DecisionId::new(format!("{label}.property_mapping"))
    }

    fn relationship_decision_id(name: &str) -> DecisionId {
        DecisionId::new(format!("{name}.relationship_mapping"))
    }

    fn suggest_node_strategy(&self, ctx: &TranslationContext, label: &str) -> Option<&'static str> {
        let samples = ctx.sample_data?.samples_for(label);
        if samples.is_empty() {
            return None;
        }
        let profiles = analyze_properties(samples);
        if profiles.iter().all(|p| p.is_core) {
            Some("all_to_columns")
        } else {
            Some("core_to_columns")
        }
    }

    fn resolve_node_strategy(&self, ctx: &TranslationContext, label: &str) -> PropertyMappingStrategy {
        let decision = Self::node_decision_id(label);
        let suggestion = self.suggest_node_strategy(ctx, label);
        let default = match self.default_node_strategy {
            PropertyMappingStrategy::AllToColumns => "all_to_columns",
            PropertyMappingStrategy::CoreToColumns => "core_to_columns",
            PropertyMappingStrategy::MinimalToColumns => "minimal_to_columns",
        };
        match ctx.resolve_choice(&decision, suggestion, default).as_str() {
            "all_to_columns" => PropertyMappingStrategy::AllToColumns,
            "minimal_to_columns" => PropertyMappingStrategy::MinimalToColumns,
            _ => PropertyMappingStrategy::CoreToColumns,
        }
    }

    fn resolve_relationship_strategy(
        &self,
        ctx: &TranslationContext,
        rel: &GraphRelationship,
    ) -> RelationshipMappingStrategy {
        let decision = Self::relationship_decision_id(&rel.name);
        let default = match self.default_relationship_strategy {
            RelationshipMappingStrategy::ForeignKey => "foreign_key",
            RelationshipMappingStrategy::JunctionTable => "junction_table",
            RelationshipMappingStrategy::Hybrid => "hybrid",
        };
        match ctx.resolve_choice(&decision, None, default).as_str() {
            "foreign_key" => RelationshipMappingStrategy::ForeignKey,
            "junction_table" => RelationshipMappingStrategy::JunctionTable,
            _ => RelationshipMappingStrategy::Hybrid,
        }
    }

    /// A relationship is "complex" (and thus junction-worthy under the
    /// `hybrid` strategy) if it carries properties. Left open beyond that
    /// by the source material; resolved here and recorded in DESIGN.md.
    fn is_complex(rel: &GraphRelationship) -> bool {
        !rel.properties.is_empty()
    }

    fn convert_type_or_fallback(
        &self,
        object: &str,
        source_type: &str,
        warnings: &mut Vec<TranslationWarning>,
    ) -> ConvertedType {
        match self
            .converter
            .convert(source_type, DatabaseType::Graph, DatabaseType::Relational)
        {
            Ok(converted) => converted,
            Err(_) => {
                warnings.push(TranslationWarning::compatibility(
                    object,
                    Severity::Medium,
                    format!("unknown source type {source_type:?}; falling back to text"),
                ));
                ConvertedType {
                    target_type: "text".to_string(),
                    is_lossy: true,
                }
            }
        }
    }

    fn convert_node(
        &self,
        label: &str,
        node: &GraphNode,
        ctx: &mut TranslationContext,
        sanitizer: &mut Sanitizer,
        target: &mut UnifiedModel,
        mappings: &mut Vec<GeneratedMapping>,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Result<()> {
        let table_name = sanitizer.sanitize(label);
        let big_int = self.converter.canonical_big_integer(DatabaseType::Relational);

        let mut table = Table {
            name: table_name.clone(),
            comment: node.comment.clone(),
            ..Default::default()
        };
        table.columns.push(Column {
            name: "node_id".to_string(),
            comment: None,
            data_type: big_int.to_string(),
            nullable: false,
            is_primary_key: true,
            options: Default::default(),
        });
        table.constraints.push(Constraint {
            name: format!("{table_name}_pkey"),
            columns: vec!["node_id".to_string()],
            kind: ConstraintKind::PrimaryKey,
        });

        let strategy = self.resolve_node_strategy(ctx, label);
        let samples = ctx.sample_data.map(|s| s.samples_for(label)).unwrap_or(&[]);
        let core_names: std::collections::BTreeSet<String> = match strategy {
            PropertyMappingStrategy::AllToColumns => {
                node.properties.iter().map(|p| p.name.clone()).collect()
            }
            PropertyMappingStrategy::CoreToColumns => {
                if samples.is_empty() {
                    warnings.push(TranslationWarning::compatibility(
                        label,
                        Severity::Low,
                        "no sample data available; treating all properties as core",
                    ));
                    node.properties.iter().map(|p| p.name.clone()).collect()
                } else {
                    analyze_properties(samples)
                        .into_iter()
                        .filter(|p| p.is_core)
                        .map(|p| p.name)
                        .collect()
                }
            }
            PropertyMappingStrategy::MinimalToColumns => analyze_properties(samples)
                .into_iter()
                .filter(|p| p.frequency >= 1.0)
                .map(|p| p.name)
                .collect(),
        };

        let mut overflow: Vec<String> = Vec::new();
        let mut direct_mapping = GeneratedMapping::new(MappingType::Direct, label, &table_name);

        for property in &node.properties {
            if core_names.contains(&property.name) {
                let object = format!("{label}.{}", property.name);
                let converted = self.convert_type_or_fallback(&object, &property.data_type, warnings);
                let column_name = sanitizer.sanitize(&property.name);
                table.columns.push(Column {
                    name: column_name.clone(),
                    comment: None,
                    data_type: converted.target_type.clone(),
                    nullable: true,
                    is_primary_key: false,
                    options: Default::default(),
                });
                if converted.is_lossy {
                    ctx.stats.lossy_conversions += 1;
                    warnings.push(TranslationWarning::data_loss(
                        &object,
                        Severity::Low,
                        format!(
                            "{} -> {} is a lossy conversion",
                            property.data_type, converted.target_type
                        ),
                    ));
                }
                direct_mapping.rules.push(GeneratedMappingRule {
                    source_field: property.name.clone(),
                    target_field: column_name,
                    source_type: property.data_type.clone(),
                    target_type: converted.target_type,
                    cardinality: Cardinality::OneToOne,
                    transformation: None,
                    required: false,
                    default_value: None,
                    metadata: BTreeMap::from([(
                        "is_lossy_conversion".to_string(),
                        serde_json::Value::Bool(converted.is_lossy),
                    )]),
                });
                ctx.stats.objects_converted += 1;
            } else {
                overflow.push(property.name.clone());
                ctx.stats.objects_skipped += 1;
            }
        }

        if !overflow.is_empty() {
            let json_type = self.converter.canonical_json(DatabaseType::Relational);
            table.columns.push(Column {
                name: "additional_properties".to_string(),
                comment: None,
                data_type: json_type.to_string(),
                nullable: true,
                is_primary_key: false,
                options: Default::default(),
            });
            let mut overflow_mapping =
                GeneratedMapping::new(MappingType::HybridProperty, label, &table_name);
            overflow_mapping.rules.push(GeneratedMappingRule {
                source_field: "*".to_string(),
                target_field: "additional_properties".to_string(),
                source_type: "mixed".to_string(),
                target_type: json_type.to_string(),
                cardinality: Cardinality::ManyToOne,
                transformation: None,
                required: false,
                default_value: None,
                metadata: BTreeMap::from([(
                    "aggregated_properties".to_string(),
                    serde_json::json!(overflow),
                )]),
            });
            mappings.push(overflow_mapping);
        }

        if !direct_mapping.rules.is_empty() {
            mappings.push(direct_mapping);
        }

        target.insert_table(table)?;
        Ok(())
    }

    fn convert_relationship(
        &self,
        rel: &GraphRelationship,
        ctx: &mut TranslationContext,
        sanitizer: &mut Sanitizer,
        target: &mut UnifiedModel,
        mappings: &mut Vec<GeneratedMapping>,
        warnings: &mut Vec<TranslationWarning>,
    ) -> Result<()> {
        let resolved = match self.resolve_relationship_strategy(ctx, rel) {
            RelationshipMappingStrategy::Hybrid if Self::is_complex(rel) => {
                RelationshipMappingStrategy::JunctionTable
            }
            RelationshipMappingStrategy::Hybrid => RelationshipMappingStrategy::ForeignKey,
            other => other,
        };

        let from_table = sanitizer.sanitize(&rel.from_label);
        let to_table = sanitizer.sanitize(&rel.to_label);

        match resolved {
            RelationshipMappingStrategy::ForeignKey => {
                let column_name = format!("{}_id", sanitizer.sanitize(&rel.name));
                let constraint_name = format!("{from_table}_{column_name}_fkey");
                if let Some(source_table) = target.tables.get_mut(&from_table) {
                    source_table.columns.push(Column {
                        name: column_name.clone(),
                        comment: None,
                        data_type: self
                            .converter
                            .canonical_big_integer(DatabaseType::Relational)
                            .to_string(),
                        nullable: true,
                        is_primary_key: false,
                        options: Default::default(),
                    });
                    source_table.constraints.push(Constraint {
                        name: constraint_name,
                        columns: vec![column_name.clone()],
                        kind: ConstraintKind::ForeignKey {
                            referenced_table: to_table.clone(),
                            referenced_columns: vec!["node_id".to_string()],
                            on_update: ReferentialAction::Cascade,
                            on_delete: ReferentialAction::SetNull,
                        },
                    });
                }
                let mut mapping =
                    GeneratedMapping::new(MappingType::ForeignKey, &rel.name, &from_table);
                mapping.rules.push(GeneratedMappingRule {
                    source_field: rel.name.clone(),
                    target_field: column_name,
                    source_type: "relationship".to_string(),
                    target_type: self
                        .converter
                        .canonical_big_integer(DatabaseType::Relational)
                        .to_string(),
                    cardinality: Cardinality::ManyToOne,
                    transformation: None,
                    required: false,
                    default_value: None,
                    metadata: BTreeMap::new(),
                });
                mappings.push(mapping);
            }
            RelationshipMappingStrategy::JunctionTable => {
                let junction_name = sanitizer.sanitize(&rel.name);
                let mut junction = Table {
                    name: junction_name.clone(),
                    comment: rel.comment.clone(),
                    ..Default::default()
                };
                let big_int = self
                    .converter
                    .canonical_big_integer(DatabaseType::Relational)
                    .to_string();
                junction.columns.push(Column {
                    name: "source_node_id".to_string(),
                    comment: None,
                    data_type: big_int.clone(),
                    nullable: false,
                    is_primary_key: true,
                    options: Default::default(),
                });
                junction.columns.push(Column {
                    name: "target_node_id".to_string(),
                    comment: None,
                    data_type: big_int,
                    nullable: false,
                    is_primary_key: true,
                    options: Default::default(),
                });
                junction.constraints.push(Constraint {
                    name: format!("{junction_name}_pkey"),
                    columns: vec!["source_node_id".to_string(), "target_node_id".to_string()],
                    kind: ConstraintKind::PrimaryKey,
                });
                junction.constraints.push(Constraint {
                    name: format!("{junction_name}_source_fkey"),
                    columns: vec!["source_node_id".to_string()],
                    kind: ConstraintKind::ForeignKey {
                        referenced_table: from_table.clone(),
                        referenced_columns: vec!["node_id".to_string()],
                        on_update: ReferentialAction::NoAction,
                        on_delete: ReferentialAction::Cascade,
                    },
                });
                junction.constraints.push(Constraint {
                    name: format!("{junction_name}_target_fkey"),
                    columns: vec!["target_node_id".to_string()],
                    kind: ConstraintKind::ForeignKey {
                        referenced_table: to_table.clone(),
                        referenced_columns: vec!["node_id".to_string()],
                        on_update: ReferentialAction::NoAction,
                        on_delete: ReferentialAction::Cascade,
                    },
                });

                let mut mapping =
                    GeneratedMapping::new(MappingType::JunctionTable, &rel.name, &junction_name);
                for property in &rel.properties {
                    let object = format!("{}.{}", rel.name, property.name);
                    let converted = self.convert_type_or_fallback(&object, &property.data_type, warnings);
                    let column_name = sanitizer.sanitize(&property.name);
                    junction.columns.push(Column {
                        name: column_name.clone(),
                        comment: None,
                        data_type: converted.target_type.clone(),
                        nullable: true,
                        is_primary_key: false,
                        options: Default::default(),
                    });
                    if converted.is_lossy {
                        ctx.stats.lossy_conversions += 1;
                    }
                    mapping.rules.push(GeneratedMappingRule {
                        source_field: property.name.clone(),
                        target_field: column_name,
                        source_type: property.data_type.clone(),
                        target_type: converted.target_type,
                        cardinality: Cardinality::OneToOne,
                        transformation: None,
                        required: false,
                        default_value: None,
                        metadata: BTreeMap::from([(
                            "is_lossy_conversion".to_string(),
                            serde_json::Value::Bool(converted.is_lossy),
                        )]),
                    });
                }

                target.insert_table(junction)?;
                mappings.push(mapping);

                target.indexes.insert(
                    format!("{junction_name}_source_idx"),
                    Index {
                        name: format!("{junction_name}_source_idx"),
                        table: junction_name.clone(),
                        columns: vec!["source_node_id".to_string()],
                        unique: false,
                        options: Default::default(),
                    },
                );
                target.indexes.insert(
                    format!("{junction_name}_target_idx"),
                    Index {
                        name: format!("{junction_name}_target_idx"),
                        table: junction_name,
                        columns: vec!["target_node_id".to_string()],
                        unique: false,
                        options: Default::default(),
                    },
                );
            }
            RelationshipMappingStrategy::Hybrid => unreachable!("resolved above"),
        }
        Ok(())
    }
}

impl Strategy for GraphToRelational {
    fn name(&self) -> &'static str {
        "graph_to_relational"
    }

    fn source_paradigm(&self) -> DatabaseType {
        DatabaseType::Graph
    }

    fn target_paradigm(&self) -> DatabaseType {
        DatabaseType::Relational
    }

    fn requires_sample_data(&self) -> bool {
        false
    }

    fn requires_enrichment(&self) -> bool {
        false
    }

    fn supported_source_types(&self) -> &'static [&'static str] {
        &["node", "relationship"]
    }

    fn get_user_decisions(&self, ctx: &TranslationContext) -> Vec<PendingDecision> {
        let mut decisions = Vec::new();
        for label in ctx.source_model.nodes.keys() {
            decisions.push(PendingDecision {
                decision_id: Self::node_decision_id(label),
                object: label.clone(),
                options: vec![
                    option("all_to_columns"),
                    option("core_to_columns"),
                    option("minimal_to_columns"),
                ],
                recommended_default: "core_to_columns".to_string(),
            });
        }
        for name in ctx.source_model.relationships.keys() {
            decisions.push(PendingDecision {
                decision_id: Self::relationship_decision_id(name),
                object: name.clone(),
                options: vec![
                    option("foreign_key"),
                    option("junction_table"),
                    option("hybrid"),
                ],
                recommended_default: "hybrid".to_string(),
            });
        }
        decisions
    }

    #[tracing::instrument(skip_all, fields(nodes = ctx.source_model.nodes.len(), relationships = ctx.source_model.relationships.len()))]
    fn convert(
        &self,
        ctx: &mut TranslationContext,
        _enrichment: Option<&UnifiedModelEnrichment>,
    ) -> Result<ConversionOutput> {
        let mut target = UnifiedModel::new(DatabaseType::Relational);
        let mut mappings = Vec::new();
        let mut warnings = Vec::new();
        let mut sanitizer = Sanitizer::new();

        let nodes: Vec<(String, GraphNode)> = ctx
            .source_model
            .nodes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (label, node) in &nodes {
            self.convert_node(
                label,
                node,
                ctx,
                &mut sanitizer,
                &mut target,
                &mut mappings,
                &mut warnings,
            )?;
        }

        let relationships: Vec<GraphRelationship> =
            ctx.source_model.relationships.values().cloned().collect();
        for rel in &relationships {
            self.convert_relationship(rel, ctx, &mut sanitizer, &mut target, &mut mappings, &mut warnings)?;
        }

        Ok(ConversionOutput {
            target_schema: target,
            mappings,
            warnings,
        })
    }
}

fn option(id: &str) -> DecisionOption {
    DecisionOption {
        id: id.to_string(),
        label: id.to_string(),
    }
}
