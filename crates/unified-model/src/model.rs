use crate::error::{ModelError, Result};
use crate::types::{DatabaseType, Options};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A paradigm-neutral schema container (spec §3.1).
///
/// Object collections are keyed by name via [`IndexMap`] so that names are
/// unique per collection, enforced by
/// [`UnifiedModel::insert_table`] & friends rather than left to callers, while
/// preserving discovery order for anything that wants to print or diff a
/// schema deterministically. Insertion order is otherwise not meaningful.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnifiedModel {
    pub database_type: Option<DatabaseType>,

    pub schemas: IndexMap<String, Schema>,
    pub tables: IndexMap<String, Table>,
    pub views: IndexMap<String, View>,
    pub functions: IndexMap<String, Function>,
    pub indexes: IndexMap<String, Index>,

    pub collections: IndexMap<String, DocumentCollection>,

    pub nodes: IndexMap<String, GraphNode>,
    pub relationships: IndexMap<String, GraphRelationship>,

    pub vector_indexes: IndexMap<String, VectorIndex>,
    pub vectors: IndexMap<String, Vector>,
    pub embeddings: IndexMap<String, Embedding>,

    pub time_series_points: IndexMap<String, TimeSeriesPoint>,
}

impl UnifiedModel {
    pub fn new(database_type: DatabaseType) -> Self {
        Self {
            database_type: Some(database_type),
            ..Default::default()
        }
    }

    /// Inserts a table, rejecting a name collision rather than silently
    /// overwriting — this is what makes "names unique per collection" an
    /// enforced invariant rather than a hopeful convention.
    pub fn insert_table(&mut self, table: Table) -> Result<()> {
        insert_unique(&mut self.tables, "tables", table.name.clone(), table)
    }

    pub fn insert_node(&mut self, node: GraphNode) -> Result<()> {
        insert_unique(&mut self.nodes, "nodes", node.name.clone(), node)
    }

    pub fn insert_relationship(&mut self, rel: GraphRelationship) -> Result<()> {
        insert_unique(
            &mut self.relationships,
            "relationships",
            rel.name.clone(),
            rel,
        )
    }

    pub fn insert_collection(&mut self, collection: DocumentCollection) -> Result<()> {
        insert_unique(
            &mut self.collections,
            "collections",
            collection.name.clone(),
            collection,
        )
    }

    /// Validates the cross-object invariants named in spec §3.1. Called
    /// after discovery and after every translation, never partially: a
    /// [`UnifiedModel`] returned to a caller is expected to already satisfy
    /// this.
    pub fn validate(&self) -> Result<()> {
        for table in self.tables.values() {
            table.validate_primary_key()?;
            for constraint in &table.constraints {
                if let ConstraintKind::ForeignKey {
                    referenced_table,
                    referenced_columns,
                } = &constraint.kind
                {
                    let Some(target) = self.tables.get(referenced_table) else {
                        return Err(ModelError::UnknownReferencedTable {
                            table: table.name.clone(),
                            constraint: constraint.name.clone(),
                            referenced_table: referenced_table.clone(),
                        });
                    };
                    if referenced_columns.len() != constraint.columns.len() {
                        return Err(ModelError::ForeignKeyArityMismatch {
                            table: table.name.clone(),
                            constraint: constraint.name.clone(),
                            local_count: constraint.columns.len(),
                            referenced_count: referenced_columns.len(),
                        });
                    }
                    for referenced_column in referenced_columns {
                        if !target.columns.iter().any(|c| &c.name == referenced_column) {
                            return Err(ModelError::UnknownReferencedColumn {
                                table: table.name.clone(),
                                constraint: constraint.name.clone(),
                                referenced_table: referenced_table.clone(),
                                column: referenced_column.clone(),
                            });
                        }
                    }
                }
            }
        }
        for rel in self.relationships.values() {
            if !self.nodes.contains_key(&rel.from_label) {
                return Err(ModelError::UnknownNodeLabel {
                    relationship: rel.name.clone(),
                    label: rel.from_label.clone(),
                });
            }
            if !self.nodes.contains_key(&rel.to_label) {
                return Err(ModelError::UnknownNodeLabel {
                    relationship: rel.name.clone(),
                    label: rel.to_label.clone(),
                });
            }
        }
        Ok(())
    }
}

fn insert_unique<T>(
    map: &mut IndexMap<String, T>,
    collection: &'static str,
    name: String,
    value: T,
) -> Result<()> {
    if map.contains_key(&name) {
        return Err(ModelError::DuplicateName { collection, name });
    }
    map.insert(name, value);
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Schema {
    pub name: String,
    pub comment: Option<String>,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Table {
    pub name: String,
    pub comment: Option<String>,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub options: Options,
}

impl Table {
    /// `Column.is_primary_key=true` implies a same-named entry appears in
    /// the table's primary-key constraint columns.
    fn validate_primary_key(&self) -> Result<()> {
        let pk_columns: Vec<&str> = self
            .constraints
            .iter()
            .filter(|c| matches!(c.kind, ConstraintKind::PrimaryKey))
            .flat_map(|c| c.columns.iter().map(String::as_str))
            .collect();

        for column in &self.columns {
            if column.is_primary_key && !pk_columns.contains(&column.name.as_str()) {
                return Err(ModelError::PrimaryKeyMismatch {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub comment: Option<String>,
    pub data_type: String,
    pub nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub columns: Vec<String>,
    pub kind: ConstraintKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey {
        referenced_table: String,
        referenced_columns: Vec<String>,
        on_update: ReferentialAction,
        on_delete: ReferentialAction,
    },
    Check {
        expression: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct View {
    pub name: String,
    pub comment: Option<String>,
    pub definition: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Function {
    pub name: String,
    pub comment: Option<String>,
    pub language: String,
    pub definition: String,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocumentCollection {
    pub name: String,
    pub comment: Option<String>,
    pub fields: Vec<Field>,
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphNode {
    pub name: String,
    pub comment: Option<String>,
    pub properties: Vec<Field>,
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphRelationship {
    pub name: String,
    pub comment: Option<String>,
    pub from_label: String,
    pub to_label: String,
    pub properties: Vec<Field>,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VectorIndex {
    pub name: String,
    pub dimensions: u32,
    pub metric: String,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Vector {
    pub name: String,
    pub index: String,
    pub dimensions: u32,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Embedding {
    pub name: String,
    pub source_field: String,
    pub model: String,
    pub dimensions: u32,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimeSeriesPoint {
    pub name: String,
    pub timestamp_field: String,
    pub tags: Vec<Field>,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub options: Options,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, is_primary_key: bool) -> Column {
        Column {
            name: name.to_string(),
            comment: None,
            data_type: "text".to_string(),
            nullable: !is_primary_key,
            is_primary_key,
            options: Options::default(),
        }
    }

    #[test]
    fn duplicate_table_name_is_rejected() {
        let mut model = UnifiedModel::new(DatabaseType::Relational);
        model
            .insert_table(Table {
                name: "authors".into(),
                ..Default::default()
            })
            .unwrap();

        let err = model
            .insert_table(Table {
                name: "authors".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateName {
                collection: "tables",
                name: "authors".into(),
            }
        );
    }

    #[test]
    fn primary_key_column_requires_matching_constraint() {
        let mut table = Table {
            name: "authors".into(),
            ..Default::default()
        };
        table.columns.push(column("author_id", true));
        // No PrimaryKey constraint declared: this violates the invariant.
        let mut model = UnifiedModel::new(DatabaseType::Relational);
        model.insert_table(table).unwrap();

        assert!(matches!(
            model.validate(),
            Err(ModelError::PrimaryKeyMismatch { .. })
        ));
    }

    #[test]
    fn primary_key_column_with_constraint_validates() {
        let mut table = Table {
            name: "authors".into(),
            ..Default::default()
        };
        table.columns.push(column("author_id", true));
        table.constraints.push(Constraint {
            name: "authors_pkey".into(),
            columns: vec!["author_id".into()],
            kind: ConstraintKind::PrimaryKey,
        });
        let mut model = UnifiedModel::new(DatabaseType::Relational);
        model.insert_table(table).unwrap();
        model.validate().unwrap();
    }

    #[test]
    fn foreign_key_must_reference_existing_table_and_columns() {
        let mut books = Table {
            name: "books".into(),
            ..Default::default()
        };
        books.columns.push(column("book_id", true));
        books.columns.push(column("author_id", false));
        books.constraints.push(Constraint {
            name: "books_pkey".into(),
            columns: vec!["book_id".into()],
            kind: ConstraintKind::PrimaryKey,
        });
        books.constraints.push(Constraint {
            name: "books_author_fkey".into(),
            columns: vec!["author_id".into()],
            kind: ConstraintKind::ForeignKey {
                referenced_table: "authors".into(),
                referenced_columns: vec!["author_id".into()],
                on_update: ReferentialAction::Cascade,
                on_delete: ReferentialAction::SetNull,
            },
        });

        let mut model = UnifiedModel::new(DatabaseType::Relational);
        model.insert_table(books).unwrap();
        // authors table doesn't exist yet.
        assert!(matches!(
            model.validate(),
            Err(ModelError::UnknownReferencedTable { .. })
        ));
    }

    #[test]
    fn relationship_must_reference_existing_node_labels() {
        let mut model = UnifiedModel::new(DatabaseType::Graph);
        model
            .insert_node(GraphNode {
                name: "Person".into(),
                ..Default::default()
            })
            .unwrap();
        model
            .insert_relationship(GraphRelationship {
                name: "KNOWS".into(),
                from_label: "Person".into(),
                to_label: "Company".into(),
                ..Default::default()
            })
            .unwrap();

        assert!(matches!(
            model.validate(),
            Err(ModelError::UnknownNodeLabel { .. })
        ));
    }
}
