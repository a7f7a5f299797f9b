//! Scenario: a small library schema (authors / books / tags / book_tags)
//! translated relational -> graph. Exercises entity/junction
//! classification and foreign-key-derived relationship naming together.

use std::sync::Arc;
use translator::{RelationalToGraph, StandardTypeConverter, Strategy, TranslationContext};
use unified_model::{
    Column, Constraint, ConstraintKind, DatabaseType, ReferentialAction, Table, UnifiedModel,
};

fn column(name: &str, data_type: &str, is_primary_key: bool, nullable: bool) -> Column {
    Column {
        name: name.to_string(),
        comment: None,
        data_type: data_type.to_string(),
        nullable,
        is_primary_key,
        options: Default::default(),
    }
}

fn library_schema() -> UnifiedModel {
    let mut model = UnifiedModel::new(DatabaseType::Relational);

    let mut authors = Table {
        name: "authors".to_string(),
        ..Default::default()
    };
    authors.columns.push(column("author_id", "bigint", true, false));
    authors.columns.push(column("name", "text", false, false));
    authors.constraints.push(Constraint {
        name: "authors_pkey".to_string(),
        columns: vec!["author_id".to_string()],
        kind: ConstraintKind::PrimaryKey,
    });
    model.insert_table(authors).unwrap();

    let mut books = Table {
        name: "books".to_string(),
        ..Default::default()
    };
    books.columns.push(column("book_id", "bigint", true, false));
    books.columns.push(column("author_id", "bigint", false, true));
    books.columns.push(column("title", "text", false, false));
    books.constraints.push(Constraint {
        name: "books_pkey".to_string(),
        columns: vec!["book_id".to_string()],
        kind: ConstraintKind::PrimaryKey,
    });
    books.constraints.push(Constraint {
        name: "books_author_id_fkey".to_string(),
        columns: vec!["author_id".to_string()],
        kind: ConstraintKind::ForeignKey {
            referenced_table: "authors".to_string(),
            referenced_columns: vec!["author_id".to_string()],
            on_update: ReferentialAction::Cascade,
            on_delete: ReferentialAction::SetNull,
        },
    });
    model.insert_table(books).unwrap();

    let mut tags = Table {
        name: "tags".to_string(),
        ..Default::default()
    };
    tags.columns.push(column("tag_id", "bigint", true, false));
    tags.columns.push(column("name", "text", false, false));
    tags.constraints.push(Constraint {
        name: "tags_pkey".to_string(),
        columns: vec!["tag_id".to_string()],
        kind: ConstraintKind::PrimaryKey,
    });
    model.insert_table(tags).unwrap();

    let mut book_tags = Table {
        name: "book_tags".to_string(),
        ..Default::default()
    };
    book_tags.columns.push(column("book_id", "bigint", true, false));
    book_tags.columns.push(column("tag_id", "bigint", true, false));
    book_tags.constraints.push(Constraint {
        name: "book_tags_pkey".to_string(),
        columns: vec!["book_id".to_string(), "tag_id".to_string()],
        kind: ConstraintKind::PrimaryKey,
    });
    book_tags.constraints.push(Constraint {
        name: "book_tags_book_id_fkey".to_string(),
        columns: vec!["book_id".to_string()],
        kind: ConstraintKind::ForeignKey {
            referenced_table: "books".to_string(),
            referenced_columns: vec!["book_id".to_string()],
            on_update: ReferentialAction::NoAction,
            on_delete: ReferentialAction::Cascade,
        },
    });
    book_tags.constraints.push(Constraint {
        name: "book_tags_tag_id_fkey".to_string(),
        columns: vec!["tag_id".to_string()],
        kind: ConstraintKind::ForeignKey {
            referenced_table: "tags".to_string(),
            referenced_columns: vec!["tag_id".to_string()],
            on_update: ReferentialAction::NoAction,
            on_delete: ReferentialAction::Cascade,
        },
    });
    model.insert_table(book_tags).unwrap();

    model
}

#[test]
fn library_schema_produces_expected_nodes_and_relationships() {
    let model = library_schema();
    let strategy = RelationalToGraph::new(Arc::new(StandardTypeConverter));
    let mut ctx = TranslationContext::new(&model);

    let output = strategy.convert(&mut ctx, None).unwrap();
    let graph = output.target_schema;

    assert!(graph.nodes.contains_key("Author"));
    assert!(graph.nodes.contains_key("Book"));
    assert!(graph.nodes.contains_key("Tag"));
    assert_eq!(graph.nodes.len(), 3, "book_tags must not become a node");

    assert!(graph.relationships.contains_key("AUTHOR_HAS_BOOK"));
    assert!(graph.relationships.contains_key("BOOK_HAS_TAG"));

    let authored = &graph.relationships["AUTHOR_HAS_BOOK"];
    assert_eq!(authored.from_label, "Author");
    assert_eq!(authored.to_label, "Book");

    let tagged = &graph.relationships["BOOK_HAS_TAG"];
    assert_eq!(tagged.from_label, "Book");
    assert_eq!(tagged.to_label, "Tag");

    for warning in &output.warnings {
        assert!(
            warning.severity < translator::Severity::Medium,
            "unexpected warning: {warning:?}"
        );
    }
}
