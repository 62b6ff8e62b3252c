// crates/tablescope-core/tests/introspector_unit.rs
// ============================================================================
// Module: Schema Introspector Tests
// Description: Column classification and default detection.
// Purpose: Verify system-column filtering and table lookup failures.
// ============================================================================

//! Schema introspector unit tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use common::FakeDatabase;
use common::column;
use common::defaulted;
use common::id_column;
use tablescope_core::ColumnInfo;
use tablescope_core::EngineError;
use tablescope_core::SchemaIntrospector;

fn orders() -> FakeDatabase {
    FakeDatabase::new()
        .with_table(
            "orders",
            vec![
                id_column("id"),
                column("customer_id", "INTEGER"),
                defaulted("status", "TEXT", "'new'"),
                column("placed_at", "datetime"),
                column("shipped", "TIMESTAMP"),
            ],
        )
        .with_table("codes", vec![text_key("code")])
        .with_create_statement(
            "orders",
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER,\n  status   TEXT \
             DEFAULT 'new', placed_at datetime, shipped TIMESTAMP)",
        )
}

fn text_key(name: &str) -> ColumnInfo {
    ColumnInfo {
        primary_key: true,
        ..column(name, "TEXT")
    }
}

#[test]
fn insertable_columns_exclude_every_system_column() {
    let db = orders();
    let introspector = SchemaIntrospector::new(&db);
    let all = introspector.describe_columns("orders", true).unwrap();
    let insertable = introspector.describe_columns("orders", false).unwrap();

    assert_eq!(all.len(), 5);
    let fields: Vec<&str> = insertable.iter().map(|column| column.field.as_str()).collect();
    assert_eq!(fields, vec!["customer_id", "status"]);
    for column in &all {
        let system = column.has_auto_increment
            || ["DATETIME", "TIMESTAMP"].contains(&column.column_type.to_ascii_uppercase().as_str());
        assert_eq!(system, !fields.contains(&column.field.as_str()), "{}", column.field);
    }
}

#[test]
fn text_primary_keys_are_insertable() {
    let db = orders();
    let columns = SchemaIntrospector::new(&db).describe_columns("codes", false).unwrap();

    assert_eq!(columns.len(), 1);
    assert!(columns[0].is_primary_key);
    assert!(!columns[0].has_auto_increment);
}

#[test]
fn structured_defaults_flag_columns() {
    let db = orders();
    let columns = SchemaIntrospector::new(&db).describe_columns("orders", false).unwrap();

    assert!(!columns[0].has_default);
    assert!(columns[1].has_default);
}

#[test]
fn all_system_columns_is_no_insertable_columns() {
    let db = FakeDatabase::new()
        .with_table("audit", vec![id_column("id"), column("at", "DATETIME")]);
    let err = SchemaIntrospector::new(&db).describe_columns("audit", false).unwrap_err();

    assert_eq!(
        err,
        EngineError::NoInsertableColumns {
            table: "audit".to_string()
        }
    );
}

#[test]
fn unknown_tables_are_not_found() {
    let db = orders();
    let introspector = SchemaIntrospector::new(&db);

    for include_system in [true, false] {
        let err = introspector.describe_columns("missing", include_system).unwrap_err();
        assert_eq!(
            err,
            EngineError::TableNotFound {
                table: "missing".to_string()
            }
        );
    }
}

#[test]
fn has_column_default_matches_declaration_text() {
    let db = orders();
    let introspector = SchemaIntrospector::new(&db);

    assert!(introspector.has_column_default("orders", "TEXT", "status").unwrap());
    assert!(introspector.has_column_default("orders", "text", "STATUS").unwrap());
    assert!(!introspector.has_column_default("orders", "INTEGER", "customer_id").unwrap());

    let err = introspector.has_column_default("ghost", "TEXT", "name").unwrap_err();
    assert!(matches!(err, EngineError::TableNotFound { .. }), "{err:?}");
}

#[test]
fn tables_without_constraints_have_no_foreign_keys() {
    let db = orders();

    assert!(SchemaIntrospector::new(&db).describe_foreign_keys("orders").unwrap().is_empty());
}

#[test]
fn identifiers_resolve_to_canonical_spelling() {
    let db = orders();
    let introspector = SchemaIntrospector::new(&db);

    assert_eq!(introspector.require_table("ORDERS").unwrap(), "orders");
    assert_eq!(introspector.require_column("orders", "Status").unwrap().name, "status");
    assert!(matches!(
        introspector.require_table("orders2"),
        Err(EngineError::UnknownTable { .. })
    ));
}
