// crates/tablescope-store-sqlite/tests/sqlite_database_unit.rs
// ============================================================================
// Module: SQLite Database Unit Tests
// Description: Metadata, execution, and saved queries against real SQLite.
// Purpose: Validate the store capabilities and engine behavior end to end.
// ============================================================================

//! ## Overview
//! Tests run against on-disk databases in temporary directories:
//! - Path and pool validation
//! - Catalog metadata (tables, columns, defaults, foreign keys)
//! - Insert/update round trips through the browser engine
//! - Read-only enforcement on the read path
//! - Saved-query persistence and concurrent writers

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;
use std::sync::Arc;
use std::thread;

use serde_json::json;
use tablescope_core::BrowserEngine;
use tablescope_core::ColumnSpec;
use tablescope_core::EngineError;
use tablescope_core::QueryResponse;
use tablescope_core::RowData;
use tablescope_core::SavedQueryStore;
use tablescope_core::SchemaCatalog;
use tablescope_core::SchemaIntrospector;
use tablescope_core::SqlValue;
use tablescope_core::StatementRunner;
use tablescope_store_sqlite::SqliteDatabase;
use tablescope_store_sqlite::SqliteDatabaseConfig;
use tablescope_store_sqlite::SqliteStoreError;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const SHOP_SCHEMA: &str = "
    CREATE TABLE customers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        nickname TEXT DEFAULT 'anon',
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER REFERENCES customers (id),
        buyer INTEGER REFERENCES customers,
        note TEXT
    );
    INSERT INTO customers (name) VALUES ('Ann'), ('Bo'), ('Cy');
";

fn open(path: &Path) -> SqliteDatabase {
    let mut config = SqliteDatabaseConfig::for_path(path.join("shop.db"));
    config.busy_timeout_ms = 1_000;
    SqliteDatabase::new(config).expect("open database")
}

fn shop(temp: &TempDir) -> SqliteDatabase {
    let db = open(temp.path());
    db.execute_batch(SHOP_SCHEMA).expect("schema");
    db
}

fn row(value: serde_json::Value) -> RowData {
    value.as_object().cloned().expect("object literal")
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

#[test]
fn open_rejects_directories_and_empty_pools() {
    let temp = TempDir::new().unwrap();

    let err = SqliteDatabase::new(SqliteDatabaseConfig::for_path(temp.path())).err().unwrap();
    assert!(matches!(err, SqliteStoreError::Invalid(_)), "{err:?}");

    let mut config = SqliteDatabaseConfig::for_path(temp.path().join("a.db"));
    config.read_pool_size = 0;
    assert!(matches!(SqliteDatabase::new(config), Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn open_creates_missing_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("dir").join("x.db");
    let db = SqliteDatabase::new(SqliteDatabaseConfig::for_path(&path)).unwrap();

    assert!(path.exists());
    db.readiness().unwrap();
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

#[test]
fn list_tables_hides_engine_tables() {
    let temp = TempDir::new().unwrap();
    let db = shop(&temp);

    assert_eq!(db.list_tables().unwrap(), vec!["customers".to_string(), "orders".to_string()]);
}

#[test]
fn table_columns_report_structured_metadata() {
    let temp = TempDir::new().unwrap();
    let db = shop(&temp);
    let columns = db.table_columns("customers").unwrap();

    assert_eq!(columns.len(), 4);
    assert!(columns[0].primary_key && columns[0].is_auto_increment());
    assert!(columns[1].not_null && columns[1].default_value.is_none());
    assert_eq!(columns[2].default_value.as_deref(), Some("'anon'"));
    assert!(columns[3].is_timestamp());
    assert!(db.table_columns("missing").unwrap().is_empty());
}

#[test]
fn foreign_keys_resolve_implicit_targets() {
    let temp = TempDir::new().unwrap();
    let db = shop(&temp);
    let keys = db.foreign_keys("orders").unwrap();

    let pairs: Vec<(&str, &str, &str)> = keys
        .iter()
        .map(|key| {
            (key.source_column.as_str(), key.target_table.as_str(), key.target_column.as_str())
        })
        .collect();
    assert!(pairs.contains(&("customer_id", "customers", "id")));
    assert!(pairs.contains(&("buyer", "customers", "id")));
    assert!(db.foreign_keys("customers").unwrap().is_empty());
}

#[test]
fn has_column_default_reads_stored_definition() {
    let temp = TempDir::new().unwrap();
    let db = shop(&temp);
    db.execute_batch("CREATE TABLE t (name TEXT DEFAULT 'anon', plain TEXT)").unwrap();
    let introspector = SchemaIntrospector::new(&db);

    assert!(introspector.has_column_default("t", "TEXT", "name").unwrap());
    assert!(!introspector.has_column_default("t", "TEXT", "plain").unwrap());
    assert!(matches!(
        introspector.has_column_default("nope", "TEXT", "name"),
        Err(EngineError::TableNotFound { .. })
    ));
}

#[test]
fn has_column_default_ignores_names_ending_another_column() {
    let temp = TempDir::new().unwrap();
    let db = shop(&temp);
    db.execute_batch("CREATE TABLE t (nickname TEXT DEFAULT 'x', name TEXT)").unwrap();
    let introspector = SchemaIntrospector::new(&db);

    assert!(!introspector.has_column_default("t", "TEXT", "name").unwrap());
    assert!(introspector.has_column_default("t", "TEXT", "nickname").unwrap());
}

#[test]
fn insertable_columns_drop_ids_and_timestamps() {
    let temp = TempDir::new().unwrap();
    let engine = BrowserEngine::new(shop(&temp));

    let all: Vec<String> =
        engine.describe_all("customers").unwrap().into_iter().map(|c| c.field).collect();
    let insertable: Vec<String> =
        engine.describe("customers").unwrap().into_iter().map(|c| c.field).collect();
    assert_eq!(all, vec!["id", "name", "nickname", "created_at"]);
    assert_eq!(insertable, vec!["name", "nickname"]);
}

// ============================================================================
// SECTION: Engine Round Trips
// ============================================================================

#[test]
fn insert_round_trip_applies_engine_defaults() {
    let temp = TempDir::new().unwrap();
    let engine = BrowserEngine::new(shop(&temp));

    let result = engine.insert("customers", &row(json!({"name": "Dee", "nickname": ""}))).unwrap();
    assert!(result.success);

    let rows = engine.record("customers", "name", SqlValue::from("Dee")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("nickname"), Some(&SqlValue::from("anon")));
    assert!(matches!(rows[0].get("created_at"), Some(SqlValue::Text(_))));
    assert_eq!(rows[0].get("id"), Some(&SqlValue::Integer(4)));
}

#[test]
fn update_changes_only_the_target_row() {
    let temp = TempDir::new().unwrap();
    let engine = BrowserEngine::new(shop(&temp));
    engine
        .store()
        .execute_batch("INSERT INTO customers (id, name, nickname) VALUES (5, 'Eve', 'e')")
        .unwrap();

    engine.update("customers", &row(json!({"name": "x"})), &json!(5), "id").unwrap();

    let five = engine.record("customers", "id", SqlValue::Integer(5)).unwrap();
    assert_eq!(five[0].get("name"), Some(&SqlValue::from("x")));
    assert_eq!(five[0].get("nickname"), Some(&SqlValue::from("e")));
    let one = engine.record("customers", "id", SqlValue::Integer(1)).unwrap();
    assert_eq!(one[0].get("name"), Some(&SqlValue::from("Ann")));
}

#[test]
fn foreign_key_candidates_follow_row_order() {
    let temp = TempDir::new().unwrap();
    let engine = BrowserEngine::new(shop(&temp));
    let columns = engine.describe("orders").unwrap();

    let customer = columns.iter().find(|column| column.field == "customer_id").unwrap();
    assert_eq!(
        customer.foreign_key_candidates,
        Some(vec![SqlValue::Integer(1), SqlValue::Integer(2), SqlValue::Integer(3)])
    );
    let note = columns.iter().find(|column| column.field == "note").unwrap();
    assert!(note.foreign_key_candidates.is_none());
}

#[test]
fn missing_required_column_fails_before_execution() {
    let temp = TempDir::new().unwrap();
    let engine = BrowserEngine::new(shop(&temp));
    let err = engine.insert("customers", &row(json!({"nickname": "z"}))).unwrap_err();

    assert!(matches!(err, EngineError::MissingRequiredColumn { .. }), "{err:?}");
    assert_eq!(engine.table_rows("customers").unwrap().len(), 3);
}

#[test]
fn create_and_drop_table_round_trip() {
    let temp = TempDir::new().unwrap();
    let engine = BrowserEngine::new(shop(&temp));
    let specs: Vec<ColumnSpec> = serde_json::from_value(json!([
        {"field": "title", "type": "VARCHAR(64)"},
        {"field": "price", "type": "REAL"}
    ]))
    .unwrap();

    engine.create_table("books", &specs).unwrap();
    engine.insert("books", &row(json!({"title": "Dune", "price": 9.5}))).unwrap();
    let rows = engine.table_rows("books").unwrap();
    assert_eq!(rows[0].get("id"), Some(&SqlValue::Integer(1)));
    assert_eq!(rows[0].get("price"), Some(&SqlValue::Real(9.5)));

    engine.delete_row("books", SqlValue::Integer(1)).unwrap();
    assert!(engine.table_rows("books").unwrap().is_empty());
    engine.drop_table("books").unwrap();
    assert!(!engine.tables().unwrap().contains(&"books".to_string()));
}

// ============================================================================
// SECTION: Gated Queries
// ============================================================================

#[test]
fn gated_queries_cover_every_path() {
    let temp = TempDir::new().unwrap();
    let engine = BrowserEngine::new(shop(&temp));

    let count = engine.run_query("SELECT COUNT(*) FROM customers").unwrap();
    assert_eq!(
        count,
        QueryResponse::Scalar {
            text: "Count result is 3".to_string()
        }
    );

    let QueryResponse::Table {
        rows,
        message,
    } = engine.run_query("select * from customers where name = 'Nobody'").unwrap()
    else {
        panic!("expected table response");
    };
    assert!(rows.is_empty());
    assert!(message.starts_with("No rows found"));

    engine.run_query("UPDATE customers SET nickname = 'q'; DELETE FROM customers WHERE id = 3").unwrap();
    assert_eq!(engine.table_rows("customers").unwrap().len(), 2);

    let err = engine.run_query("SELECT * FROM missing_table").unwrap_err();
    assert_eq!(err.to_string(), "no such table: missing_table");
}

#[test]
fn unterminated_transactions_are_rolled_back() {
    let temp = TempDir::new().unwrap();
    let engine = BrowserEngine::new(shop(&temp));

    let err = engine.run_query("BEGIN; INSERT INTO customers (name) VALUES ('Dee')").unwrap_err();
    assert!(matches!(err, EngineError::StorageEngine(_)));
    assert_eq!(engine.table_rows("customers").unwrap().len(), 3);

    engine.run_query("BEGIN; INSERT INTO customers (name) VALUES ('Eve'); COMMIT").unwrap();
    assert_eq!(engine.table_rows("customers").unwrap().len(), 4);
}

#[test]
fn read_path_cannot_write() {
    let temp = TempDir::new().unwrap();
    let db = shop(&temp);

    assert!(db.query("DELETE FROM customers", &[]).is_err());
    assert_eq!(db.query("SELECT * FROM customers", &[]).unwrap().len(), 3);
}

#[test]
fn explain_returns_plan_rows() {
    let temp = TempDir::new().unwrap();
    let engine = BrowserEngine::new(shop(&temp));
    let plan = engine.explain("SELECT * FROM customers WHERE id = 1").unwrap();

    assert!(!plan.is_empty());
    assert!(plan[0].get("detail").is_some());
}

#[test]
fn blobs_and_reals_survive_the_read_path() {
    let temp = TempDir::new().unwrap();
    let db = shop(&temp);
    let rows = db.query("SELECT X'00FF' AS raw, 1.5 AS half, NULL AS nothing", &[]).unwrap();

    assert_eq!(rows[0].get("raw"), Some(&SqlValue::Blob(vec![0x00, 0xFF])));
    assert_eq!(rows[0].get("half"), Some(&SqlValue::Real(1.5)));
    assert_eq!(rows[0].get("nothing"), Some(&SqlValue::Null));
    assert_eq!(serde_json::to_value(&rows[0]).unwrap()["raw"], json!("AP8="));
}

// ============================================================================
// SECTION: Saved Queries and Concurrency
// ============================================================================

#[test]
fn saved_queries_are_created_lazily_and_listed_in_order() {
    let temp = TempDir::new().unwrap();
    let db = shop(&temp);

    assert!(db.saved_queries().unwrap().is_empty());
    db.insert_saved_query("all", "SELECT * FROM customers").unwrap();
    let second = db.insert_saved_query("count", "SELECT COUNT(*) FROM customers").unwrap();
    assert_eq!(second.id, 2);

    let saved = db.saved_queries().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].sql_statement, "SELECT * FROM customers");
    assert!(db.list_tables().unwrap().contains(&"query".to_string()));
}

#[test]
fn concurrent_inserts_are_serialized() {
    let temp = TempDir::new().unwrap();
    let engine = Arc::new(BrowserEngine::new(shop(&temp)));
    let mut handles = Vec::new();
    for worker in 0 .. 4 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for index in 0 .. 10 {
                let name = format!("w{worker}-{index}");
                engine.insert("customers", &row(json!({"name": name}))).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.table_rows("customers").unwrap().len(), 43);
}
