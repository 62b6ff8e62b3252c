// crates/tablescope-server/src/routes/tests.rs
// ============================================================================
// Module: HTTP Route Unit Tests
// Description: Handler behavior against an on-disk SQLite database.
// Purpose: Validate payload parsing, status mapping, and the envelope.
// Dependencies: tablescope-server
// ============================================================================

//! ## Overview
//! Calls handlers directly with extracted arguments and inspects the
//! serialized envelope.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only handler assertions."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;
use serde_json::json;
use tablescope_core::BrowserEngine;
use tablescope_core::StatementRunner;
use tablescope_store_sqlite::SqliteDatabase;
use tablescope_store_sqlite::SqliteDatabaseConfig;
use tempfile::TempDir;

use super::ApiResponse;
use super::AppState;
use super::build_router;
use super::create_table;
use super::delete_row;
use super::describe_table;
use super::drop_table;
use super::get_record;
use super::health;
use super::insert_row;
use super::list_saved_queries;
use super::list_tables;
use super::preview_update;
use super::run_query;
use super::save_query;
use super::table_rows;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const SCHEMA: &str = "
    CREATE TABLE customers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        nickname TEXT DEFAULT 'anon'
    );
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER REFERENCES customers (id)
    );
    INSERT INTO customers (name) VALUES ('Ann'), ('Bo'), ('Cy');
";

fn fixture() -> (TempDir, AppState) {
    let temp = TempDir::new().unwrap();
    let config = SqliteDatabaseConfig::for_path(temp.path().join("routes.db"));
    let database = SqliteDatabase::new(config).unwrap();
    database.execute_batch(SCHEMA).unwrap();
    (temp, AppState::new(BrowserEngine::new(database)))
}

fn body(value: &Value) -> Bytes {
    Bytes::from(value.to_string())
}

async fn envelope(response: ApiResponse) -> (StatusCode, Value) {
    let response = response.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn router_registers_every_route() {
    let (_temp, state) = fixture();
    let _router = build_router(state, 1024);
}

#[tokio::test]
async fn health_reports_ready() {
    let (_temp, state) = fixture();
    let (status, json) = envelope(health(State(state)).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"success": true, "data": "ready"}));
}

#[tokio::test]
async fn list_tables_wraps_names() {
    let (_temp, state) = fixture();
    let (status, json) = envelope(list_tables(State(state)).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!(["customers", "orders"]));
}

#[tokio::test]
async fn insert_then_read_rows() {
    let (_temp, state) = fixture();
    let request = json!({"tablename": "customers", "dataArray": {"name": "Dee", "nickname": ""}});
    let (status, json) = envelope(insert_row(State(state.clone()), body(&request)).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"success": true}));

    let (_, json) =
        envelope(table_rows(State(state), Path("customers".to_string())).await).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3], json!({"id": 4, "name": "Dee", "nickname": "anon"}));
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let (_temp, state) = fixture();
    let (status, json) =
        envelope(insert_row(State(state), Bytes::from_static(b"{not json")).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], json!(false));
    assert!(json["error"].as_str().unwrap().starts_with("invalid request body"));
}

#[tokio::test]
async fn unknown_tables_are_bad_requests() {
    let (_temp, state) = fixture();
    let request = json!({"tablename": "ghost", "dataArray": {"name": "x"}});
    let (status, json) = envelope(insert_row(State(state), body(&request)).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn describe_attaches_foreign_key_candidates() {
    let (_temp, state) = fixture();
    let (status, json) =
        envelope(describe_table(State(state), Path("orders".to_string())).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["field"], json!("customer_id"));
    assert_eq!(json["data"][0]["fk"], json!([1, 2, 3]));
}

#[tokio::test]
async fn count_query_returns_scalar_summary() {
    let (_temp, state) = fixture();
    let request = json!({"sqlQuery": "SELECT COUNT(*) FROM customers"});
    let (status, json) = envelope(run_query(State(state), body(&request)).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!({"type": "string", "data": "Count result is 3"}));
}

#[tokio::test]
async fn engine_failures_keep_the_engine_message() {
    let (_temp, state) = fixture();
    let request = json!({"sqlQuery": "SELECT * FROM nope"});
    let (status, json) = envelope(run_query(State(state), body(&request)).await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"success": false, "error": "no such table: nope"}));
}

#[tokio::test]
async fn preview_update_renders_without_executing() {
    let (_temp, state) = fixture();
    let request = json!({
        "tablename": "customers",
        "dataArray": {"name": "x"},
        "userId": 2,
        "id_label": "id"
    });
    let (status, json) = envelope(preview_update(State(state.clone()), body(&request)).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!("UPDATE \"customers\" SET \"name\" = 'x' WHERE \"id\" = 2;"));
    let (_, record) = envelope(
        get_record(
            State(state),
            Path(("customers".to_string(), "id".to_string(), "2".to_string())),
        )
        .await,
    )
    .await;
    assert_eq!(record["data"][0]["name"], json!("Bo"));
}

#[tokio::test]
async fn create_delete_and_drop_round_trip() {
    let (_temp, state) = fixture();
    let create = json!({"tableName": "pets", "data": [{"field": "name", "type": "TEXT"}]});
    let (status, _) = envelope(create_table(State(state.clone()), body(&create)).await).await;
    assert_eq!(status, StatusCode::OK);

    let insert = json!({"tablename": "pets", "dataArray": {"name": "Rex"}});
    envelope(insert_row(State(state.clone()), body(&insert)).await).await;
    let delete = json!({"tablename": "pets", "id": 1});
    let (status, _) = envelope(delete_row(State(state.clone()), body(&delete)).await).await;
    assert_eq!(status, StatusCode::OK);
    let (_, rows) = envelope(table_rows(State(state.clone()), Path("pets".to_string())).await).await;
    assert_eq!(rows["data"], json!([]));

    let drop = json!({"tablename": "pets"});
    let (status, _) = envelope(drop_table(State(state.clone()), body(&drop)).await).await;
    assert_eq!(status, StatusCode::OK);
    let (_, tables) = envelope(list_tables(State(state)).await).await;
    assert_eq!(tables["data"], json!(["customers", "orders"]));
}

#[tokio::test]
async fn duplicate_create_columns_are_bad_requests() {
    let (_temp, state) = fixture();
    let create = json!({
        "tableName": "pets",
        "data": [{"field": "name", "type": "TEXT"}, {"field": "NAME", "type": "TEXT"}]
    });
    let (status, json) = envelope(create_table(State(state), body(&create)).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], json!(false));
}

#[tokio::test]
async fn saved_queries_round_trip() {
    let (_temp, state) = fixture();
    let request = json!({"name": "everyone", "sqlStatement": "SELECT * FROM customers"});
    let (status, json) = envelope(save_query(State(state.clone()), body(&request)).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], json!(1));

    let (_, json) = envelope(list_saved_queries(State(state)).await).await;
    assert_eq!(
        json["data"],
        json!([{"id": 1, "name": "everyone", "sqlStatement": "SELECT * FROM customers"}])
    );
}
