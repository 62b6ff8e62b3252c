// crates/tablescope-core/src/runtime/engine.rs
// ============================================================================
// Module: Tablescope Browser Engine
// Description: Facade over the introspector, generator, executor, and gate.
// Purpose: Expose routing-level browsing operations over one owned store.
// Dependencies: crate::{core, interfaces, runtime}, serde, tracing
// ============================================================================

//! ## Overview
//! [`BrowserEngine`] owns a storage capability and runs each browsing
//! operation end to end: resolve identifiers, build the statement, execute
//! it, and turn engine failures into [`EngineError`]. Preview operations build
//! the same statements and render them with literals inlined instead of
//! executing them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::core::Column;
use crate::core::ColumnSpec;
use crate::core::EngineError;
use crate::core::ExecutionResult;
use crate::core::GeneratedStatement;
use crate::core::Row;
use crate::core::RowData;
use crate::core::SavedQuery;
use crate::core::SqlValue;
use crate::interfaces::Database;
use crate::runtime::executor::QueryExecutor;
use crate::runtime::foreign_keys::ForeignKeyResolver;
use crate::runtime::gate::StatementClass;
use crate::runtime::gate::classify_statement;
use crate::runtime::generator::SqlGenerator;
use crate::runtime::generator::generate_create_table;
use crate::runtime::introspector::SchemaIntrospector;

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Message for statements that completed.
const SUCCESS_MESSAGE: &str = "Query executed successfully";
/// Message for reads that matched nothing.
const EMPTY_MESSAGE: &str = "No rows found";

// ============================================================================
// SECTION: Query Responses
// ============================================================================

/// Response of a gated free-form query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum QueryResponse {
    /// Rows (empty for writes) plus a human-readable status with timing.
    #[serde(rename = "table")]
    Table {
        /// Result rows.
        #[serde(rename = "data")]
        rows: Vec<Row>,
        /// Status message.
        message: String,
    },
    /// Scalar summary of a `SELECT COUNT(*)`.
    #[serde(rename = "string")]
    Scalar {
        /// Summary text.
        #[serde(rename = "data")]
        text: String,
    },
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Browsing facade over an owned storage capability.
pub struct BrowserEngine<S> {
    /// Storage engine handle.
    store: S,
}

impl<S> BrowserEngine<S>
where
    S: Database,
{
    /// Creates an engine over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Reports store readiness.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageEngine`] when the store is unavailable.
    pub fn readiness(&self) -> Result<(), EngineError> {
        Ok(self.store.readiness()?)
    }

    // ------------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------------

    /// Lists user tables.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the catalog cannot be read.
    pub fn tables(&self) -> Result<Vec<String>, EngineError> {
        self.introspector().list_tables()
    }

    /// Describes the insertable columns of `table` with foreign-key
    /// candidates.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the table cannot be described.
    pub fn describe(&self, table: &str) -> Result<Vec<Column>, EngineError> {
        ForeignKeyResolver::new(&self.store).resolve(table)
    }

    /// Describes every column of `table`, engine-managed ones included.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TableNotFound`] for unknown tables.
    pub fn describe_all(&self, table: &str) -> Result<Vec<Column>, EngineError> {
        self.introspector().describe_columns(table, true)
    }

    // ------------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------------

    /// Returns every row of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for unknown tables or failed reads.
    pub fn table_rows(&self, table: &str) -> Result<Vec<Row>, EngineError> {
        let statement = self.generator().select_all(table)?;
        self.executor().run(&statement).into_rows()
    }

    /// Returns the rows of `table` whose `label` column equals `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for unknown identifiers or failed reads.
    pub fn record(&self, table: &str, label: &str, id: SqlValue) -> Result<Vec<Row>, EngineError> {
        let statement = self.generator().select_record(table, label, id)?;
        self.executor().run(&statement).into_rows()
    }

    /// Inserts `row_data` into `table`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when generation or execution fails.
    pub fn insert(&self, table: &str, row_data: &RowData) -> Result<ExecutionResult, EngineError> {
        let statement = self.generator().generate_insert(table, row_data)?;
        self.apply("insert", table, &statement)
    }

    /// Renders the INSERT [`Self::insert`] would run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when generation fails.
    pub fn preview_insert(&self, table: &str, row_data: &RowData) -> Result<String, EngineError> {
        Ok(self.generator().generate_insert(table, row_data)?.render_preview())
    }

    /// Updates the row of `table` identified by `row_identifier_column ==
    /// row_identifier_value`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when generation or execution fails.
    pub fn update(
        &self,
        table: &str,
        row_data: &RowData,
        row_identifier_value: &Value,
        row_identifier_column: &str,
    ) -> Result<ExecutionResult, EngineError> {
        let statement = self.generator().generate_update(
            table,
            row_data,
            row_identifier_value,
            row_identifier_column,
        )?;
        self.apply("update", table, &statement)
    }

    /// Renders the UPDATE [`Self::update`] would run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when generation fails.
    pub fn preview_update(
        &self,
        table: &str,
        row_data: &RowData,
        row_identifier_value: &Value,
        row_identifier_column: &str,
    ) -> Result<String, EngineError> {
        let statement = self.generator().generate_update(
            table,
            row_data,
            row_identifier_value,
            row_identifier_column,
        )?;
        Ok(statement.render_preview())
    }

    /// Deletes the row of `table` whose `id` equals `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for unknown identifiers or failed writes.
    pub fn delete_row(&self, table: &str, id: SqlValue) -> Result<ExecutionResult, EngineError> {
        let statement = self.generator().delete_row(table, id)?;
        self.apply("delete", table, &statement)
    }

    // ------------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------------

    /// Creates `table` with an auto-increment `id` and `column_specs`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when validation or execution fails.
    pub fn create_table(
        &self,
        table: &str,
        column_specs: &[ColumnSpec],
    ) -> Result<ExecutionResult, EngineError> {
        let statement = generate_create_table(table, column_specs)?;
        self.apply("create_table", table, &statement)
    }

    /// Renders the CREATE TABLE [`Self::create_table`] would run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when validation fails.
    pub fn preview_create_table(
        &self,
        table: &str,
        column_specs: &[ColumnSpec],
    ) -> Result<String, EngineError> {
        Ok(generate_create_table(table, column_specs)?.render_preview())
    }

    /// Drops an existing table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for unknown tables or failed writes.
    pub fn drop_table(&self, table: &str) -> Result<ExecutionResult, EngineError> {
        let statement = self.generator().drop_table(table)?;
        self.apply("drop_table", table, &statement)
    }

    // ------------------------------------------------------------------------
    // Free-form statements
    // ------------------------------------------------------------------------

    /// Gates and runs user-entered SQL.
    ///
    /// SELECTs return rows; `SELECT COUNT(*)` returns a scalar summary; any
    /// other text runs as a write batch and returns no rows.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageEngine`] with the engine's message when
    /// execution fails.
    pub fn run_query(&self, sql: &str) -> Result<QueryResponse, EngineError> {
        let started = Instant::now();
        let classified = classify_statement(sql);
        info!(class = classified.class.label(), "running query");
        let executor = self.executor();
        match classified.class {
            StatementClass::Count => {
                let rows = executor.execute_read(&classified.normalized_text, &[]).into_rows()?;
                let count = rows.first().and_then(Row::first).cloned().unwrap_or(SqlValue::Null);
                Ok(QueryResponse::Scalar {
                    text: format!("Count result is {count}"),
                })
            }
            StatementClass::Read => {
                let rows = executor.execute_read(&classified.normalized_text, &[]).into_rows()?;
                let status = if rows.is_empty() { EMPTY_MESSAGE } else { SUCCESS_MESSAGE };
                Ok(QueryResponse::Table {
                    rows,
                    message: timed_message(status, started),
                })
            }
            StatementClass::Write => {
                executor.execute_write(sql.trim(), &[]).into_checked()?;
                Ok(QueryResponse::Table {
                    rows: Vec::new(),
                    message: timed_message(SUCCESS_MESSAGE, started),
                })
            }
        }
    }

    /// Returns the engine's query plan for `sql`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageEngine`] when the plan cannot be built.
    pub fn explain(&self, sql: &str) -> Result<Vec<Row>, EngineError> {
        self.executor().explain(sql).into_rows()
    }

    // ------------------------------------------------------------------------
    // Saved queries
    // ------------------------------------------------------------------------

    /// Lists saved queries.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageEngine`] when the store read fails.
    pub fn saved_queries(&self) -> Result<Vec<SavedQuery>, EngineError> {
        Ok(self.store.saved_queries()?)
    }

    /// Saves a named statement without running it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageEngine`] when the store write fails.
    pub fn save_query(&self, name: &str, sql_statement: &str) -> Result<SavedQuery, EngineError> {
        let saved = self.store.insert_saved_query(name, sql_statement)?;
        info!(id = saved.id, name, "saved query");
        Ok(saved)
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Returns an introspector over the store.
    const fn introspector(&self) -> SchemaIntrospector<'_, S> {
        SchemaIntrospector::new(&self.store)
    }

    /// Returns a generator over the store.
    const fn generator(&self) -> SqlGenerator<'_, S> {
        SqlGenerator::new(&self.store)
    }

    /// Returns an executor over the store.
    const fn executor(&self) -> QueryExecutor<'_, S> {
        QueryExecutor::new(&self.store)
    }

    /// Executes a generated mutation and logs the outcome.
    fn apply(
        &self,
        operation: &'static str,
        table: &str,
        statement: &GeneratedStatement,
    ) -> Result<ExecutionResult, EngineError> {
        let result = self.executor().run(statement).into_checked()?;
        info!(operation, table, "statement applied");
        Ok(result)
    }
}

/// Appends the elapsed time since `started` to `status`.
fn timed_message(status: &str, started: Instant) -> String {
    let elapsed_millis = started.elapsed().as_secs_f64() * 1000.0;
    format!("{status}\n Execution time: {elapsed_millis:.2}ms")
}
