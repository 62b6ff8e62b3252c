// crates/tablescope-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Support
// Description: In-memory storage capability for runtime tests.
// Purpose: Script catalog metadata and query results without an engine.
// ============================================================================

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared test helpers; not every test file uses every helper."
)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use tablescope_core::ColumnInfo;
use tablescope_core::DefaultMarker;
use tablescope_core::ForeignKey;
use tablescope_core::Row;
use tablescope_core::SavedQuery;
use tablescope_core::SchemaCatalog;
use tablescope_core::SavedQueryStore;
use tablescope_core::SqlValue;
use tablescope_core::StatementRunner;
use tablescope_core::StoreError;

/// Builds a nullable column without a default.
pub fn column(name: &str, declared_type: &str) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        declared_type: declared_type.to_string(),
        not_null: false,
        default_value: None,
        primary_key: false,
    }
}

/// Builds an `INTEGER PRIMARY KEY` column.
pub fn id_column(name: &str) -> ColumnInfo {
    ColumnInfo {
        primary_key: true,
        ..column(name, "INTEGER")
    }
}

/// Builds a NOT NULL column without a default.
pub fn required(name: &str, declared_type: &str) -> ColumnInfo {
    ColumnInfo {
        not_null: true,
        ..column(name, declared_type)
    }
}

/// Builds a column with a declared default.
pub fn defaulted(name: &str, declared_type: &str, default: &str) -> ColumnInfo {
    ColumnInfo {
        default_value: Some(default.to_string()),
        ..column(name, declared_type)
    }
}

/// Builds a one-cell row.
pub fn cell_row(column: &str, value: SqlValue) -> Row {
    let mut row = Row::new();
    row.push(column, value);
    row
}

/// Scripted storage engine.
#[derive(Default)]
pub struct FakeDatabase {
    tables: Vec<(String, Vec<ColumnInfo>)>,
    foreign_keys: Vec<ForeignKey>,
    create_statements: BTreeMap<String, String>,
    results: BTreeMap<String, Result<Vec<Row>, StoreError>>,
    write_errors: BTreeMap<String, StoreError>,
    marker: DefaultMarker,
    pub executed: Mutex<Vec<(String, Vec<SqlValue>)>>,
    pub batches: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<(String, Vec<SqlValue>)>>,
    saved: Mutex<Vec<SavedQuery>>,
}

impl FakeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, columns: Vec<ColumnInfo>) -> Self {
        self.tables.push((name.to_string(), columns));
        self
    }

    pub fn with_foreign_key(mut self, source: (&str, &str), target: (&str, &str)) -> Self {
        self.foreign_keys.push(ForeignKey {
            source_table: source.0.to_string(),
            source_column: source.1.to_string(),
            target_table: target.0.to_string(),
            target_column: target.1.to_string(),
        });
        self
    }

    pub fn with_create_statement(mut self, table: &str, sql: &str) -> Self {
        self.create_statements.insert(table.to_string(), sql.to_string());
        self
    }

    pub fn with_rows(mut self, sql: &str, rows: Vec<Row>) -> Self {
        self.results.insert(sql.to_string(), Ok(rows));
        self
    }

    pub fn with_query_error(mut self, sql: &str, message: &str) -> Self {
        self.results.insert(sql.to_string(), Err(StoreError::Db(message.to_string())));
        self
    }

    pub fn with_write_error(mut self, sql: &str, message: &str) -> Self {
        self.write_errors.insert(sql.to_string(), StoreError::Db(message.to_string()));
        self
    }

    pub fn with_default_marker(mut self, marker: DefaultMarker) -> Self {
        self.marker = marker;
        self
    }

    pub fn executed(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.executed.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<String> {
        self.batches.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.queries.lock().unwrap().clone()
    }
}

impl SchemaCatalog for FakeDatabase {
    fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
    }

    fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, StoreError> {
        Ok(self
            .tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, columns)| columns.clone())
            .unwrap_or_default())
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>, StoreError> {
        Ok(self.foreign_keys.iter().filter(|fk| fk.source_table == table).cloned().collect())
    }

    fn create_statement(&self, table: &str) -> Result<Option<String>, StoreError> {
        Ok(self.create_statements.get(table).cloned())
    }

    fn default_marker(&self) -> DefaultMarker {
        self.marker
    }
}

impl StatementRunner for FakeDatabase {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<usize, StoreError> {
        if let Some(err) = self.write_errors.get(sql) {
            return Err(err.clone());
        }
        self.executed.lock().unwrap().push((sql.to_string(), params.to_vec()));
        Ok(1)
    }

    fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        if let Some(err) = self.write_errors.get(sql) {
            return Err(err.clone());
        }
        self.batches.lock().unwrap().push(sql.to_string());
        Ok(())
    }

    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        self.queries.lock().unwrap().push((sql.to_string(), params.to_vec()));
        self.results.get(sql).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }
}

impl SavedQueryStore for FakeDatabase {
    fn saved_queries(&self) -> Result<Vec<SavedQuery>, StoreError> {
        Ok(self.saved.lock().unwrap().clone())
    }

    fn insert_saved_query(&self, name: &str, sql_statement: &str) -> Result<SavedQuery, StoreError> {
        let mut saved = self.saved.lock().unwrap();
        let query = SavedQuery {
            id: i64::try_from(saved.len()).unwrap() + 1,
            name: name.to_string(),
            sql_statement: sql_statement.to_string(),
        };
        saved.push(query.clone());
        Ok(query)
    }
}
