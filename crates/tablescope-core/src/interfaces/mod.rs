// crates/tablescope-core/src/interfaces/mod.rs
// ============================================================================
// Module: Tablescope Interfaces
// Description: Backend-agnostic capability interfaces for storage engines.
// Purpose: Define the contract surfaces used by the Tablescope runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The runtime never talks to a driver directly. A storage engine plugs in by
//! implementing three capabilities: metadata lookup ([`SchemaCatalog`]),
//! statement execution ([`StatementRunner`]), and saved-query persistence
//! ([`SavedQueryStore`]). [`Database`] bundles them for the facade.
//!
//! Identifiers passed to these methods have already been allow-listed or
//! validated by the runtime; values always arrive as bound parameters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::ColumnInfo;
use crate::core::DefaultMarker;
use crate::core::EngineError;
use crate::core::ForeignKey;
use crate::core::Row;
use crate::core::SavedQuery;
use crate::core::SqlValue;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Storage engine errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `Db` carries the engine's message verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Engine rejected or failed the statement.
    #[error("{0}")]
    Db(String),
    /// Connection, lock, or filesystem failure around the engine.
    #[error("storage io error: {0}")]
    Io(String),
}

impl From<StoreError> for EngineError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Db(message) | StoreError::Io(message) => Self::StorageEngine(message),
        }
    }
}

// ============================================================================
// SECTION: Schema Catalog
// ============================================================================

/// Engine metadata lookups.
pub trait SchemaCatalog {
    /// Lists user table names in engine order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the catalog cannot be read.
    fn list_tables(&self) -> Result<Vec<String>, StoreError>;

    /// Returns every column of `table` in declaration order. Unknown tables
    /// yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the catalog cannot be read.
    fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, StoreError>;

    /// Returns the foreign keys declared by `table`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the catalog cannot be read.
    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>, StoreError>;

    /// Returns the stored CREATE statement for `table`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the catalog cannot be read.
    fn create_statement(&self, table: &str) -> Result<Option<String>, StoreError>;

    /// Returns how this dialect requests a column default inside an INSERT.
    fn default_marker(&self) -> DefaultMarker {
        DefaultMarker::Omit
    }
}

// ============================================================================
// SECTION: Statement Runner
// ============================================================================

/// Statement execution against the engine.
pub trait StatementRunner {
    /// Executes one parameterized statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the engine rejects the statement.
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<usize, StoreError>;

    /// Executes raw statement text, which may hold several statements.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the engine rejects any statement.
    fn execute_batch(&self, sql: &str) -> Result<(), StoreError>;

    /// Runs a statement and collects every result row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the engine rejects the statement.
    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Saved Queries
// ============================================================================

/// Append-only store of named statements.
pub trait SavedQueryStore {
    /// Lists every saved query in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the saved-query table cannot be read.
    fn saved_queries(&self) -> Result<Vec<SavedQuery>, StoreError>;

    /// Appends a saved query and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails.
    fn insert_saved_query(&self, name: &str, sql_statement: &str) -> Result<SavedQuery, StoreError>;
}

// ============================================================================
// SECTION: Database
// ============================================================================

/// Every capability the browser engine needs from one storage engine.
pub trait Database: SchemaCatalog + StatementRunner + SavedQueryStore {}

impl<T> Database for T where T: SchemaCatalog + StatementRunner + SavedQueryStore {}
