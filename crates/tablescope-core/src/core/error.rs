// crates/tablescope-core/src/core/error.rs
// ============================================================================
// Module: Tablescope Engine Errors
// Description: Error taxonomy for introspection, generation, and execution.
// Purpose: Report every core failure as a value with a stable kind label.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every failure the engine can produce is an [`EngineError`]. Storage engine
//! messages are carried verbatim so callers can show the engine's own
//! diagnostic. The core never retries; errors travel one level up unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Engine errors surfaced to the routing layer.
///
/// # Invariants
/// - `StorageEngine` messages are the storage engine's text, unmodified.
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Driver, syntax, or constraint failure reported by the storage engine.
    #[error("{0}")]
    StorageEngine(String),
    /// Every column of the table is engine-managed.
    #[error("no columns to select in {table} (all columns are auto-increment or timestamps)")]
    NoInsertableColumns {
        /// Table that was described.
        table: String,
    },
    /// The table's stored definition could not be retrieved.
    #[error("table not found: {table}")]
    TableNotFound {
        /// Requested table name.
        table: String,
    },
    /// A NOT NULL column without a default received no value.
    #[error("missing value for required column {column} in {table}")]
    MissingRequiredColumn {
        /// Target table.
        table: String,
        /// Column lacking a value.
        column: String,
    },
    /// The update request had nothing to assign.
    #[error("update of {table} has no assignable columns")]
    EmptyUpdate {
        /// Target table.
        table: String,
    },
    /// Two column specs share a field name.
    #[error("duplicate column name: {column}")]
    DuplicateColumnName {
        /// Repeated field name.
        column: String,
    },
    /// Table identifier is not present in the introspected schema.
    #[error("unknown table: {table}")]
    UnknownTable {
        /// Rejected table name.
        table: String,
    },
    /// Column identifier is not present in the introspected table.
    #[error("unknown column {column} in {table}")]
    UnknownColumn {
        /// Table that was searched.
        table: String,
        /// Rejected column name.
        column: String,
    },
    /// A new identifier failed syntactic validation.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// A declared column type failed validation.
    #[error("invalid type for column {column}: {column_type}")]
    InvalidColumnType {
        /// Column being declared.
        column: String,
        /// Rejected type text.
        column_type: String,
    },
}

impl EngineError {
    /// Returns a stable label for logs and response envelopes.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StorageEngine(_) => "storage_engine",
            Self::NoInsertableColumns {
                ..
            } => "no_insertable_columns",
            Self::TableNotFound {
                ..
            } => "table_not_found",
            Self::MissingRequiredColumn {
                ..
            } => "missing_required_column",
            Self::EmptyUpdate {
                ..
            } => "empty_update",
            Self::DuplicateColumnName {
                ..
            } => "duplicate_column_name",
            Self::UnknownTable {
                ..
            } => "unknown_table",
            Self::UnknownColumn {
                ..
            } => "unknown_column",
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::InvalidColumnType {
                ..
            } => "invalid_column_type",
        }
    }
}
