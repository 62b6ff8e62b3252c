// crates/tablescope-core/src/core/schema.rs
// ============================================================================
// Module: Tablescope Schema Types
// Description: Column, foreign key, and column spec descriptions.
// Purpose: Carry introspected metadata and derived column classification.
// Dependencies: serde, crate::core::value
// ============================================================================

//! ## Overview
//! [`ColumnInfo`] is the raw metadata a storage engine reports for a column.
//! [`Column`] is the classified description handed to callers: it adds the
//! auto-increment and default flags and, after foreign-key resolution, the
//! candidate values for pick lists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::value::SqlValue;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Declared type that makes a primary key an engine-assigned row id.
const INTEGER_TYPE: &str = "INTEGER";
/// Declared types treated as engine-managed timestamps.
const TIMESTAMP_TYPES: [&str; 2] = ["DATETIME", "TIMESTAMP"];

// ============================================================================
// SECTION: Column Metadata
// ============================================================================

/// Raw column metadata reported by a schema catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared type text, as written in the table definition.
    pub declared_type: String,
    /// True when the column carries a NOT NULL constraint.
    pub not_null: bool,
    /// Default expression text, when the engine reports one.
    pub default_value: Option<String>,
    /// True when the column is part of the primary key.
    pub primary_key: bool,
}

impl ColumnInfo {
    /// Returns true for an integer primary key, which the engine assigns.
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.primary_key && self.declared_type.trim().eq_ignore_ascii_case(INTEGER_TYPE)
    }

    /// Returns true for timestamp-typed columns.
    #[must_use]
    pub fn is_timestamp(&self) -> bool {
        let declared = self.declared_type.trim();
        TIMESTAMP_TYPES.iter().any(|name| declared.eq_ignore_ascii_case(name))
    }

    /// Returns true when the engine manages the column's value and generic
    /// inserts must skip it.
    #[must_use]
    pub fn is_system_managed(&self) -> bool {
        self.is_auto_increment() || self.is_timestamp()
    }

    /// Returns true when the engine reports a default expression.
    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default_value.is_some()
    }
}

/// Classified column description returned by the introspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name.
    pub field: String,
    /// Declared scalar type.
    #[serde(rename = "type")]
    pub column_type: String,
    /// True when the column is part of the primary key.
    pub is_primary_key: bool,
    /// True for integer primary keys assigned by the engine.
    pub has_auto_increment: bool,
    /// True when the column declares a default value.
    pub has_default: bool,
    /// True when the column rejects NULL.
    pub not_null: bool,
    /// Values of the referenced column when this column is a foreign key.
    #[serde(rename = "fk", skip_serializing_if = "Option::is_none")]
    pub foreign_key_candidates: Option<Vec<SqlValue>>,
}

impl From<&ColumnInfo> for Column {
    fn from(info: &ColumnInfo) -> Self {
        Self {
            field: info.name.clone(),
            column_type: info.declared_type.clone(),
            is_primary_key: info.primary_key,
            has_auto_increment: info.is_auto_increment(),
            has_default: info.has_default(),
            not_null: info.not_null,
            foreign_key_candidates: None,
        }
    }
}

// ============================================================================
// SECTION: Foreign Keys
// ============================================================================

/// Directional foreign-key edge from a source column to a target column.
///
/// # Invariants
/// - `target_column` is assumed to exist in `target_table`; the engine
///   reported the edge and it is not re-validated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Table holding the referencing column.
    #[serde(rename = "sourceTable")]
    pub source_table: String,
    /// Referencing column.
    #[serde(rename = "from")]
    pub source_column: String,
    /// Referenced table.
    #[serde(rename = "table")]
    pub target_table: String,
    /// Referenced column.
    #[serde(rename = "to")]
    pub target_column: String,
}

// ============================================================================
// SECTION: Table Creation
// ============================================================================

/// Column declaration for CREATE TABLE generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// New column name.
    pub field: String,
    /// Declared type, e.g. `TEXT` or `VARCHAR(64)`.
    #[serde(rename = "type")]
    pub column_type: String,
}

// ============================================================================
// SECTION: Dialect
// ============================================================================

/// How a dialect asks for a column's declared default inside an INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultMarker {
    /// Omit the column; an INSERT with no columns becomes `DEFAULT VALUES`.
    #[default]
    Omit,
    /// Emit a keyword such as `DEFAULT` in the VALUES list.
    Keyword(&'static str),
}
