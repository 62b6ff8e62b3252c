// crates/tablescope-core/src/core/result.rs
// ============================================================================
// Module: Tablescope Results
// Description: Generated statements and normalized execution results.
// Purpose: Give every execution path one result shape.
// Dependencies: serde, crate::core::{error, value}
// ============================================================================

//! ## Overview
//! A [`GeneratedStatement`] is SQL text with positional `?` placeholders and
//! the values bound to them. An [`ExecutionResult`] is produced once per
//! execution and distinguishes "succeeded with zero rows" from "failed".

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::error::EngineError;
use crate::core::value::Row;
use crate::core::value::SqlValue;

// ============================================================================
// SECTION: Generated Statements
// ============================================================================

/// Classification attached to generated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Returns rows and never mutates.
    Read,
    /// DML or DDL with no result set.
    Write,
}

/// SQL text plus the values bound to its placeholders.
///
/// # Invariants
/// - `params.len()` equals the number of `?` placeholders in `sql`.
/// - Identifiers in `sql` are quoted; values never appear inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedStatement {
    /// Statement text with `?` placeholders.
    pub sql: String,
    /// Bound values in placeholder order.
    pub params: Vec<SqlValue>,
    /// Read or write classification.
    pub kind: StatementKind,
}

impl GeneratedStatement {
    /// Creates a read statement.
    #[must_use]
    pub const fn read(sql: String, params: Vec<SqlValue>) -> Self {
        Self {
            sql,
            params,
            kind: StatementKind::Read,
        }
    }

    /// Creates a write statement.
    #[must_use]
    pub const fn write(sql: String, params: Vec<SqlValue>) -> Self {
        Self {
            sql,
            params,
            kind: StatementKind::Write,
        }
    }

    /// Renders the statement with values inlined as literals.
    ///
    /// Placeholders are substituted left to right outside of quoted
    /// identifiers. The preview is for display and is never executed.
    #[must_use]
    pub fn render_preview(&self) -> String {
        let mut out = String::with_capacity(self.sql.len() + self.params.len() * 8);
        let mut params = self.params.iter();
        let mut in_identifier = false;
        for ch in self.sql.chars() {
            match ch {
                '"' => {
                    in_identifier = !in_identifier;
                    out.push(ch);
                }
                '?' if !in_identifier => match params.next() {
                    Some(value) => out.push_str(&value.render_literal()),
                    None => out.push(ch),
                },
                _ => out.push(ch),
            }
        }
        out.push(';');
        out
    }
}

// ============================================================================
// SECTION: Execution Results
// ============================================================================

/// Normalized outcome of one statement execution.
///
/// # Invariants
/// - `success == false` implies `error.is_some()`.
/// - Reads that match nothing succeed with `rows == Some(vec![])`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// True when the engine accepted the statement.
    pub success: bool,
    /// Result rows for reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    /// Engine error message, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock time spent in the engine, for reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_millis: Option<f64>,
}

impl ExecutionResult {
    /// Successful write with no result set.
    #[must_use]
    pub const fn write_ok() -> Self {
        Self {
            success: true,
            rows: None,
            error: None,
            elapsed_millis: None,
        }
    }

    /// Successful read.
    #[must_use]
    pub const fn read_ok(rows: Vec<Row>, elapsed_millis: f64) -> Self {
        Self {
            success: true,
            rows: Some(rows),
            error: None,
            elapsed_millis: Some(elapsed_millis),
        }
    }

    /// Failed execution carrying the engine's message.
    #[must_use]
    pub const fn failed(error: String, elapsed_millis: Option<f64>) -> Self {
        Self {
            success: false,
            rows: None,
            error: Some(error),
            elapsed_millis,
        }
    }

    /// Converts a failed result into [`EngineError::StorageEngine`].
    ///
    /// # Errors
    ///
    /// Returns the engine message when `success` is false.
    pub fn into_checked(self) -> Result<Self, EngineError> {
        if self.success {
            Ok(self)
        } else {
            Err(EngineError::StorageEngine(self.error.unwrap_or_default()))
        }
    }

    /// Returns the rows of a successful read.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageEngine`] when the execution failed.
    pub fn into_rows(self) -> Result<Vec<Row>, EngineError> {
        let checked = self.into_checked()?;
        Ok(checked.rows.unwrap_or_default())
    }
}
