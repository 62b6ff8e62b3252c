// crates/tablescope-core/src/runtime/executor.rs
// ============================================================================
// Module: Tablescope Query Executor
// Description: Statement execution with normalized results.
// Purpose: Give reads, writes, DDL, and plans one result shape.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! The executor submits finished SQL through [`StatementRunner`] and returns an
//! [`ExecutionResult`]. Engine failures are captured in the result with the
//! engine's message verbatim; nothing is retried. Unparameterized writes run
//! as a batch so multi-statement text works.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use tracing::debug;
use tracing::warn;

use crate::core::ExecutionResult;
use crate::core::GeneratedStatement;
use crate::core::SqlValue;
use crate::core::StatementKind;
use crate::interfaces::StatementRunner;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix turning a statement into a plan request.
const EXPLAIN_PREFIX: &str = "EXPLAIN QUERY PLAN";

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Statement executor over a borrowed runner.
pub struct QueryExecutor<'a, R: ?Sized> {
    /// Execution backend.
    runner: &'a R,
}

impl<'a, R> QueryExecutor<'a, R>
where
    R: StatementRunner + ?Sized,
{
    /// Creates an executor over `runner`.
    #[must_use]
    pub const fn new(runner: &'a R) -> Self {
        Self {
            runner,
        }
    }

    /// Runs a statement that returns no rows.
    #[must_use]
    pub fn execute_write(&self, sql: &str, params: &[SqlValue]) -> ExecutionResult {
        debug!(kind = "write", sql, params = params.len(), "executing statement");
        let outcome = if params.is_empty() {
            self.runner.execute_batch(sql)
        } else {
            self.runner.execute(sql, params).map(|_| ())
        };
        match outcome {
            Ok(()) => {
                debug!(kind = "write", "statement succeeded");
                ExecutionResult::write_ok()
            }
            Err(err) => {
                warn!(kind = "write", error = %err, "statement failed");
                ExecutionResult::failed(err.to_string(), None)
            }
        }
    }

    /// Runs a row-returning statement and times it.
    #[must_use]
    pub fn execute_read(&self, sql: &str, params: &[SqlValue]) -> ExecutionResult {
        debug!(kind = "read", sql, params = params.len(), "executing statement");
        let started = Instant::now();
        let outcome = self.runner.query(sql, params);
        let elapsed_millis = started.elapsed().as_secs_f64() * 1000.0;
        match outcome {
            Ok(rows) => {
                debug!(kind = "read", rows = rows.len(), elapsed_millis, "statement succeeded");
                ExecutionResult::read_ok(rows, elapsed_millis)
            }
            Err(err) => {
                warn!(kind = "read", error = %err, elapsed_millis, "statement failed");
                ExecutionResult::failed(err.to_string(), Some(elapsed_millis))
            }
        }
    }

    /// Returns the engine's query plan for `sql`.
    #[must_use]
    pub fn explain(&self, sql: &str) -> ExecutionResult {
        self.execute_read(&format!("{EXPLAIN_PREFIX} {}", sql.trim()), &[])
    }

    /// Runs a generated statement on the path its kind selects.
    #[must_use]
    pub fn run(&self, statement: &GeneratedStatement) -> ExecutionResult {
        match statement.kind {
            StatementKind::Read => self.execute_read(&statement.sql, &statement.params),
            StatementKind::Write => self.execute_write(&statement.sql, &statement.params),
        }
    }
}
