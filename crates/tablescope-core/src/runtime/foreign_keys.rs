// crates/tablescope-core/src/runtime/foreign_keys.rs
// ============================================================================
// Module: Tablescope Foreign-Key Resolution
// Description: Candidate values for foreign-key columns.
// Purpose: Attach pick-list data to insertable column descriptions.
// Dependencies: crate::{core, interfaces, runtime}, tracing
// ============================================================================

//! ## Overview
//! For each foreign key declared by a table, the resolver reads every value
//! of the referenced column and attaches the list to the referencing column.
//! A failed lookup leaves that column without candidates and is logged; the
//! other columns are still resolved. When two foreign keys share a source
//! column the later one wins.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::warn;

use crate::core::Column;
use crate::core::EngineError;
use crate::core::ForeignKey;
use crate::core::SqlValue;
use crate::interfaces::SchemaCatalog;
use crate::interfaces::StatementRunner;
use crate::runtime::executor::QueryExecutor;
use crate::runtime::generator::SqlGenerator;
use crate::runtime::introspector::SchemaIntrospector;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Foreign-key candidate resolver.
pub struct ForeignKeyResolver<'a, D: ?Sized> {
    /// Column and constraint metadata.
    introspector: SchemaIntrospector<'a, D>,
    /// Builds the candidate SELECTs.
    generator: SqlGenerator<'a, D>,
    /// Runs the candidate SELECTs.
    executor: QueryExecutor<'a, D>,
}

impl<'a, D> ForeignKeyResolver<'a, D>
where
    D: SchemaCatalog + StatementRunner + ?Sized,
{
    /// Creates a resolver over `database`.
    #[must_use]
    pub const fn new(database: &'a D) -> Self {
        Self {
            introspector: SchemaIntrospector::new(database),
            generator: SqlGenerator::new(database),
            executor: QueryExecutor::new(database),
        }
    }

    /// Describes the insertable columns of `table` with foreign-key candidates
    /// attached.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the columns or the constraint list cannot
    /// be read. Individual candidate lookups never fail the call.
    pub fn resolve(&self, table: &str) -> Result<Vec<Column>, EngineError> {
        let mut columns = self.introspector.describe_columns(table, false)?;
        let foreign_keys = self.introspector.describe_foreign_keys(table)?;
        for foreign_key in &foreign_keys {
            let candidates = match self.candidates(foreign_key) {
                Ok(candidates) => candidates,
                Err(err) => {
                    warn!(
                        table,
                        column = %foreign_key.source_column,
                        target_table = %foreign_key.target_table,
                        target_column = %foreign_key.target_column,
                        error = %err,
                        "foreign key candidates unavailable"
                    );
                    continue;
                }
            };
            if let Some(column) = columns
                .iter_mut()
                .find(|column| column.field.eq_ignore_ascii_case(&foreign_key.source_column))
            {
                column.foreign_key_candidates = Some(candidates);
            }
        }
        Ok(columns)
    }

    /// Reads every value of the referenced column, in natural row order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the target is unknown or the read fails.
    pub fn candidates(&self, foreign_key: &ForeignKey) -> Result<Vec<SqlValue>, EngineError> {
        let statement = self
            .generator
            .select_column(&foreign_key.target_table, &foreign_key.target_column)?;
        let rows = self.executor.run(&statement).into_rows()?;
        Ok(rows.iter().map(|row| row.first().cloned().unwrap_or(SqlValue::Null)).collect())
    }
}
