// crates/tablescope-core/src/runtime/introspector.rs
// ============================================================================
// Module: Tablescope Schema Introspector
// Description: Column classification, foreign keys, and identifier allow-lists.
// Purpose: Turn engine metadata into column descriptions the generator trusts.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! The introspector reads metadata through [`SchemaCatalog`] and classifies
//! columns. Engine-managed columns (integer primary keys and timestamp types)
//! are excluded from insert forms. It is also the allow-list for identifiers:
//! any table or column name that reaches generated SQL was first resolved to
//! its canonical spelling here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing::debug;

use crate::core::Column;
use crate::core::ColumnInfo;
use crate::core::EngineError;
use crate::core::ForeignKey;
use crate::interfaces::SchemaCatalog;

// ============================================================================
// SECTION: Introspector
// ============================================================================

/// Schema metadata reader over a borrowed catalog.
pub struct SchemaIntrospector<'a, C: ?Sized> {
    /// Metadata source.
    catalog: &'a C,
}

impl<'a, C> SchemaIntrospector<'a, C>
where
    C: SchemaCatalog + ?Sized,
{
    /// Creates an introspector over `catalog`.
    #[must_use]
    pub const fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
        }
    }

    /// Lists user tables.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageEngine`] when the catalog read fails.
    pub fn list_tables(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.catalog.list_tables()?)
    }

    /// Returns raw metadata for every column of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TableNotFound`] when the engine reports no
    /// columns for the table.
    pub fn table_info(&self, table: &str) -> Result<Vec<ColumnInfo>, EngineError> {
        let columns = self.catalog.table_columns(table)?;
        if columns.is_empty() {
            return Err(EngineError::TableNotFound {
                table: table.to_string(),
            });
        }
        Ok(columns)
    }

    /// Describes the columns of `table`.
    ///
    /// With `include_system_columns == false` integer primary keys and
    /// timestamp-typed columns are dropped, leaving the insertable set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TableNotFound`] for unknown tables and
    /// [`EngineError::NoInsertableColumns`] when filtering leaves nothing.
    pub fn describe_columns(
        &self,
        table: &str,
        include_system_columns: bool,
    ) -> Result<Vec<Column>, EngineError> {
        let info = self.table_info(table)?;
        if include_system_columns {
            return Ok(info.iter().map(Column::from).collect());
        }
        let columns: Vec<Column> =
            info.iter().filter(|column| !column.is_system_managed()).map(Column::from).collect();
        if columns.is_empty() {
            return Err(EngineError::NoInsertableColumns {
                table: table.to_string(),
            });
        }
        debug!(table, columns = columns.len(), "described insertable columns");
        Ok(columns)
    }

    /// Returns the foreign keys declared by `table`. No constraints is an
    /// empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StorageEngine`] when the catalog read fails.
    pub fn describe_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>, EngineError> {
        Ok(self.catalog.foreign_keys(table)?)
    }

    /// Reports whether the stored CREATE statement declares a default for
    /// `column_name` of type `column_type`.
    ///
    /// Matches `<column> <type> DEFAULT` in the statement text, ignoring ASCII
    /// case, identifier quotes, and whitespace runs. The match must start a
    /// column definition, so `name` never matches `nickname`. A default whose literal
    /// text repeats another column's declaration can produce a false match;
    /// [`Self::describe_columns`] uses structured metadata instead.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TableNotFound`] when no CREATE statement exists.
    pub fn has_column_default(
        &self,
        table: &str,
        column_type: &str,
        column_name: &str,
    ) -> Result<bool, EngineError> {
        let Some(statement) = self.catalog.create_statement(table)? else {
            return Err(EngineError::TableNotFound {
                table: table.to_string(),
            });
        };
        let needle = normalize_ddl(&format!("{column_name} {column_type} DEFAULT"));
        Ok(contains_declaration(&normalize_ddl(&statement), &needle))
    }

    /// Resolves `name` to the canonical spelling of an existing table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTable`] when no table matches.
    pub fn require_table(&self, name: &str) -> Result<String, EngineError> {
        self.list_tables()?
            .into_iter()
            .find(|table| table.eq_ignore_ascii_case(name))
            .ok_or_else(|| EngineError::UnknownTable {
                table: name.to_string(),
            })
    }

    /// Resolves `name` to an existing column of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownColumn`] when the column is absent.
    pub fn require_column(&self, table: &str, name: &str) -> Result<ColumnInfo, EngineError> {
        let info = self.table_info(table)?;
        find_column(&info, name).cloned().ok_or_else(|| EngineError::UnknownColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Finds a column by name, ignoring ASCII case as the engine does.
pub(crate) fn find_column<'c>(columns: &'c [ColumnInfo], name: &str) -> Option<&'c ColumnInfo> {
    columns.iter().find(|column| column.name.eq_ignore_ascii_case(name))
}

/// Lower-cases, strips identifier quotes, and collapses whitespace runs.
fn normalize_ddl(text: &str) -> String {
    let unquoted: String =
        text.chars().filter(|ch| !matches!(ch, '"' | '`' | '[' | ']')).collect();
    unquoted.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_lowercase()
}

/// Reports whether `needle` occurs in `ddl` at the start of a definition.
fn contains_declaration(ddl: &str, needle: &str) -> bool {
    ddl.match_indices(needle).any(|(start, _)| {
        start == 0 || matches!(ddl.as_bytes().get(start - 1), Some(b' ' | b'(' | b','))
    })
}
