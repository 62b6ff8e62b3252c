// crates/tablescope-core/src/runtime/generator.rs
// ============================================================================
// Module: Tablescope SQL Generator
// Description: INSERT, UPDATE, CREATE TABLE, and browsing statement builders.
// Purpose: Build parameterized SQL from generic row data.
// Dependencies: crate::{core, interfaces, runtime::introspector}
// ============================================================================

//! ## Overview
//! Every statement built here follows one rule: identifiers are resolved
//! against introspection (or validated, for new objects) and emitted through
//! [`QuotedIdent`]; values are bound as `?` parameters. Row data arrives as a
//! JSON object and is converted cell by cell into [`SqlValue`].
//!
//! Insert policy:
//! - Engine-managed columns are never written; keys naming them are ignored.
//! - A declared-default column with an empty value gets the dialect's default
//!   marker. For SQLite that means omitting it.
//! - A NOT NULL column without a default and without a value fails with
//!   [`EngineError::MissingRequiredColumn`].
//! - A nullable column without a value is omitted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::fmt::Write as _;

use serde_json::Value;

use crate::core::AUTO_ID_COLUMN;
use crate::core::ColumnInfo;
use crate::core::ColumnSpec;
use crate::core::DefaultMarker;
use crate::core::EngineError;
use crate::core::GeneratedStatement;
use crate::core::QuotedIdent;
use crate::core::RowData;
use crate::core::SqlValue;
use crate::core::validate_column_type;
use crate::core::validate_new_identifier;
use crate::interfaces::SchemaCatalog;
use crate::runtime::introspector::SchemaIntrospector;
use crate::runtime::introspector::find_column;

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Statement builder backed by schema introspection.
pub struct SqlGenerator<'a, C: ?Sized> {
    /// Dialect hooks.
    catalog: &'a C,
    /// Identifier allow-list and column metadata.
    introspector: SchemaIntrospector<'a, C>,
}

impl<'a, C> SqlGenerator<'a, C>
where
    C: SchemaCatalog + ?Sized,
{
    /// Creates a generator over `catalog`.
    #[must_use]
    pub const fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            introspector: SchemaIntrospector::new(catalog),
        }
    }

    /// Builds an INSERT for `table` from `row_data`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTable`] or [`EngineError::UnknownColumn`]
    /// for identifiers absent from the schema,
    /// [`EngineError::NoInsertableColumns`] when every column is engine-managed,
    /// and [`EngineError::MissingRequiredColumn`] when a NOT NULL column
    /// without a default has no value.
    pub fn generate_insert(
        &self,
        table: &str,
        row_data: &RowData,
    ) -> Result<GeneratedStatement, EngineError> {
        let table = self.introspector.require_table(table)?;
        let info = self.introspector.table_info(&table)?;
        reject_unknown_keys(&table, &info, row_data.keys().map(String::as_str))?;

        let insertable: Vec<&ColumnInfo> =
            info.iter().filter(|column| !column.is_system_managed()).collect();
        if insertable.is_empty() {
            return Err(EngineError::NoInsertableColumns {
                table,
            });
        }

        let marker = self.catalog.default_marker();
        let mut names = Vec::with_capacity(insertable.len());
        let mut slots = Vec::with_capacity(insertable.len());
        let mut params = Vec::with_capacity(insertable.len());
        for column in insertable {
            let value = lookup_value(row_data, &column.name);
            let filled = value.as_ref().filter(|value| !value.is_empty_input());
            if column.has_default() && filled.is_none() {
                if let DefaultMarker::Keyword(keyword) = marker {
                    names.push(column.name.as_str());
                    slots.push(keyword);
                }
                continue;
            }
            match value {
                Some(value) if value != SqlValue::Null => {
                    names.push(column.name.as_str());
                    slots.push("?");
                    params.push(value);
                }
                _ if column.not_null => {
                    return Err(EngineError::MissingRequiredColumn {
                        table,
                        column: column.name.clone(),
                    });
                }
                _ => {}
            }
        }

        let mut sql = format!("INSERT INTO {}", QuotedIdent(&table));
        if names.is_empty() {
            sql.push_str(" DEFAULT VALUES");
        } else {
            let columns: Vec<String> =
                names.iter().map(|name| QuotedIdent(name).to_string()).collect();
            let _ = write!(sql, " ({}) VALUES ({})", columns.join(", "), slots.join(", "));
        }
        Ok(GeneratedStatement::write(sql, params))
    }

    /// Builds an UPDATE that assigns every field of `row_data` except
    /// `row_identifier_column`, for the row whose identifier equals
    /// `row_identifier_value`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTable`] or [`EngineError::UnknownColumn`]
    /// for identifiers absent from the schema and [`EngineError::EmptyUpdate`]
    /// when nothing is assignable.
    pub fn generate_update(
        &self,
        table: &str,
        row_data: &RowData,
        row_identifier_value: &Value,
        row_identifier_column: &str,
    ) -> Result<GeneratedStatement, EngineError> {
        let table = self.introspector.require_table(table)?;
        let info = self.introspector.table_info(&table)?;
        let identifier = find_column(&info, row_identifier_column).ok_or_else(|| {
            EngineError::UnknownColumn {
                table: table.clone(),
                column: row_identifier_column.to_string(),
            }
        })?;

        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for (field, value) in row_data {
            if field.eq_ignore_ascii_case(&identifier.name) {
                continue;
            }
            let column =
                find_column(&info, field).ok_or_else(|| EngineError::UnknownColumn {
                    table: table.clone(),
                    column: field.clone(),
                })?;
            assignments.push(format!("{} = ?", QuotedIdent(&column.name)));
            params.push(SqlValue::from(value));
        }
        if assignments.is_empty() {
            return Err(EngineError::EmptyUpdate {
                table,
            });
        }
        params.push(SqlValue::from(row_identifier_value));
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            QuotedIdent(&table),
            assignments.join(", "),
            QuotedIdent(&identifier.name)
        );
        Ok(GeneratedStatement::write(sql, params))
    }

    /// Builds `SELECT *` over an existing table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTable`] when the table does not exist.
    pub fn select_all(&self, table: &str) -> Result<GeneratedStatement, EngineError> {
        let table = self.introspector.require_table(table)?;
        Ok(GeneratedStatement::read(format!("SELECT * FROM {}", QuotedIdent(&table)), Vec::new()))
    }

    /// Builds a SELECT of the rows whose `label` column equals `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTable`] or [`EngineError::UnknownColumn`]
    /// for identifiers absent from the schema.
    pub fn select_record(
        &self,
        table: &str,
        label: &str,
        id: SqlValue,
    ) -> Result<GeneratedStatement, EngineError> {
        let table = self.introspector.require_table(table)?;
        let column = self.introspector.require_column(&table, label)?;
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?",
            QuotedIdent(&table),
            QuotedIdent(&column.name)
        );
        Ok(GeneratedStatement::read(sql, vec![id]))
    }

    /// Builds a SELECT of one column, in natural row order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTable`] or [`EngineError::UnknownColumn`]
    /// for identifiers absent from the schema.
    pub fn select_column(&self, table: &str, column: &str) -> Result<GeneratedStatement, EngineError> {
        let table = self.introspector.require_table(table)?;
        let column = self.introspector.require_column(&table, column)?;
        let sql = format!("SELECT {} FROM {}", QuotedIdent(&column.name), QuotedIdent(&table));
        Ok(GeneratedStatement::read(sql, Vec::new()))
    }

    /// Builds a DELETE of the row whose `id` column equals `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTable`] for unknown tables and
    /// [`EngineError::UnknownColumn`] when the table has no `id` column.
    pub fn delete_row(&self, table: &str, id: SqlValue) -> Result<GeneratedStatement, EngineError> {
        let table = self.introspector.require_table(table)?;
        let column = self.introspector.require_column(&table, AUTO_ID_COLUMN)?;
        let sql =
            format!("DELETE FROM {} WHERE {} = ?", QuotedIdent(&table), QuotedIdent(&column.name));
        Ok(GeneratedStatement::write(sql, vec![id]))
    }

    /// Builds a DROP TABLE for an existing table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTable`] when the table does not exist.
    pub fn drop_table(&self, table: &str) -> Result<GeneratedStatement, EngineError> {
        let table = self.introspector.require_table(table)?;
        Ok(GeneratedStatement::write(format!("DROP TABLE {}", QuotedIdent(&table)), Vec::new()))
    }
}

// ============================================================================
// SECTION: Table Creation
// ============================================================================

/// Builds a CREATE TABLE with a synthetic `id INTEGER PRIMARY KEY
/// AUTOINCREMENT` column ahead of `column_specs`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidIdentifier`] for malformed names,
/// [`EngineError::InvalidColumnType`] for malformed types, and
/// [`EngineError::DuplicateColumnName`] when two columns share a name
/// (ignoring ASCII case), including a user column named `id`.
pub fn generate_create_table(
    table: &str,
    column_specs: &[ColumnSpec],
) -> Result<GeneratedStatement, EngineError> {
    validate_new_identifier(table)?;
    let mut seen: HashSet<String> = HashSet::from([AUTO_ID_COLUMN.to_string()]);
    let mut definitions =
        vec![format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", QuotedIdent(AUTO_ID_COLUMN))];
    for spec in column_specs {
        validate_new_identifier(&spec.field)?;
        validate_column_type(&spec.field, &spec.column_type)?;
        if !seen.insert(spec.field.to_ascii_lowercase()) {
            return Err(EngineError::DuplicateColumnName {
                column: spec.field.clone(),
            });
        }
        definitions.push(format!("{} {}", QuotedIdent(&spec.field), spec.column_type.trim()));
    }
    let sql = format!("CREATE TABLE {} ({})", QuotedIdent(table), definitions.join(", "));
    Ok(GeneratedStatement::write(sql, Vec::new()))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the value supplied for `column`, matching keys without ASCII case.
fn lookup_value(row_data: &RowData, column: &str) -> Option<SqlValue> {
    row_data.get(column).map(SqlValue::from).or_else(|| {
        row_data
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(column))
            .map(|(_, value)| SqlValue::from(value))
    })
}

/// Fails on the first key that names no column of the table.
fn reject_unknown_keys<'k>(
    table: &str,
    info: &[ColumnInfo],
    mut keys: impl Iterator<Item = &'k str>,
) -> Result<(), EngineError> {
    match keys.find(|key| find_column(info, key).is_none()) {
        Some(key) => Err(EngineError::UnknownColumn {
            table: table.to_string(),
            column: key.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::generate_create_table;
    use crate::core::ColumnSpec;
    use crate::core::EngineError;

    fn spec(field: &str, column_type: &str) -> ColumnSpec {
        ColumnSpec {
            field: field.to_string(),
            column_type: column_type.to_string(),
        }
    }

    #[test]
    fn create_table_prepends_auto_id() {
        let statement =
            generate_create_table("people", &[spec("name", "TEXT"), spec("age", "INTEGER")])
                .unwrap();
        assert_eq!(
            statement.sql,
            "CREATE TABLE \"people\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"name\" TEXT, \
             \"age\" INTEGER)"
        );
        assert!(statement.params.is_empty());
    }

    #[test]
    fn create_table_rejects_user_id_column() {
        let err = generate_create_table("people", &[spec("ID", "INTEGER")]).unwrap_err();
        assert_eq!(
            err,
            EngineError::DuplicateColumnName {
                column: "ID".to_string()
            }
        );
    }
}
