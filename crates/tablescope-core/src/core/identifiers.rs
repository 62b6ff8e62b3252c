// crates/tablescope-core/src/core/identifiers.rs
// ============================================================================
// Module: Tablescope Identifiers
// Description: Identifier quoting and validation for generated SQL.
// Purpose: Keep table and column names out of the value-binding path.
// Dependencies: crate::core::error
// ============================================================================

//! ## Overview
//! Engines cannot bind identifiers as parameters, so generated SQL interpolates
//! them as text. Names of existing objects are allow-listed against
//! introspection before they reach this module; names of new objects must pass
//! [`validate_new_identifier`]. Either way the text is emitted through
//! [`QuotedIdent`], which double-quotes and escapes it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::core::error::EngineError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length accepted for new table and column names.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;
/// Maximum length accepted for a declared column type.
const MAX_COLUMN_TYPE_LENGTH: usize = 64;
/// Name of the synthetic primary key added to created tables.
pub const AUTO_ID_COLUMN: &str = "id";

// ============================================================================
// SECTION: Quoting
// ============================================================================

/// Display adapter that renders an identifier as a double-quoted SQL name.
///
/// # Invariants
/// - Embedded double quotes are doubled, so the output is always one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotedIdent<'a>(pub &'a str);

impl fmt::Display for QuotedIdent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for ch in self.0.chars() {
            if ch == '"' {
                f.write_str("\"\"")?;
            } else {
                write!(f, "{ch}")?;
            }
        }
        f.write_str("\"")
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a name for a table or column that does not exist yet.
///
/// Accepts ASCII letters, digits, and underscores, starting with a letter or
/// underscore.
///
/// # Errors
///
/// Returns [`EngineError::InvalidIdentifier`] when the name is empty, too
/// long, or contains other characters.
pub fn validate_new_identifier(name: &str) -> Result<(), EngineError> {
    if name.is_empty() || name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(EngineError::InvalidIdentifier(name.to_string()));
    }
    let mut chars = name.chars();
    let leading_ok = chars.next().is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if !leading_ok || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(EngineError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// Validates a declared column type such as `TEXT`, `INTEGER`, or
/// `VARCHAR(255)`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidColumnType`] when the type is not a type name
/// optionally followed by one parenthesized size list.
pub fn validate_column_type(column: &str, column_type: &str) -> Result<(), EngineError> {
    let invalid = || EngineError::InvalidColumnType {
        column: column.to_string(),
        column_type: column_type.to_string(),
    };
    let trimmed = column_type.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_COLUMN_TYPE_LENGTH {
        return Err(invalid());
    }
    let (name, size) = match trimmed.split_once('(') {
        Some((name, rest)) => {
            let size = rest.strip_suffix(')').ok_or_else(invalid)?;
            (name, Some(size))
        }
        None => (trimmed, None),
    };
    let name_ok = name.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic())
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == ' ');
    if !name_ok {
        return Err(invalid());
    }
    if let Some(size) = size {
        let parts: Vec<&str> = size.split(',').map(str::trim).collect();
        if parts.len() > 2
            || parts.iter().any(|part| part.is_empty() || !part.chars().all(|ch| ch.is_ascii_digit()))
        {
            return Err(invalid());
        }
    }
    Ok(())
}
