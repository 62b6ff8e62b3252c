// crates/tablescope-core/src/core/value.rs
// ============================================================================
// Module: Tablescope Values
// Description: Scalar cell values and ordered result rows.
// Purpose: Bridge JSON row data and engine cell values without manual quoting.
// Dependencies: base64, serde, serde_json
// ============================================================================

//! ## Overview
//! [`SqlValue`] is the scalar exchanged with the storage engine, both as a
//! bound parameter and as a result cell. JSON row data converts into it
//! losslessly for scalars; nested arrays and objects are stored as their JSON
//! text. [`Row`] keeps result columns in engine order and serializes as a JSON
//! object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Generic row data keyed by column name, as received from callers.
pub type RowData = serde_json::Map<String, Value>;

/// Scalar value bound to, or read from, the storage engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// Double-precision float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns true for values a form treats as "not filled in": NULL or
    /// whitespace-only text.
    #[must_use]
    pub fn is_empty_input(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Integer(_) | Self::Real(_) | Self::Blob(_) => false,
        }
    }

    /// Renders the value as an inline SQL literal for statement previews.
    ///
    /// Previews are for display only; executed statements bind values.
    #[must_use]
    pub fn render_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Real(value) => value.to_string(),
            Self::Text(text) => format!("'{}'", text.replace('\'', "''")),
            Self::Blob(bytes) => {
                let hex: String = bytes.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }
}

impl From<&Value> for SqlValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Integer(i64::from(*flag)),
            Value::Number(number) => number
                .as_i64()
                .map(Self::Integer)
                .or_else(|| number.as_f64().map(Self::Real))
                .unwrap_or_else(|| Self::Text(number.to_string())),
            Value::String(text) => Self::Text(text.clone()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(value) => value.fmt(f),
            Self::Real(value) => value.fmt(f),
            Self::Text(text) => f.write_str(text),
            Self::Blob(bytes) => f.write_str(&BASE64.encode(bytes)),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Real(value) => serializer.serialize_f64(*value),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Blob(bytes) => serializer.serialize_str(&BASE64.encode(bytes)),
        }
    }
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// One result row: column names paired with values in result order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Cells in the order the engine returned them.
    cells: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: Vec::new(),
        }
    }

    /// Appends a cell.
    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.cells.push((column.into(), value));
    }

    /// Returns the value of the first cell named `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.cells.iter().find(|(name, _)| name == column).map(|(_, value)| value)
    }

    /// Returns the first cell's value.
    #[must_use]
    pub fn first(&self) -> Option<&SqlValue> {
        self.cells.first().map(|(_, value)| value)
    }

    /// Returns the number of cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true when the row has no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over `(column, value)` pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, SqlValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, SqlValue)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
