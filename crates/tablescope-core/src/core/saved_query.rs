// crates/tablescope-core/src/core/saved_query.rs
// ============================================================================
// Module: Tablescope Saved Queries
// Description: Named SQL statements kept in the browsed database.
// Purpose: Describe the append-only saved-query records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Saved queries are named SQL statements kept in the browsed database.

use serde::Deserialize;
use serde::Serialize;

/// A named SQL statement stored in the engine-managed `query` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    /// Row id assigned by the engine.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Statement text, stored as entered.
    pub sql_statement: String,
}
