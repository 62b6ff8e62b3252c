// crates/tablescope-core/src/core/mod.rs
// ============================================================================
// Module: Tablescope Core Types
// Description: Schema, value, and result structures shared by every crate.
// Purpose: Provide stable, serializable types for introspection and execution.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types describe tables, columns, foreign keys, scalar cell values, and
//! normalized execution results. These types are the canonical wire shapes for
//! the HTTP and CLI surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod error;
pub mod identifiers;
pub mod result;
pub mod saved_query;
pub mod schema;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::EngineError;
pub use identifiers::AUTO_ID_COLUMN;
pub use identifiers::MAX_IDENTIFIER_LENGTH;
pub use identifiers::QuotedIdent;
pub use identifiers::validate_column_type;
pub use identifiers::validate_new_identifier;
pub use result::ExecutionResult;
pub use result::GeneratedStatement;
pub use result::StatementKind;
pub use saved_query::SavedQuery;
pub use schema::Column;
pub use schema::ColumnInfo;
pub use schema::ColumnSpec;
pub use schema::DefaultMarker;
pub use schema::ForeignKey;
pub use value::Row;
pub use value::RowData;
pub use value::SqlValue;
