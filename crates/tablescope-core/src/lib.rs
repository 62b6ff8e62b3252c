// crates/tablescope-core/src/lib.rs
// ============================================================================
// Module: Tablescope Core Library
// Description: Public API surface for the Tablescope core.
// Purpose: Expose schema types, storage interfaces, and the SQL engine.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Tablescope core inspects an arbitrary relational database through a
//! capability interface, synthesizes INSERT/UPDATE/CREATE statements from
//! generic row data, and gates free-form statements so only read-only text
//! reaches the read path. It is backend-agnostic: storage engines plug in by
//! implementing [`SchemaCatalog`], [`StatementRunner`], and [`SavedQueryStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::Database;
pub use interfaces::SavedQueryStore;
pub use interfaces::SchemaCatalog;
pub use interfaces::StatementRunner;
pub use interfaces::StoreError;
pub use runtime::BrowserEngine;
pub use runtime::ClassifiedStatement;
pub use runtime::ForeignKeyResolver;
pub use runtime::QueryExecutor;
pub use runtime::QueryResponse;
pub use runtime::SchemaIntrospector;
pub use runtime::SqlGenerator;
pub use runtime::StatementClass;
pub use runtime::classify_statement;
pub use runtime::generate_create_table;
