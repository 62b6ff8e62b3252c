// crates/tablescope-core/src/runtime/mod.rs
// ============================================================================
// Module: Tablescope Runtime
// Description: Introspection, SQL generation, gating, execution, and FK lookup.
// Purpose: Compose storage capabilities into browsing operations.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime components borrow a storage capability and never hold global
//! state. They compose leaf-first: the introspector feeds the generator, the
//! executor runs what the generator builds, and the foreign-key resolver
//! drives all three. [`BrowserEngine`] owns the store and exposes the
//! routing-level operations.

pub mod engine;
pub mod executor;
pub mod foreign_keys;
pub mod gate;
pub mod generator;
pub mod introspector;

pub use engine::BrowserEngine;
pub use engine::QueryResponse;
pub use executor::QueryExecutor;
pub use foreign_keys::ForeignKeyResolver;
pub use gate::ClassifiedStatement;
pub use gate::StatementClass;
pub use gate::classify_statement;
pub use generator::SqlGenerator;
pub use generator::generate_create_table;
pub use introspector::SchemaIntrospector;
