// crates/tablescope-store-sqlite/src/lib.rs
// ============================================================================
// Module: Tablescope SQLite Store
// Description: SQLite-backed schema catalog, statement runner, and saved queries.
// Purpose: Provide the storage capabilities the Tablescope engine browses.
// Dependencies: rusqlite, tablescope-core
// ============================================================================

//! ## Overview
//! [`SqliteDatabase`] opens one writer connection and a pool of read-only
//! connections against a database file. Writes are serialized through the
//! writer; reads and metadata lookups rotate across the pool.

pub mod store;

pub use store::SqliteDatabase;
pub use store::SqliteDatabaseConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
