// crates/tablescope-config/src/lib.rs
// ============================================================================
// Module: Tablescope Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for tablescope.toml semantics.
// Dependencies: serde, tablescope-store-sqlite, toml
// ============================================================================

//! ## Overview
//! `tablescope-config` defines the configuration model shared by the CLI and
//! the HTTP server. Loading is strict and fail-closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
