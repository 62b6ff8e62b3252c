// crates/tablescope-cli/src/lib.rs
// ============================================================================
// Module: Tablescope CLI Library
// Description: Shared helpers for the Tablescope command-line interface.
// Purpose: Provide logging setup for the CLI binary and its tests.
// Dependencies: tablescope-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! This library houses the CLI's reusable pieces. The binary entry point
//! (`src/main.rs`) imports them to keep process setup consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Tracing subscriber setup.
pub mod logging;
