// crates/tablescope-server/src/lib.rs
// ============================================================================
// Module: Tablescope Server Library
// Description: HTTP routing layer over the browser engine.
// Purpose: Expose browsing operations as JSON endpoints.
// Dependencies: axum, tablescope-config, tablescope-core, tokio
// ============================================================================

//! ## Overview
//! `tablescope-server` binds the browser engine to an axum router. Every
//! engine call runs on the blocking pool and every outcome is wrapped in the
//! `{success, data, error}` envelope.
//!
//! Security posture: request bodies, path segments, and statement text are
//! untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod routes;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use routes::ApiResponse;
pub use routes::AppState;
pub use routes::build_router;
pub use server::BrowserServer;
pub use server::ServerError;
