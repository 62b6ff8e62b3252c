// crates/tablescope-server/src/server.rs
// ============================================================================
// Module: Tablescope HTTP Server
// Description: Server construction and the HTTP listen loop.
// Purpose: Open the configured database and serve the route table.
// Dependencies: axum, tablescope-config, tablescope-store-sqlite, tokio
// ============================================================================

//! ## Overview
//! [`BrowserServer`] opens the configured `SQLite` database, wraps it in a
//! [`BrowserEngine`], and serves [`build_router`] until Ctrl-C. Bind
//! addresses are validated by the config layer; non-loopback binds require an
//! explicit opt-in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Router;
use tablescope_config::TablescopeConfig;
use tablescope_core::BrowserEngine;
use tablescope_store_sqlite::SqliteDatabase;
use tokio::net::TcpListener;
use tracing::info;
use tracing::warn;

use crate::routes::AppState;
use crate::routes::build_router;

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server over one browsed database.
pub struct BrowserServer {
    /// Validated configuration.
    config: TablescopeConfig,
    /// Handler state.
    state: AppState,
}

impl BrowserServer {
    /// Opens the configured database and builds the server.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the config is invalid or the database
    /// cannot be opened.
    pub fn from_config(config: TablescopeConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let database = SqliteDatabase::new(config.database.clone())
            .map_err(|err| ServerError::Init(err.to_string()))?;
        Ok(Self::new(config, BrowserEngine::new(database)))
    }

    /// Builds a server over an already opened engine.
    #[must_use]
    pub fn new(config: TablescopeConfig, engine: BrowserEngine<SqliteDatabase>) -> Self {
        Self {
            config,
            state: AppState::new(engine),
        }
    }

    /// Returns the handler state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Builds the route table.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.server.max_body_bytes)
    }

    /// Serves requests until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr =
            self.config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_on(listener).await
    }

    /// Serves requests on an already bound listener until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when the server fails.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), ServerError> {
        let local = listener
            .local_addr()
            .map_err(|err| ServerError::Transport(format!("listener address: {err}")))?;
        info!(addr = %local, database = %self.config.database.path.display(), "tablescope listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Resolves when Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
