// crates/tablescope-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Global tracing subscriber installation.
// Purpose: Route structured logs to stderr with a configurable filter.
// Dependencies: tablescope-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! The filter comes from `RUST_LOG` when set, otherwise from the config's
//! `[logging] level`. Logs go to stderr so stdout stays machine-readable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tablescope_config::LogFormat;
use tablescope_config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable overriding the configured filter.
pub const RUST_LOG_ENV: &str = "RUST_LOG";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Logging setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive did not parse.
    #[error("invalid log filter {directive}: {message}")]
    Filter {
        /// Rejected directive.
        directive: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber was already installed.
    #[error("log subscriber already installed: {0}")]
    Install(String),
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Returns the filter directive, preferring a non-empty `rust_log`.
#[must_use]
pub fn filter_directive(rust_log: Option<&str>, config: &LoggingConfig) -> String {
    match rust_log.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive.to_string(),
        _ => config.level.trim().to_ascii_lowercase(),
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let env_value = std::env::var(RUST_LOG_ENV).ok();
    let directive = filter_directive(env_value.as_deref(), config);
    let filter = EnvFilter::try_new(&directive).map_err(|err| LoggingError::Filter {
        directive: directive.clone(),
        message: err.to_string(),
    })?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.map_err(|err| LoggingError::Install(err.to_string()))
}
