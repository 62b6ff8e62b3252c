// crates/tablescope-cli/src/main.rs
// ============================================================================
// Module: Tablescope CLI Entry Point
// Description: Command dispatcher for serving and one-shot browsing.
// Purpose: Run the HTTP server or a single engine operation from a shell.
// Dependencies: clap, tablescope-config, tablescope-core, tablescope-server, tokio
// ============================================================================

//! ## Overview
//! `tablescope` loads `tablescope.toml` (or `--config`), installs logging, and
//! then either serves HTTP or runs one browsing operation and prints its JSON
//! result to stdout. Failures go to stderr with a non-zero exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use tablescope_cli::logging;
use tablescope_config::TablescopeConfig;
use tablescope_core::BrowserEngine;
use tablescope_core::EngineError;
use tablescope_server::BrowserServer;
use tablescope_store_sqlite::SqliteDatabase;
use thiserror::Error;
use tracing::info;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "tablescope", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (defaults to `TABLESCOPE_CONFIG`, then tablescope.toml).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// List user tables.
    Tables,
    /// Describe a table's columns.
    Describe(DescribeCommand),
    /// Run a gated statement.
    Query(SqlCommand),
    /// Show the query plan for a statement.
    Explain(SqlCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Bind address overriding `[server] bind`.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

/// Arguments for `describe`.
#[derive(Args, Debug)]
struct DescribeCommand {
    /// Table to describe.
    table: String,
    /// Include engine-managed columns and skip foreign-key candidates.
    #[arg(long)]
    all: bool,
}

/// Arguments for `query` and `explain`.
#[derive(Args, Debug)]
struct SqlCommand {
    /// Statement text.
    sql: String,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration.
    Validate,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI errors.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration failed to load.
    #[error("config load failed: {0}")]
    Config(String),
    /// Logging could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
    /// The database could not be opened.
    #[error("database open failed: {0}")]
    Database(String),
    /// A browsing operation failed.
    #[error("{0}")]
    Engine(#[from] EngineError),
    /// The server failed.
    #[error("serve failed: {0}")]
    Serve(String),
    /// Output could not be written.
    #[error("output failed: {0}")]
    Output(String),
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads configuration, installs logging, and dispatches the command.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = TablescopeConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::Config(err.to_string()))?;
    logging::init(&config.logging).map_err(|err| CliError::Logging(err.to_string()))?;
    dispatch(cli.command, config).await
}

/// Runs one command against a loaded configuration.
async fn dispatch(command: Commands, mut config: TablescopeConfig) -> CliResult<ExitCode> {
    match command {
        Commands::Serve(command) => {
            if let Some(bind) = command.bind.as_deref() {
                config.override_bind(bind).map_err(|err| CliError::Config(err.to_string()))?;
            }
            command_serve(config).await
        }
        Commands::Tables => {
            let engine = open_engine(&config)?;
            write_json(&engine.tables()?)
        }
        Commands::Describe(command) => {
            let engine = open_engine(&config)?;
            let columns = if command.all {
                engine.describe_all(&command.table)?
            } else {
                engine.describe(&command.table)?
            };
            write_json(&columns)
        }
        Commands::Query(command) => {
            let engine = open_engine(&config)?;
            write_json(&engine.run_query(&command.sql)?)
        }
        Commands::Explain(command) => {
            let engine = open_engine(&config)?;
            write_json(&engine.explain(&command.sql)?)
        }
        Commands::Config {
            command: ConfigCommand::Validate,
        } => {
            write_stdout_line("config ok").map_err(|err| CliError::Output(err.to_string()))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(config: TablescopeConfig) -> CliResult<ExitCode> {
    let server = tokio::task::spawn_blocking(move || BrowserServer::from_config(config))
        .await
        .map_err(|err| CliError::Serve(format!("init join failed: {err}")))?
        .map_err(|err| CliError::Serve(err.to_string()))?;
    server.serve().await.map_err(|err| CliError::Serve(err.to_string()))?;
    info!("server stopped");
    Ok(ExitCode::SUCCESS)
}

/// Opens the configured database behind an engine.
fn open_engine(config: &TablescopeConfig) -> CliResult<BrowserEngine<SqliteDatabase>> {
    let database = SqliteDatabase::new(config.database.clone())
        .map_err(|err| CliError::Database(err.to_string()))?;
    Ok(BrowserEngine::new(database))
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes `value` as pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<ExitCode> {
    let text =
        serde_json::to_string_pretty(value).map_err(|err| CliError::Output(err.to_string()))?;
    write_stdout_line(&text).map_err(|err| CliError::Output(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr().lock();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
