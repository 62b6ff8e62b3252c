// crates/tablescope-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Database Store
// Description: Storage capabilities backed by an SQLite database file.
// Purpose: Serve metadata, statements, and saved queries for browsing.
// Dependencies: rusqlite, serde, tablescope-core, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`SqliteDatabase`] implements the Tablescope storage capabilities over one
//! database file. A single writer connection, guarded by a mutex, runs every
//! mutation. Reads and metadata lookups use a round-robin pool of read-only
//! connections, so a gated read cannot write even if its text tries to.
//! A write that leaves a transaction open (`BEGIN` without `COMMIT`) is
//! rolled back and reported as a failure.
//!
//! Metadata comes from the `pragma_table_info` and `pragma_foreign_key_list`
//! table-valued functions with the table name bound as a parameter, and from
//! `sqlite_master` for stored CREATE statements.
//!
//! Security posture: database contents and statement text are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value as DbValue;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use tablescope_core::ColumnInfo;
use tablescope_core::ForeignKey;
use tablescope_core::Row;
use tablescope_core::SavedQuery;
use tablescope_core::SavedQueryStore;
use tablescope_core::SchemaCatalog;
use tablescope_core::SqlValue;
use tablescope_core::StatementRunner;
use tablescope_core::StoreError;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default number of read-only connections.
const DEFAULT_READ_POOL_SIZE: usize = 4;
/// Upper bound on read-only connections.
pub const MAX_READ_POOL_SIZE: usize = 64;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// User tables, excluding engine-internal `sqlite_` tables.
const LIST_TABLES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'";
/// Column metadata for one table.
const TABLE_INFO_SQL: &str =
    "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid";
/// Foreign-key metadata for one table.
const FOREIGN_KEYS_SQL: &str =
    "SELECT \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq";
/// Failure reported when a write leaves a transaction open.
const UNTERMINATED_TRANSACTION: &str =
    "transaction was not committed; it has been rolled back";
/// Stored CREATE statement for one table.
const CREATE_STATEMENT_SQL: &str = "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1";
/// Saved-query table, created on first access.
const SAVED_QUERY_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS query (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    sqlstatement TEXT
)";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode; readers do not block the writer.
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode.
    #[default]
    Full,
    /// Normal synchronous mode.
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the browsed `SQLite` database.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `read_pool_size` is within `1..=MAX_READ_POOL_SIZE`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteDatabaseConfig {
    /// Path to the database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Journal mode applied by the writer connection.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// Synchronous mode applied by the writer connection.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Number of read-only connections.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,
    /// Enforce foreign-key constraints on every connection.
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
}

impl SqliteDatabaseConfig {
    /// Returns a configuration with defaults for `path`.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            read_pool_size: DEFAULT_READ_POOL_SIZE,
            foreign_keys: true,
        }
    }

    /// Validates path and pool limits.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Invalid`] when a limit is violated.
    pub fn validate(&self) -> Result<(), SqliteStoreError> {
        validate_store_path(&self.path)?;
        if self.read_pool_size == 0 || self.read_pool_size > MAX_READ_POOL_SIZE {
            return Err(SqliteStoreError::Invalid(format!(
                "read_pool_size out of range: {} (1..={MAX_READ_POOL_SIZE})",
                self.read_pool_size
            )));
        }
        Ok(())
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default read connection pool size.
const fn default_read_pool_size() -> usize {
    DEFAULT_READ_POOL_SIZE
}

/// Returns the default foreign-key enforcement flag.
const fn default_foreign_keys() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Filesystem or lock failure.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error, message verbatim.
    #[error("{0}")]
    Db(String),
    /// Invalid store configuration.
    #[error("sqlite store invalid config: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Db(message) => Self::Db(message),
            SqliteStoreError::Io(message) | SqliteStoreError::Invalid(message) => Self::Io(message),
        }
    }
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(error.to_string())
    }
}

// ============================================================================
// SECTION: Database
// ============================================================================

/// `SQLite` database exposed through the Tablescope storage capabilities.
///
/// # Invariants
/// - Every mutation runs on `write_connection`.
/// - Read connections are opened read-only.
pub struct SqliteDatabase {
    /// Store configuration.
    config: SqliteDatabaseConfig,
    /// Serialized writer connection.
    write_connection: Mutex<Connection>,
    /// Read-only connection pool.
    read_connections: Vec<Mutex<Connection>>,
    /// Round-robin cursor into `read_connections`.
    read_cursor: AtomicUsize,
}

impl SqliteDatabase {
    /// Opens the database described by `config`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the configuration is invalid or a
    /// connection cannot be opened.
    pub fn new(config: SqliteDatabaseConfig) -> Result<Self, SqliteStoreError> {
        config.validate()?;
        ensure_parent_dir(&config.path)?;
        let write_connection = open_write_connection(&config)?;
        let mut read_connections = Vec::with_capacity(config.read_pool_size);
        for _ in 0 .. config.read_pool_size {
            read_connections.push(Mutex::new(open_read_connection(&config)?));
        }
        info!(
            path = %config.path.display(),
            journal_mode = config.journal_mode.pragma_value(),
            read_pool_size = config.read_pool_size,
            "opened sqlite database"
        );
        Ok(Self {
            config,
            write_connection: Mutex::new(write_connection),
            read_connections,
            read_cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteDatabaseConfig {
        &self.config
    }

    /// Locks the writer connection.
    fn writer(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite write mutex poisoned".to_string()))
    }

    /// Locks the next read connection using round-robin selection.
    fn reader(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        let len = self.read_connections.len();
        let index = self.read_cursor.fetch_add(1, Ordering::Relaxed) % len;
        self.read_connections
            .get(index)
            .ok_or_else(|| SqliteStoreError::Io("sqlite read pool is empty".to_string()))?
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite read mutex poisoned".to_string()))
    }

    /// Creates the saved-query table when it does not exist yet.
    fn ensure_saved_query_table(&self) -> Result<(), SqliteStoreError> {
        self.writer()?.execute_batch(SAVED_QUERY_TABLE_SQL)?;
        Ok(())
    }

    /// Verifies both connection kinds can run a trivial statement.
    fn check_connection(&self) -> Result<(), SqliteStoreError> {
        self.reader()?.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        self.writer()?.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Returns the primary key column of `table`, if it has exactly one.
    fn primary_key_column(&self, table: &str) -> Result<Option<String>, SqliteStoreError> {
        let columns = self.load_columns(table)?;
        let mut keys = columns.into_iter().filter(|column| column.primary_key);
        match (keys.next(), keys.next()) {
            (Some(key), None) => Ok(Some(key.name)),
            _ => Ok(None),
        }
    }

    /// Reads column metadata for `table`.
    fn load_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, SqliteStoreError> {
        let connection = self.reader()?;
        let mut statement = connection.prepare_cached(TABLE_INFO_SQL)?;
        let columns = statement
            .query_map(params![table], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    declared_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    not_null: row.get::<_, i64>(2)? != 0,
                    default_value: row.get(3)?,
                    primary_key: row.get::<_, i64>(4)? > 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}

// ============================================================================
// SECTION: Capabilities
// ============================================================================

impl SchemaCatalog for SqliteDatabase {
    fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let connection = self.reader()?;
        let mut statement = connection.prepare_cached(LIST_TABLES_SQL).map_err(db_error)?;
        let tables = statement
            .query_map([], |row| row.get(0))
            .map_err(db_error)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(db_error)?;
        Ok(tables)
    }

    fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, StoreError> {
        Ok(self.load_columns(table)?)
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>, StoreError> {
        let edges: Vec<(String, String, Option<String>)> = {
            let connection = self.reader()?;
            let mut statement = connection.prepare_cached(FOREIGN_KEYS_SQL).map_err(db_error)?;
            statement
                .query_map(params![table], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
                .map_err(db_error)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(db_error)?
        };
        let mut foreign_keys = Vec::with_capacity(edges.len());
        for (target_table, source_column, target_column) in edges {
            // `REFERENCES parent` without a column list targets the parent's primary key.
            let target_column = match target_column {
                Some(column) => Some(column),
                None => self.primary_key_column(&target_table)?,
            };
            let Some(target_column) = target_column else {
                debug!(table, column = %source_column, "foreign key target has no single key");
                continue;
            };
            foreign_keys.push(ForeignKey {
                source_table: table.to_string(),
                source_column,
                target_table,
                target_column,
            });
        }
        Ok(foreign_keys)
    }

    fn create_statement(&self, table: &str) -> Result<Option<String>, StoreError> {
        let connection = self.reader()?;
        let sql: Option<Option<String>> = connection
            .query_row(CREATE_STATEMENT_SQL, params![table], |row| row.get(0))
            .optional()
            .map_err(db_error)?;
        Ok(sql.flatten())
    }
}

impl StatementRunner for SqliteDatabase {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<usize, StoreError> {
        let connection = self.writer()?;
        let outcome = connection
            .execute(sql, params_from_iter(params.iter().map(to_db_value)))
            .map_err(db_error);
        release_writer(&connection, outcome)
    }

    fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        let connection = self.writer()?;
        let outcome = connection.execute_batch(sql).map_err(db_error);
        release_writer(&connection, outcome)
    }

    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        let connection = self.reader()?;
        let mut statement = connection.prepare(sql).map_err(db_error)?;
        let names: Vec<String> =
            statement.column_names().into_iter().map(str::to_string).collect();
        let mut rows = statement
            .query(params_from_iter(params.iter().map(to_db_value)))
            .map_err(db_error)?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next().map_err(db_error)? {
            let mut cells = Row::new();
            for (index, name) in names.iter().enumerate() {
                let value = row.get_ref(index).map_err(db_error)?;
                cells.push(name.clone(), from_db_value(value));
            }
            collected.push(cells);
        }
        Ok(collected)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.check_connection().map_err(StoreError::from)
    }
}

impl SavedQueryStore for SqliteDatabase {
    fn saved_queries(&self) -> Result<Vec<SavedQuery>, StoreError> {
        self.ensure_saved_query_table()?;
        let connection = self.reader()?;
        let mut statement = connection
            .prepare_cached("SELECT id, name, sqlstatement FROM query ORDER BY id")
            .map_err(db_error)?;
        let queries = statement
            .query_map([], |row| {
                Ok(SavedQuery {
                    id: row.get(0)?,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    sql_statement: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        Ok(queries)
    }

    fn insert_saved_query(&self, name: &str, sql_statement: &str) -> Result<SavedQuery, StoreError> {
        self.ensure_saved_query_table()?;
        let connection = self.writer()?;
        connection
            .execute("INSERT INTO query (name, sqlstatement) VALUES (?1, ?2)", params![
                name,
                sql_statement
            ])
            .map_err(db_error)?;
        Ok(SavedQuery {
            id: connection.last_insert_rowid(),
            name: name.to_string(),
            sql_statement: sql_statement.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Value Conversion
// ============================================================================

/// Converts a bound value into its `rusqlite` form.
fn to_db_value(value: &SqlValue) -> DbValue {
    match value {
        SqlValue::Null => DbValue::Null,
        SqlValue::Integer(value) => DbValue::Integer(*value),
        SqlValue::Real(value) => DbValue::Real(*value),
        SqlValue::Text(text) => DbValue::Text(text.clone()),
        SqlValue::Blob(bytes) => DbValue::Blob(bytes.clone()),
    }
}

/// Converts a result cell into a [`SqlValue`]. Invalid UTF-8 text is
/// replaced lossily.
fn from_db_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(value) => SqlValue::Integer(value),
        ValueRef::Real(value) => SqlValue::Real(value),
        ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
    }
}

/// Maps a driver error into a verbatim store error.
fn db_error(error: rusqlite::Error) -> StoreError {
    StoreError::Db(error.to_string())
}

/// Rolls back a transaction the last statement left open on the writer and
/// reports it as a failure. Readers never see uncommitted writes.
fn release_writer<T>(
    connection: &Connection,
    outcome: Result<T, StoreError>,
) -> Result<T, StoreError> {
    if connection.is_autocommit() {
        return outcome;
    }
    connection.execute_batch("ROLLBACK").map_err(db_error)?;
    warn!("rolled back an unterminated transaction on the writer connection");
    outcome.and_then(|_| Err(StoreError::Db(UNTERMINATED_TRANSACTION.to_string())))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the database exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("database path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates database paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("database path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("database path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "database path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "database path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens the writer connection and applies durability pragmas.
fn open_write_connection(config: &SqliteDatabaseConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    apply_common_pragmas(&connection, config)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))?;
    Ok(connection)
}

/// Opens a read-only pool connection.
fn open_read_connection(config: &SqliteDatabaseConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    apply_common_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies pragmas shared by writer and readers.
fn apply_common_pragmas(
    connection: &Connection,
    config: &SqliteDatabaseConfig,
) -> Result<(), SqliteStoreError> {
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    connection.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}
