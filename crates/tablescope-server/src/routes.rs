// crates/tablescope-server/src/routes.rs
// ============================================================================
// Module: Tablescope HTTP Routes
// Description: Route table, request payloads, and the response envelope.
// Purpose: Translate HTTP requests into browser engine operations.
// Dependencies: axum, serde, serde_json, tablescope-core, tokio, tracing
// ============================================================================

//! ## Overview
//! Handlers parse their JSON bodies themselves so malformed input maps to a
//! `400` envelope instead of an extractor rejection. Engine calls run on
//! [`tokio::task::spawn_blocking`]; engine failures map to `500` unless the
//! request named something that does not exist or cannot be built, which maps
//! to `400`.
//!
//! Security posture: bodies and path segments are untrusted. Identifiers are
//! resolved by the engine; values are bound as parameters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tablescope_core::AUTO_ID_COLUMN;
use tablescope_core::BrowserEngine;
use tablescope_core::ColumnSpec;
use tablescope_core::EngineError;
use tablescope_core::RowData;
use tablescope_core::SqlValue;
use tablescope_store_sqlite::SqliteDatabase;
use tracing::debug;
use tracing::warn;

// ============================================================================
// SECTION: State
// ============================================================================

/// Engine type served over HTTP.
pub type SharedEngine = Arc<BrowserEngine<SqliteDatabase>>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Browser engine shared across requests.
    engine: SharedEngine,
}

impl AppState {
    /// Wraps an engine for sharing across handlers.
    #[must_use]
    pub fn new(engine: BrowserEngine<SqliteDatabase>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Returns the shared engine.
    #[must_use]
    pub const fn engine(&self) -> &SharedEngine {
        &self.engine
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the route table over `state` with a request body cap.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tables", get(list_tables))
        .route("/tables/local/query", get(list_saved_queries).post(save_query))
        .route("/tables/{name}", get(table_rows))
        .route("/tables/infos/{name}", get(describe_table))
        .route("/tables/all/infos/{name}", get(describe_all_columns))
        .route("/tables/getrecord/{tablename}/{label}/{id}", get(get_record))
        .route("/tables/insert", post(insert_row))
        .route("/tables/generate/insert", post(preview_insert))
        .route("/tables/update", post(update_row))
        .route("/tables/generate/update", post(preview_update))
        .route("/tables/create", post(create_table))
        .route("/tables/generate/create", post(preview_create_table))
        .route("/tables/query", post(run_query))
        .route("/tables/explain", post(explain_query))
        .route("/tables/delete", post(delete_row))
        .route("/tables/table/delete", post(drop_table))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// JSON body shared by every response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Operation payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Status code plus envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response body.
    pub body: Envelope,
}

impl ApiResponse {
    /// Successful response carrying `data`; `()` produces no `data` field.
    pub fn ok(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(Value::Null) => Self::with_data(None),
            Ok(value) => Self::with_data(Some(value)),
            Err(_) => {
                Self::failure(StatusCode::INTERNAL_SERVER_ERROR, "response serialization failed")
            }
        }
    }

    /// Failed response with `message`.
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: Envelope {
                success: false,
                data: None,
                error: Some(message.into()),
            },
        }
    }

    /// Maps an engine error to its status and verbatim message.
    #[must_use]
    pub fn from_engine_error(error: &EngineError) -> Self {
        Self::failure(status_for(error), error.to_string())
    }

    /// Successful response body.
    const fn with_data(data: Option<Value>) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope {
                success: true,
                data,
                error: None,
            },
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Returns the HTTP status for an engine error.
const fn status_for(error: &EngineError) -> StatusCode {
    match error {
        EngineError::UnknownTable {
            ..
        }
        | EngineError::UnknownColumn {
            ..
        }
        | EngineError::InvalidIdentifier(_)
        | EngineError::InvalidColumnType {
            ..
        }
        | EngineError::DuplicateColumnName {
            ..
        }
        | EngineError::EmptyUpdate {
            ..
        }
        | EngineError::MissingRequiredColumn {
            ..
        } => StatusCode::BAD_REQUEST,
        EngineError::StorageEngine(_)
        | EngineError::NoInsertableColumns {
            ..
        }
        | EngineError::TableNotFound {
            ..
        } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// SECTION: Request Payloads
// ============================================================================

/// Row insert or INSERT preview.
#[derive(Debug, Deserialize)]
pub struct InsertRequest {
    /// Target table.
    pub tablename: String,
    /// Column values keyed by column name.
    #[serde(rename = "dataArray")]
    pub data_array: RowData,
}

/// Row update or UPDATE preview.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    /// Target table.
    pub tablename: String,
    /// Column values keyed by column name.
    #[serde(rename = "dataArray")]
    pub data_array: RowData,
    /// Value identifying the row.
    #[serde(rename = "userId")]
    pub user_id: Value,
    /// Column identifying the row.
    #[serde(default = "default_id_label")]
    pub id_label: String,
}

/// Table creation or CREATE TABLE preview.
#[derive(Debug, Deserialize)]
pub struct CreateTableRequest {
    /// New table name.
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// Column declarations after the implicit `id`.
    pub data: Vec<ColumnSpec>,
}

/// Free-form statement.
#[derive(Debug, Deserialize)]
pub struct SqlRequest {
    /// Statement text.
    #[serde(rename = "sqlQuery")]
    pub sql_query: String,
}

/// Saved-query creation.
#[derive(Debug, Deserialize)]
pub struct SaveQueryRequest {
    /// Display name.
    pub name: String,
    /// Statement text.
    #[serde(rename = "sqlStatement")]
    pub sql_statement: String,
}

/// Row deletion by `id`.
#[derive(Debug, Deserialize)]
pub struct DeleteRowRequest {
    /// Target table.
    pub tablename: String,
    /// Value of the `id` column.
    pub id: Value,
}

/// Table drop.
#[derive(Debug, Deserialize)]
pub struct DropTableRequest {
    /// Table to drop.
    pub tablename: String,
}

/// Default row identifier column.
fn default_id_label() -> String {
    AUTO_ID_COLUMN.to_string()
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> ApiResponse {
    let engine = Arc::clone(&state.engine);
    match tokio::task::spawn_blocking(move || engine.readiness()).await {
        Ok(Ok(())) => ApiResponse::ok("ready"),
        Ok(Err(err)) => ApiResponse::failure(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        Err(_) => ApiResponse::failure(StatusCode::SERVICE_UNAVAILABLE, "readiness check failed"),
    }
}

/// `GET /tables`
pub async fn list_tables(State(state): State<AppState>) -> ApiResponse {
    run_blocking(&state, "list_tables", BrowserEngine::tables).await
}

/// `GET /tables/local/query`
pub async fn list_saved_queries(State(state): State<AppState>) -> ApiResponse {
    run_blocking(&state, "list_saved_queries", BrowserEngine::saved_queries).await
}

/// `POST /tables/local/query`
pub async fn save_query(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let request: SaveQueryRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_blocking(&state, "save_query", move |engine| {
        engine.save_query(&request.name, &request.sql_statement)
    })
    .await
}

/// `GET /tables/{name}`
pub async fn table_rows(State(state): State<AppState>, Path(name): Path<String>) -> ApiResponse {
    run_blocking(&state, "table_rows", move |engine| engine.table_rows(&name)).await
}

/// `GET /tables/infos/{name}`
pub async fn describe_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResponse {
    run_blocking(&state, "describe", move |engine| engine.describe(&name)).await
}

/// `GET /tables/all/infos/{name}`
pub async fn describe_all_columns(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResponse {
    run_blocking(&state, "describe_all", move |engine| engine.describe_all(&name)).await
}

/// `GET /tables/getrecord/{tablename}/{label}/{id}`
pub async fn get_record(
    State(state): State<AppState>,
    Path((table, label, id)): Path<(String, String, String)>,
) -> ApiResponse {
    let id = path_value(id);
    run_blocking(&state, "get_record", move |engine| engine.record(&table, &label, id)).await
}

/// `POST /tables/insert`
pub async fn insert_row(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let request: InsertRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_blocking(&state, "insert", move |engine| {
        engine.insert(&request.tablename, &request.data_array).map(|_| ())
    })
    .await
}

/// `POST /tables/generate/insert`
pub async fn preview_insert(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let request: InsertRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_blocking(&state, "preview_insert", move |engine| {
        engine.preview_insert(&request.tablename, &request.data_array)
    })
    .await
}

/// `POST /tables/update`
pub async fn update_row(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let request: UpdateRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_blocking(&state, "update", move |engine| {
        engine
            .update(&request.tablename, &request.data_array, &request.user_id, &request.id_label)
            .map(|_| ())
    })
    .await
}

/// `POST /tables/generate/update`
pub async fn preview_update(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let request: UpdateRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_blocking(&state, "preview_update", move |engine| {
        engine.preview_update(
            &request.tablename,
            &request.data_array,
            &request.user_id,
            &request.id_label,
        )
    })
    .await
}

/// `POST /tables/create`
pub async fn create_table(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let request: CreateTableRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_blocking(&state, "create_table", move |engine| {
        engine.create_table(&request.table_name, &request.data).map(|_| ())
    })
    .await
}

/// `POST /tables/generate/create`
pub async fn preview_create_table(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let request: CreateTableRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_blocking(&state, "preview_create_table", move |engine| {
        engine.preview_create_table(&request.table_name, &request.data)
    })
    .await
}

/// `POST /tables/query`
pub async fn run_query(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let request: SqlRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_blocking(&state, "query", move |engine| engine.run_query(&request.sql_query)).await
}

/// `POST /tables/explain`
pub async fn explain_query(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let request: SqlRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_blocking(&state, "explain", move |engine| engine.explain(&request.sql_query)).await
}

/// `POST /tables/delete`
pub async fn delete_row(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let request: DeleteRowRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let id = SqlValue::from(&request.id);
    run_blocking(&state, "delete_row", move |engine| {
        engine.delete_row(&request.tablename, id).map(|_| ())
    })
    .await
}

/// `POST /tables/table/delete`
pub async fn drop_table(State(state): State<AppState>, body: Bytes) -> ApiResponse {
    let request: DropTableRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_blocking(&state, "drop_table", move |engine| {
        engine.drop_table(&request.tablename).map(|_| ())
    })
    .await
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs an engine call on the blocking pool and wraps the outcome.
async fn run_blocking<T, F>(state: &AppState, operation: &'static str, call: F) -> ApiResponse
where
    T: Serialize + Send + 'static,
    F: FnOnce(&BrowserEngine<SqliteDatabase>) -> Result<T, EngineError> + Send + 'static,
{
    let engine = Arc::clone(&state.engine);
    debug!(operation, "dispatching request");
    match tokio::task::spawn_blocking(move || call(&engine)).await {
        Ok(Ok(value)) => ApiResponse::ok(value),
        Ok(Err(err)) => {
            warn!(operation, kind = err.kind(), error = %err, "request failed");
            ApiResponse::from_engine_error(&err)
        }
        Err(err) => {
            warn!(operation, error = %err, "blocking task failed");
            ApiResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, "request worker failed")
        }
    }
}

/// Parses a JSON request body, mapping failures to `400`.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiResponse> {
    serde_json::from_slice(body).map_err(|err| {
        ApiResponse::failure(StatusCode::BAD_REQUEST, format!("invalid request body: {err}"))
    })
}

/// Interprets a path segment as an integer when it parses as one.
fn path_value(segment: String) -> SqlValue {
    segment.parse::<i64>().map_or(SqlValue::Text(segment), SqlValue::Integer)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
