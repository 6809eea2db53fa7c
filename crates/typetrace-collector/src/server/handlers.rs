//! Axum handlers for the collector API.
//!
//! Error mapping: `BatchMalformed` / `ParameterMissing` → 400, everything
//! else → 500, success → 200. Error bodies are `{"error": <message>}`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use typetrace_core::errors::{IngestError, QueryError};
use typetrace_core::TraceErrorCode;

use crate::ingest;
use crate::server::AppState;

type Reply = (StatusCode, Json<Value>);

fn ok<T: serde::Serialize>(body: T) -> Reply {
    (StatusCode::OK, Json(serde_json::to_value(body).unwrap_or(Value::Null)))
}

fn error_reply(status: StatusCode, message: String) -> Reply {
    (status, Json(json!({ "error": message })))
}

fn query_error(e: QueryError) -> Reply {
    let status = match e {
        QueryError::MissingParameter { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(error = %e, code = e.error_code(), "query request failed");
    error_reply(status, e.to_string())
}

fn ingest_error(e: IngestError) -> Reply {
    let status = match e {
        IngestError::MalformedBatch { .. } => StatusCode::BAD_REQUEST,
        IngestError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(error = %e, code = e.error_code(), "batch rejected");
    error_reply(status, e.to_string())
}

pub async fn stats(State(state): State<AppState>) -> Reply {
    match state.engine.stats() {
        Ok(body) => ok(body),
        Err(e) => query_error(e),
    }
}

pub async fn ingest(State(state): State<AppState>, Json(body): Json<Value>) -> Reply {
    let batch = match ingest::parse_batch(&body) {
        Ok(batch) => batch,
        Err(e) => return ingest_error(e),
    };
    match ingest::ingest_batch(&state.db, batch) {
        Ok(summary) => ok(summary),
        Err(e) => ingest_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct EntitiesParams {
    pub filename: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub async fn entities(
    State(state): State<AppState>,
    Query(params): Query<EntitiesParams>,
) -> Reply {
    match state.engine.entities(params.filename.as_deref(), params.offset, params.limit) {
        Ok(body) => ok(body),
        Err(e) => query_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct CallsParams {
    pub filepath: Option<String>,
    #[serde(rename = "functionName")]
    pub function_name: Option<String>,
    pub offset: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
}

pub async fn calls(State(state): State<AppState>, Query(params): Query<CallsParams>) -> Reply {
    match state.engine.calls(
        params.filepath.as_deref(),
        params.function_name.as_deref(),
        params.offset,
        params.page_size,
    ) {
        Ok(body) => ok(body),
        Err(e) => query_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationParams {
    pub filename: Option<String>,
    pub line_number: Option<i64>,
    pub column_number: Option<i64>,
}

pub async fn location(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Reply {
    match state.engine.location(
        params.filename.as_deref(),
        params.line_number,
        params.column_number,
    ) {
        Ok(body) => ok(body),
        Err(e) => query_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct EnumsParams {
    pub min_observations: Option<i64>,
    pub min_unique_strings: Option<i64>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn enums(State(state): State<AppState>, Query(params): Query<EnumsParams>) -> Reply {
    match state.engine.enums(
        params.min_observations,
        params.min_unique_strings,
        params.offset,
        params.limit,
    ) {
        Ok(body) => ok(body),
        Err(e) => query_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ShapesParams {
    pub min_observations: Option<i64>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn shapes(State(state): State<AppState>, Query(params): Query<ShapesParams>) -> Reply {
    match state.engine.shapes(params.min_observations, params.offset, params.limit) {
        Ok(body) => ok(body),
        Err(e) => query_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AnnotationsParams {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn annotations(
    State(state): State<AppState>,
    Query(params): Query<AnnotationsParams>,
) -> Reply {
    match state.engine.annotations(params.offset, params.limit) {
        Ok(body) => ok(body),
        Err(e) => query_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AdhocRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

pub async fn adhoc(State(state): State<AppState>, Json(body): Json<AdhocRequest>) -> Reply {
    match state.engine.adhoc(&body.query, &body.params) {
        Ok(rows) => ok(json!({ "rows": rows })),
        Err(e) => query_error(e),
    }
}
