//! HTTP service surface.
//!
//! Exposes the engine's operations over the wire contract the demo client
//! speaks. All numeric parameters travel as plain decimal text; missing or
//! malformed parameters are rejected with 400 before any store work.
//!
//! # Endpoints
//!
//! - `GET /query?store=&key=&distance=&results=` — fuzzy suggest; JSON
//!   array of matching keys
//! - `GET /exact?store=&key=` — exact lookup; value text, empty body on a
//!   miss
//! - `PUT /add?store=&key=&value=` — insert/update one entry (parameters
//!   may also travel in a urlencoded body)
//! - `GET /loadenglish?store=` — bulk-load the configured word list
//! - `GET /clear?store=` — empty a store
//! - `GET /test?store=&distance=&results=&keys=[&seed=]` — benchmark run;
//!   JSON `{distance, accuracy, time, keys, results}`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Form, Json, Router};
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::engine::{EngineError, QueryEngine};
use crate::harness::{run_benchmark, BenchmarkConfig, BenchmarkReport};

/// Shared state for all request handlers: the engine plus server-level
/// configuration. Built once at startup, torn down at shutdown.
#[derive(Debug)]
pub struct AppState {
    /// Engine mediating all store access.
    pub engine: QueryEngine,
    /// Tab-separated `key<TAB>value` reference word list for `/loadenglish`.
    pub wordlist: Option<PathBuf>,
    /// Store `/loadenglish` targets when no `store` parameter is given.
    pub default_store: String,
}

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required request parameter is missing or empty.
    #[error("please provide a valid {0} parameter")]
    MissingParameter(&'static str),

    /// A request parameter failed numeric parsing.
    #[error("please provide a numeric {0} parameter")]
    NonNumericParameter(&'static str),

    /// The server has no word list configured for `/loadenglish`.
    #[error("no word list configured")]
    WordlistUnavailable,

    /// Reading the configured word list failed.
    #[error("failed to read word list: {0}")]
    WordlistIo(#[from] std::io::Error),

    /// A background task was cancelled or panicked.
    #[error("internal task failure")]
    TaskFailed,

    /// The engine rejected or aborted the operation.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingParameter(_) | ApiError::NonNumericParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::WordlistUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::WordlistIo(_) | ApiError::TaskFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Engine(error) => match error {
                EngineError::UnknownStore(_) => StatusCode::NOT_FOUND,
                EngineError::MalformedParameter { .. } | EngineError::InsufficientKeys { .. } => {
                    StatusCode::BAD_REQUEST
                }
                EngineError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            },
        };
        (status, self.to_string()).into_response()
    }
}

type Params = HashMap<String, String>;

/// Fetch a required, non-empty string parameter.
fn require<'a>(params: &'a Params, name: &'static str) -> Result<&'a str, ApiError> {
    match params.get(name).map(String::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::MissingParameter(name)),
    }
}

/// Fetch a required decimal parameter.
fn require_usize(params: &Params, name: &'static str) -> Result<usize, ApiError> {
    require(params, name)?
        .parse()
        .map_err(|_| ApiError::NonNumericParameter(name))
}

/// Build the service router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/query", get(handle_query))
        .route("/exact", get(handle_exact))
        .route("/add", put(handle_add))
        .route("/loadenglish", get(handle_load))
        .route("/clear", get(handle_clear))
        .route("/test", get(handle_test))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle `GET /query`: fuzzy suggest, returning matching keys only.
async fn handle_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Result<Json<Vec<String>>, ApiError> {
    let store = require(&params, "store")?;
    let term = require(&params, "key")?;
    let distance = require_usize(&params, "distance")?;
    let results = require_usize(&params, "results")?;

    let matches = state.engine.query(store, term, distance, results)?;
    Ok(Json(matches.into_iter().map(|m| m.key).collect()))
}

/// Handle `GET /exact`: value text, or an empty body on a miss. A miss is
/// a normal outcome, not an error status.
async fn handle_exact(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Result<String, ApiError> {
    let store = require(&params, "store")?;
    let key = require(&params, "key")?;
    Ok(state.engine.exact(store, key)?.unwrap_or_default())
}

/// Handle `PUT /add`: insert or update one entry. Parameters may arrive
/// in the query string, a urlencoded request body, or both; body fields
/// take precedence.
async fn handle_add(
    State(state): State<Arc<AppState>>,
    Query(query): Query<Params>,
    form: Option<Form<Params>>,
) -> Result<&'static str, ApiError> {
    let mut params = query;
    if let Some(Form(form)) = form {
        params.extend(form);
    }
    let store = require(&params, "store")?;
    let key = require(&params, "key")?;
    let value = params.get("value").map(String::as_str).unwrap_or_default();
    state.engine.add(store, key, value)?;
    Ok("Successfully set the key")
}

/// Handle `GET /loadenglish`: stream the configured reference word list
/// into a store. Lines are `key<TAB>value`; a line with no tab is loaded
/// as a key mapping to itself.
async fn handle_load(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Result<String, ApiError> {
    let store = params
        .get("store")
        .filter(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| state.default_store.clone());
    let path = state
        .wordlist
        .as_ref()
        .ok_or(ApiError::WordlistUnavailable)?;

    let contents = tokio::fs::read_to_string(path).await?;
    let entries: Vec<(String, String)> = contents
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once('\t') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (line.to_string(), line.to_string()),
        })
        .collect();

    let engine = state.engine.clone();
    let applied = tokio::task::spawn_blocking(move || engine.bulk_load(&store, entries))
        .await
        .map_err(|_| ApiError::TaskFailed)??;

    Ok(format!("Loaded {applied} entries"))
}

/// Handle `GET /clear`: empty a store.
async fn handle_clear(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Result<&'static str, ApiError> {
    let store = require(&params, "store")?;
    state.engine.clear(store)?;
    Ok("Store cleared")
}

/// Handle `GET /test`: run one benchmark and return its report.
async fn handle_test(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Result<Json<BenchmarkReport>, ApiError> {
    let config = BenchmarkConfig {
        store: require(&params, "store")?.to_string(),
        distance: require_usize(&params, "distance")?,
        keys: require_usize(&params, "keys")?,
        results: require_usize(&params, "results")?,
        seed: match params.get("seed").filter(|s| !s.is_empty()) {
            Some(seed) => Some(
                seed.parse()
                    .map_err(|_| ApiError::NonNumericParameter("seed"))?,
            ),
            None => None,
        },
    };

    let engine = state.engine.clone();
    let report = tokio::task::spawn_blocking(move || run_benchmark(&engine, &config))
        .await
        .map_err(|_| ApiError::TaskFailed)??;

    Ok(Json(report))
}
