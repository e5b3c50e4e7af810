use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::account::AccountRecord;
use crate::query::{self, HealthReport, Resolver};
use crate::server::AppState;
use crate::storage::AccountStore;
use crate::{Error, Result};

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct GetParams {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    pub items: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetResponse {
    pub found: bool,
    #[serde(flatten)]
    pub record: Option<AccountRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Log the full failure and hand the caller a generic 500.
fn server_error(context: &str, err: Error) -> ApiError {
    tracing::error!("{} failed: {}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "server_error".to_string(),
        }),
    )
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Open a store on the blocking pool, run `f` on it and drop it.
async fn with_store<T, F>(state: &Arc<AppState>, f: F) -> Result<T>
where
    F: FnOnce(&mut AccountStore) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || {
        let mut store = AccountStore::open(&state.database, &state.table)?;
        f(&mut store)
    })
    .await
    .map_err(|e| Error::Task(e.to_string()))?
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<SearchResponse> {
    let raw = params.q.unwrap_or_default();
    let Some(q) = query::prepare_query(&raw) else {
        return Ok(Json(SearchResponse { items: Vec::new() }));
    };
    let q = q.to_string();

    let items = with_store(&state, move |store| query::search_names(store, &q))
        .await
        .map_err(|e| server_error("search", e))?;

    Ok(Json(SearchResponse { items }))
}

pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GetParams>,
) -> ApiResult<GetResponse> {
    let name = params.name.unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(bad_request("missing parameter: name"));
    }

    let lookup = with_store(&state, move |store| Resolver::new(store).resolve(&name))
        .await
        .map_err(|e| server_error("get", e))?;

    Ok(Json(GetResponse {
        found: lookup.is_found(),
        record: lookup.into_record(),
    }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let health_state = Arc::clone(&state);
    let report = tokio::task::spawn_blocking(move || {
        query::check_health(&health_state.table, || {
            AccountStore::open(&health_state.database, &health_state.table)
        })
    })
    .await
    .unwrap_or_else(|e| {
        tracing::error!("health check task failed: {}", e);
        HealthReport::unhealthy(&state.table, e)
    });

    Json(report)
}
