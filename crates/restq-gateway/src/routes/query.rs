//! Query endpoints.

use axum::{
    extract::{Path, RawQuery, State},
    routing::get,
    Json, Router,
};
use restq_core::QueryFingerprint;
use restq_proto::{CountResult, TextCount};
use tracing::{debug, error};

use crate::error::AppError;
use crate::AppState;

/// Query routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/:entity", get(handle_query))
        .route("/api/:entity/query/count", get(handle_count))
        .route("/api/:entity/query/get-text", get(handle_text_counts))
        .route("/api/:entity/:id", get(handle_find))
}

/// Run the full query pipeline.
///
/// With `cache=1` the response is served from, or stored into, the result
/// cache.
async fn handle_query(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = state.entities.get(&entity)?;
    let request = state.parse_request(query.as_deref())?;

    let fingerprint = request
        .cache
        .then(|| QueryFingerprint::from_request(service.name(), &request));
    if let Some(fingerprint) = &fingerprint {
        if let Some(cached) = state.cache.get(fingerprint) {
            debug!(entity = %entity, fingerprint = %fingerprint.to_hex(), "cache hit");
            return Ok(Json(cached));
        }
    }

    let response = {
        let service = service.clone();
        blocking(move || Ok(service.query(&request)?)).await?
    };
    let Some(fingerprint) = fingerprint else {
        return Ok(Json(response));
    };
    state
        .cache
        .insert(fingerprint, service.name(), response.clone());
    Ok(Json(response))
}

/// Count matching records.
async fn handle_count(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<CountResult>, AppError> {
    let service = state.entities.get(&entity)?;
    let request = state.parse_request(query.as_deref())?;
    let count = blocking(move || Ok(service.count(&request)?)).await?;
    Ok(Json(count))
}

/// Text histogram over the entity's text fields.
async fn handle_text_counts(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Result<Json<Vec<TextCount>>, AppError> {
    let service = state.entities.get(&entity)?;
    let counts = blocking(move || Ok(service.text_counts()?)).await?;
    Ok(Json(counts))
}

/// Look up one record by id.
async fn handle_find(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = state.entities.get(&entity)?;
    let lookup = id.clone();
    blocking(move || Ok(service.find(&lookup)?))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no {entity} record with id {id}")))
}

/// Run a synchronous scan on the blocking pool so large collections do not
/// stall the async workers.
async fn blocking<R, F>(work: F) -> Result<R, AppError>
where
    F: FnOnce() -> Result<R, AppError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        error!(error = %e, "query task failed");
        AppError::Internal(format!("query task failed: {e}"))
    })?
}
