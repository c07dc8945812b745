//! Schema endpoints.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::AppError;
use crate::json::{EntitiesResponse, SchemaResponse};
use crate::AppState;

/// Schema routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api", get(handle_list_entities))
        .route("/api/:entity/schema", get(handle_get_schema))
}

/// List registered entities.
async fn handle_list_entities(State(state): State<AppState>) -> Json<EntitiesResponse> {
    Json(EntitiesResponse {
        entities: state.entities.names(),
    })
}

/// Describe one entity.
async fn handle_get_schema(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Result<Json<SchemaResponse>, AppError> {
    let service = state.entities.get(&entity)?;
    Ok(Json(service.schema().into()))
}
