//! restq HTTP/JSON gateway.
//!
//! Serves registered entities over REST. Each entity answers the query
//! string grammar of `restq-proto` on `GET /api/:entity` plus count, text
//! histogram, schema and lookup-by-id routes.

pub mod config;
pub mod demo;
pub mod error;
pub mod json;
pub mod routes;
pub mod service;

pub use config::{Args, GatewayConfig};
pub use error::AppError;
pub use service::{EntityRegistry, EntityService, TypedEntity};

use std::sync::Arc;

use axum::Router;
use restq_core::ResultCache;
use restq_proto::QueryRequest;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Registered entities.
    pub entities: Arc<EntityRegistry>,
    /// Cached query responses.
    pub cache: Arc<ResultCache<serde_json::Value>>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new application state.
    pub fn new(entities: EntityRegistry, config: GatewayConfig) -> Self {
        let cache = ResultCache::new(config.cache_capacity, config.cache_ttl);
        Self {
            entities: Arc::new(entities),
            cache: Arc::new(cache),
            config,
        }
    }

    /// Parse a raw query string with the configured operator policy.
    pub fn parse_request(&self, query: Option<&str>) -> Result<QueryRequest, AppError> {
        Ok(QueryRequest::from_query_string_with(
            query.unwrap_or(""),
            self.config.parse_options(),
        )?)
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::query::routes())
        .merge(routes::schema::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
