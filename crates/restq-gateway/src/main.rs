//! restq HTTP/JSON gateway binary.

use clap::Parser;
use restq_core::SchemaRegistry;
use restq_gateway::demo::{asset_collection, load_seed, sample_assets, Asset};
use restq_gateway::{create_router, AppState, Args, EntityRegistry, GatewayConfig, TypedEntity};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line args
    let args = Args::parse();
    let config = GatewayConfig::from(&args);

    info!(
        listen = %config.listen_addr,
        strict_operators = config.strict_operators,
        cache_capacity = config.cache_capacity,
        cache_ttl_ms = config.cache_ttl.as_millis(),
        "Starting restq gateway"
    );

    let assets = match &config.seed_path {
        Some(path) => load_seed(path)?,
        None => sample_assets(),
    };
    info!(records = assets.len(), "Loaded demo assets");

    // Register entities
    let schemas = SchemaRegistry::new();
    let entities = EntityRegistry::new().with_entity(
        TypedEntity::new(schemas.schema_of::<Asset>()?, asset_collection(assets))
            .with_default_page_size(config.default_page_size),
    );
    info!(entities = ?entities.names(), "Registered entities");

    // Create application state and router
    let state = AppState::new(entities, config.clone());
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Gateway listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
