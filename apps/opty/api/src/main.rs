use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{MongoUserRepository, UserRepository};
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    // The service still runs without the indexes; duplicates are then only
    // caught by the lookups in the service.
    if let Err(e) = MongoUserRepository::new(db.clone()).create_indexes().await {
        warn!("Failed to create user indexes: {}", e);
    }

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    let api_routes = api::routes(&state)?;

    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes)?;

    let app = router.merge(health_router(state.config.app));

    info!(
        "Starting Opty API (shutdown timeout {:?})",
        state.config.server.shutdown_timeout
    );

    let mongo_client = state.mongo_client.clone();
    create_production_app(app, &state.config.server, async move {
        info!("Shutting down: closing MongoDB connections");
        mongo_client.shutdown().await;
        info!("MongoDB connection closed successfully");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Opty API shutdown complete");
    Ok(())
}
