//! Huddle Server - Main Entry Point
//!
//! Moderation and image-upload backend for a small group chat.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use huddle_server::{
    api,
    composer::GatewayComposer,
    config,
    db,
    dispatch::CommandDispatcher,
    gateway::{DataGateway, MessageComposer, ObjectStore},
    moderation::ModerationExecutor,
    storage::S3ObjectStore,
    uploads::UploadGatekeeper,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "huddle_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Huddle Server");

    // Initialize database
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;
    let gateway: Arc<dyn DataGateway> = Arc::new(db::PgGateway::new(db_pool));

    // Initialize S3 client (optional - image uploads will be disabled if unavailable)
    let store: Option<Arc<dyn ObjectStore>> = match S3ObjectStore::new(&config).await {
        Ok(client) => match client.health_check().await {
            Ok(()) => {
                info!(bucket = %client.bucket(), "S3 storage connected");
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!("S3 health check failed: {}. Image uploads disabled.", e);
                None
            }
        },
        Err(e) => {
            warn!("S3 client initialization failed: {}. Image uploads disabled.", e);
            None
        }
    };

    let executor = ModerationExecutor::new(gateway.clone(), config.notice_room.clone());
    let composer: Arc<dyn MessageComposer> = Arc::new(GatewayComposer::new(gateway));
    let uploads = store.map(|store| {
        Arc::new(UploadGatekeeper::new(
            store,
            composer,
            config.upload_policy(),
        ))
    });

    // Build application state
    let state = api::AppState::new(config.clone(), CommandDispatcher::new(executor, uploads));

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
