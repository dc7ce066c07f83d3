//! Tillbook API Server
//!
//! Main entry point for the cash-up review backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tillbook_api::{AppState, create_router};
use tillbook_core::storage::{StorageConfig, StorageProvider, StorageService};
use tillbook_core::submission::LatenessPolicy;
use tillbook_db::connect;
use tillbook_shared::{AppConfig, JwtService};

fn storage_provider(config: &AppConfig) -> anyhow::Result<StorageProvider> {
    let settings = &config.storage;
    match settings.backend.as_str() {
        "s3" => Ok(StorageProvider::s3(
            &settings.endpoint,
            &settings.bucket,
            &settings.access_key,
            &settings.secret_key,
            &settings.region,
        )),
        "azure_blob" => Ok(StorageProvider::azure_blob(
            &settings.access_key,
            &settings.secret_key,
            &settings.bucket,
        )),
        "local" => Ok(StorageProvider::local_fs(&settings.root)),
        other => anyhow::bail!("unknown storage backend '{other}'"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tillbook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_service = JwtService::new(&config.jwt.secret);

    // Create evidence storage service
    let provider = storage_provider(&config)?;
    info!(backend = provider.name(), "Evidence storage configured");
    let storage = StorageService::from_config(StorageConfig::new(
        provider,
        config.storage.public_base_url.clone(),
    ))
    .context("Failed to initialize evidence storage")?;

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage: Arc::new(storage),
        lateness: LatenessPolicy::new(config.cashup.cutoff_hour, config.cashup.grace_minutes),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
