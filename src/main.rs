//! VesselWatch server entry point

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use vesselwatch::{config, create_router, db, init_tracing, AppState};
use vesselwatch::inference::{InferencePipeline, ThresholdConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_tracing(&config.log_format);

    tracing::info!("VesselWatch server starting...");
    tracing::info!("Database: {}", config.database_url);

    // Fitted artifacts; refusing to serve without them
    let pipeline = InferencePipeline::load(
        &config.artifact_dir,
        ThresholdConfig::new(config.svr_threshold),
    )
    .with_context(|| format!("Failed to load artifacts from {}", config.artifact_dir.display()))?;

    tracing::info!(svr_threshold = config.svr_threshold, "Inference pipeline ready");

    // Initialize database pool
    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Running database migrations...");
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let state = AppState {
        pool,
        config: config.clone(),
        pipeline: Arc::new(pipeline),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
