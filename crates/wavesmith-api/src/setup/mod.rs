//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use wavesmith_core::Config;
use wavesmith_processing::FfmpegRunner;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Validate configuration - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    let runner = Arc::new(FfmpegRunner::new(
        config.ffmpeg_path.clone(),
        config.tool_timeout,
    ));
    validation::probe_tool(runner.as_ref()).await;

    tracing::info!("Configuration loaded and validated successfully");

    let state = Arc::new(AppState::new(config.clone(), runner));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
