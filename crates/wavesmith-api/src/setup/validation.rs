//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::{Context, Result};
use wavesmith_core::Config;
use wavesmith_processing::ToolRunner;

/// Validate critical configuration values and prepare the temp directory.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server_port == 0 {
        return Err(anyhow::anyhow!("PORT cannot be 0"));
    }

    if config.max_upload_size_bytes == 0 {
        return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
    }

    if config.is_production() && config.cors_origins.iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.tool_timeout.is_none() {
        tracing::warn!("TOOL_TIMEOUT_SECS is 0 - media tool invocations are not time limited");
    }

    std::fs::create_dir_all(&config.temp_dir).with_context(|| {
        format!(
            "Failed to create temp directory {}",
            config.temp_dir.display()
        )
    })?;

    Ok(())
}

/// Log whether the media tool can be started. The server still comes up without it;
/// readiness reports the problem and requests fail with a tool error.
pub async fn probe_tool(runner: &dyn ToolRunner) {
    match runner.check_available().await {
        Ok(()) => tracing::info!("Media tool is available"),
        Err(e) => tracing::warn!(error = %e, "Media tool is not available"),
    }
}
