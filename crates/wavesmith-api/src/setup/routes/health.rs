//! Health check handlers.

use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

/// Liveness probe - process is running.
pub async fn liveness_check(_state: Arc<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - the media tool can be started and the temp directory exists.
pub async fn readiness_check(state: Arc<AppState>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let mut response = serde_json::json!({
        "status": "ready",
        "media_tool": "unknown",
        "temp_dir": "unknown"
    });
    let mut overall_ready = true;

    match tokio::time::timeout(TIMEOUT, state.transformer.runner().check_available()).await {
        Ok(Ok(())) => response["media_tool"] = serde_json::json!("ready"),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Media tool readiness check failed");
            response["media_tool"] = serde_json::json!(format!("not_ready: {}", e));
            overall_ready = false;
        }
        Err(_) => {
            tracing::error!("Media tool readiness check timed out");
            response["media_tool"] = serde_json::json!("timeout");
            overall_ready = false;
        }
    }

    match tokio::fs::metadata(state.temp_files.dir()).await {
        Ok(meta) if meta.is_dir() => response["temp_dir"] = serde_json::json!("ready"),
        Ok(_) => {
            response["temp_dir"] = serde_json::json!("not_ready: not a directory");
            overall_ready = false;
        }
        Err(e) => {
            tracing::error!(error = %e, "Temp directory readiness check failed");
            response["temp_dir"] = serde_json::json!(format!("not_ready: {}", e));
            overall_ready = false;
        }
    }

    let status_code = if overall_ready {
        StatusCode::OK
    } else {
        response["status"] = serde_json::json!("not_ready");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
