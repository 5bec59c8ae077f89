//! HTTP error response conversion
//!
//! Handlers return `Result<Response, HttpAppError>`. Domain errors (`AppError`,
//! `TransformError`, `ValidationError`, multipart failures) convert into `HttpAppError`
//! and render as `{ "message": ..., "code": ... }` with the variant's status.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use wavesmith_core::{AppError, ErrorMetadata, LogLevel};
use wavesmith_processing::{TransformError, ValidationError};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

/// Wrapper type for AppError to implement IntoResponse
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<std::io::Error> for HttpAppError {
    fn from(err: std::io::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(AppError::InvalidInput(err.to_string()))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        let app = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
        };
        HttpAppError(app)
    }
}

/// Map a transformation failure onto [`AppError`]. `failure_message` is what the client
/// sees when the tool itself fails; tool output stays in the logs.
pub fn transform_error(failure_message: &str, err: TransformError) -> HttpAppError {
    let app = match err {
        TransformError::Validation(e) => AppError::InvalidInput(e.to_string()),
        TransformError::ToolFailed { .. } => AppError::Processing {
            message: failure_message.to_string(),
            detail: err.to_string(),
        },
        TransformError::ToolUnavailable { .. } => AppError::ToolUnavailable(err.to_string()),
        TransformError::ToolTimeout { timeout } => AppError::ToolTimeout {
            seconds: timeout.as_secs(),
        },
        TransformError::MissingInput { .. } | TransformError::Io(_) => {
            AppError::Io(err.to_string())
        }
    };
    HttpAppError(app)
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), error_type = error_type, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = Json(ErrorResponse {
            message: app_error.client_message(),
            code: app_error.error_code().to_string(),
        });

        (status, body).into_response()
    }
}
