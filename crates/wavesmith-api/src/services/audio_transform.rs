//! Per-request transform pipeline.
//!
//! Every exit path removes the request's temp files: explicitly before returning an error,
//! or after the last byte has been streamed (see [`super::stream`]).

use super::stream::stream_output;
use crate::error::{transform_error, HttpAppError};
use crate::state::AppState;
use axum::response::Response;
use bytes::Bytes;
use wavesmith_core::AppError;
use wavesmith_processing::{AudioOperation, TempRole};

#[tracing::instrument(skip(state, operation, uploads), fields(operation = operation.name(), files = uploads.len()))]
pub async fn run_transform(
    state: &AppState,
    operation: AudioOperation,
    uploads: Vec<Bytes>,
) -> Result<Response, HttpAppError> {
    // Reject bad requests before anything touches the disk.
    operation.check_input_count(uploads.len())?;
    operation.validate()?;

    let mut files = state.temp_files.scope();

    let inputs = match files.write_inputs(uploads).await {
        Ok(paths) => paths,
        Err(e) => {
            files.cleanup().await;
            return Err(AppError::Io(format!("Failed to store upload: {}", e)).into());
        }
    };

    let output = files.allocate(TempRole::Output);

    if let Err(e) = state.transformer.apply(&operation, &inputs, &output).await {
        files.cleanup().await;
        return Err(transform_error(operation.failure_message(), e));
    }

    stream_output(files, output).await
}
