//! Audio transformation endpoints.
//!
//! Each endpoint takes a `multipart/form-data` body with one or more `audioFile` parts and
//! optional text parameters, and answers with the processed WAV as an attachment.

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::run_transform;
use crate::state::AppState;
use crate::utils::upload::{read_audio_form, AudioForm};
use axum::{
    extract::{Multipart, State},
    response::Response,
};
use bytes::Bytes;
use std::sync::Arc;
use wavesmith_core::AppError;
use wavesmith_processing::{
    AudioOperation, EchoOptions, ReverbOptions, SpeedOptions, TrimOptions,
};

fn single_upload(form: &AudioForm) -> Result<Vec<Bytes>, AppError> {
    Ok(vec![form.single_file()?.data.clone()])
}

#[utoipa::path(
    post,
    path = "/reverb",
    tag = "audio",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "`audioFile`: WAV file. `reverbOptions` (optional): JSON object of filters, e.g. {\"aecho\": {\"in_gain\": 0.5, \"out_gain\": 0.5, \"delay\": 500, \"decay\": 0.8}}"
    ),
    responses(
        (status = 200, description = "Processed audio", content_type = "audio/wav"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Error applying reverb", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "reverb"))]
pub async fn reverb(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let form = read_audio_form(multipart).await?;
    let uploads = single_upload(&form)?;

    let options = match form.text("reverbOptions") {
        Some(raw) => ReverbOptions::from_json(raw)?,
        None => ReverbOptions::default(),
    };

    run_transform(&state, AudioOperation::Reverb(options), uploads).await
}

#[utoipa::path(
    post,
    path = "/echo",
    tag = "audio",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "`audioFile`: WAV file. `echoPercentage` (optional, 0-100, default 50)"
    ),
    responses(
        (status = 200, description = "Processed audio", content_type = "audio/wav"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Error applying echo", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "echo"))]
pub async fn echo(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let form = read_audio_form(multipart).await?;
    let uploads = single_upload(&form)?;

    let mut options = EchoOptions::default();
    if let Some(percentage) = form.number("echoPercentage")? {
        options.percentage = percentage;
    }

    run_transform(&state, AudioOperation::Echo(options), uploads).await
}

#[utoipa::path(
    post,
    path = "/change-speed-and-pitch",
    tag = "audio",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "`audioFile`: WAV file. `speedFactor` (optional, > 0, default 1.5)"
    ),
    responses(
        (status = 200, description = "Processed audio", content_type = "audio/wav"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Error changing speed and pitch", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "change_speed_and_pitch"))]
pub async fn change_speed_and_pitch(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let form = read_audio_form(multipart).await?;
    let uploads = single_upload(&form)?;

    let mut options = SpeedOptions::default();
    if let Some(factor) = form.number("speedFactor")? {
        options.factor = factor;
    }

    run_transform(&state, AudioOperation::SpeedPitch(options), uploads).await
}

#[utoipa::path(
    post,
    path = "/normalize-audio",
    tag = "audio",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "`audioFile`: WAV file"
    ),
    responses(
        (status = 200, description = "Processed audio", content_type = "audio/wav"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Error normalizing audio", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "normalize"))]
pub async fn normalize_audio(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let form = read_audio_form(multipart).await?;
    let uploads = single_upload(&form)?;

    run_transform(&state, AudioOperation::Normalize, uploads).await
}

#[utoipa::path(
    post,
    path = "/trim-audio",
    tag = "audio",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "`audioFile`: WAV file. `startTime` (optional, seconds, default 0). `endTime` (optional, seconds, default 10, must exceed startTime)"
    ),
    responses(
        (status = 200, description = "Processed audio", content_type = "audio/wav"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Error trimming audio", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "trim"))]
pub async fn trim_audio(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let form = read_audio_form(multipart).await?;
    let uploads = single_upload(&form)?;

    let mut options = TrimOptions::default();
    if let Some(start) = form.number("startTime")? {
        options.start = start;
    }
    if let Some(end) = form.number("endTime")? {
        options.end = end;
    }

    run_transform(&state, AudioOperation::Trim(options), uploads).await
}

#[utoipa::path(
    post,
    path = "/merge-audio-files",
    tag = "audio",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "Two or more `audioFile` parts, concatenated in upload order"
    ),
    responses(
        (status = 200, description = "Merged audio", content_type = "audio/wav"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Error merging audio", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "merge"))]
pub async fn merge_audio_files(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let form = read_audio_form(multipart).await?;
    let uploads: Vec<Bytes> = form
        .at_least_two()?
        .iter()
        .map(|file| file.data.clone())
        .collect();

    run_transform(&state, AudioOperation::Merge, uploads).await
}
