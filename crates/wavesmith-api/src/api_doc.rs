//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;

/// Served at `/api/openapi.json` and rendered by RapiDoc under `/docs`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wavesmith API",
        version = "0.1.0",
        description = "Audio transformations over HTTP. Upload WAV files as multipart/form-data, receive the processed WAV."
    ),
    paths(
        handlers::transform::reverb,
        handlers::transform::echo,
        handlers::transform::change_speed_and_pitch,
        handlers::transform::normalize_audio,
        handlers::transform::trim_audio,
        handlers::transform::merge_audio_files,
    ),
    components(schemas(error::ErrorResponse)),
    tags(
        (name = "audio", description = "Audio effects, editing, and merging")
    )
)]
pub struct ApiDoc;
