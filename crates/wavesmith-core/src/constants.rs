//! Constants shared across crates.

/// Extension given to every temp file (inputs are stored under it regardless of upload format).
pub const AUDIO_EXTENSION: &str = "wav";

/// Container format requested from the external tool for every operation.
pub const OUTPUT_FORMAT: &str = "wav";

/// MIME type sent with every transformed response.
pub const OUTPUT_CONTENT_TYPE: &str = "audio/wav";

/// Multipart field carrying uploaded audio.
pub const AUDIO_FIELD_NAME: &str = "audioFile";
