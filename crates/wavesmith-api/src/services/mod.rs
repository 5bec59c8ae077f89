//! Request pipeline: persist uploads, run the operation, stream the result

pub mod audio_transform;
pub mod stream;

pub use audio_transform::run_transform;
