//! Wavesmith processing library
//!
//! Temp-file lifecycle, operation parameters, and invocation of the external media tool.

pub mod audio;
pub mod temp_files;
pub mod tool;
pub mod validator;

pub use audio::{
    AudioOperation, AudioTransformer, EchoOptions, ReverbOptions, SpeedOptions, TrimOptions,
};
pub use temp_files::{
    DiskWriter, InputWriter, RequestFiles, TempFile, TempFileManager, TempRole,
};
pub use tool::{FfmpegRunner, ToolRunner, TransformError};
pub use validator::ValidationError;
