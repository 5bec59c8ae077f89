//! Audio operations module

pub mod options;
pub mod transformer;

pub use options::{EchoOptions, ReverbOptions, SpeedOptions, TrimOptions};
pub use transformer::{AudioOperation, AudioTransformer};
