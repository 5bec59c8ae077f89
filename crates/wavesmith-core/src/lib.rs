//! Wavesmith Core Library
//!
//! This crate provides configuration, error types, and constants shared by the
//! processing and API crates.

pub mod config;
pub mod constants;
pub mod error;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
