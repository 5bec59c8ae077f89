//! Wavesmith API Library
//!
//! HTTP handlers, middleware, and application setup for the audio transformation service.

// Module declarations
mod api_doc;
mod handlers;
mod middleware;
mod services;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
