//! Application state shared by all handlers.

use std::sync::Arc;
use wavesmith_core::Config;
use wavesmith_processing::{AudioTransformer, TempFileManager, ToolRunner};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub temp_files: TempFileManager,
    pub transformer: AudioTransformer,
}

impl AppState {
    /// Build state around an explicit tool runner (ffmpeg in production, a fake in tests).
    pub fn new(config: Config, runner: Arc<dyn ToolRunner>) -> Self {
        let temp_files = TempFileManager::new(config.temp_dir.clone());
        Self::with_temp_files(config, temp_files, runner)
    }

    pub fn with_temp_files(
        config: Config,
        temp_files: TempFileManager,
        runner: Arc<dyn ToolRunner>,
    ) -> Self {
        Self {
            config,
            temp_files,
            transformer: AudioTransformer::new(runner),
        }
    }
}
