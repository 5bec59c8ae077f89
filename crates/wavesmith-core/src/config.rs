//! Configuration module
//!
//! Runtime settings are loaded once at startup and then passed explicitly to the
//! application constructor, so tests can build a [`Config`] by hand.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const SERVER_PORT: u16 = 4000;
const FFMPEG_PATH: &str = "ffmpeg";
const TEMP_DIR: &str = ".";
const TOOL_TIMEOUT_SECS: u64 = 300;
const MAX_UPLOAD_SIZE_MB: usize = 100;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Path (or name on `PATH`) of the external media tool.
    pub ffmpeg_path: String,
    /// Directory holding per-request temp files.
    pub temp_dir: PathBuf,
    /// Wall-clock limit per tool invocation; `None` waits indefinitely.
    pub tool_timeout: Option<Duration>,
    pub max_upload_size_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            ffmpeg_path: FFMPEG_PATH.to_string(),
            temp_dir: PathBuf::from(TEMP_DIR),
            tool_timeout: Some(Duration::from_secs(TOOL_TIMEOUT_SECS)),
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
        }
    }
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let tool_timeout_secs = env::var("TOOL_TIMEOUT_SECS")
            .unwrap_or_else(|_| TOOL_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .unwrap_or(TOOL_TIMEOUT_SECS);

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let max_upload_size_bytes = upload_limit_bytes(max_upload_size_mb)?;

        Ok(Self {
            server_port,
            environment,
            cors_origins,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| FFMPEG_PATH.to_string()),
            temp_dir: env::var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(TEMP_DIR)),
            tool_timeout: (tool_timeout_secs > 0).then(|| Duration::from_secs(tool_timeout_secs)),
            max_upload_size_bytes,
        })
    }
}

fn upload_limit_bytes(megabytes: usize) -> Result<usize, anyhow::Error> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large: {}", megabytes))
}
