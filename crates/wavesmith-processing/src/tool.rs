//! External media tool invocation.

use crate::validator::ValidationError;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Lines of tool stderr kept for diagnostics.
const STDERR_TAIL_LINES: usize = 20;

const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("media tool exited with {}", describe_status(.status))]
    ToolFailed { status: Option<i32>, stderr: String },

    #[error("media tool '{program}' could not be started: {source}")]
    ToolUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("media tool did not finish within {timeout:?}")]
    ToolTimeout { timeout: Duration },

    #[error("input file {path} is not readable: {source}")]
    MissingInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Runs the external tool with a prepared argument list.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, args: &[String]) -> Result<(), TransformError>;

    /// Cheap probe used by readiness checks and startup validation.
    async fn check_available(&self) -> Result<(), TransformError>;
}

/// [`ToolRunner`] backed by an ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    ffmpeg_path: String,
    timeout: Option<Duration>,
}

impl FfmpegRunner {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.ffmpeg_path);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ToolRunner for FfmpegRunner {
    #[tracing::instrument(skip(self, args), fields(program = %self.ffmpeg_path))]
    async fn run(&self, args: &[String]) -> Result<(), TransformError> {
        execute(self.command(args), &self.ffmpeg_path, self.timeout).await
    }

    async fn check_available(&self) -> Result<(), TransformError> {
        execute(
            self.command(&["-version".to_string()]),
            &self.ffmpeg_path,
            Some(AVAILABILITY_TIMEOUT),
        )
        .await
    }
}

/// Spawn `command`, wait for it (bounded by `timeout`), and map the outcome.
///
/// On timeout the child is dropped, and `kill_on_drop` terminates it.
pub(crate) async fn execute(
    mut command: Command,
    program: &str,
    timeout: Option<Duration>,
) -> Result<(), TransformError> {
    let child = command.spawn().map_err(|source| match source.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            tracing::error!(
                program = %program,
                error = %source,
                "Media tool is not installed or not executable; check FFMPEG_PATH"
            );
            TransformError::ToolUnavailable {
                program: program.to_string(),
                source,
            }
        }
        _ => TransformError::Io(source),
    })?;

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| {
                tracing::error!(program = %program, timeout = ?limit, "Media tool timed out, killing process");
                TransformError::ToolTimeout { timeout: limit }
            })??,
        None => child.wait_with_output().await?,
    };

    if !output.status.success() {
        let stderr = stderr_tail(&output.stderr);
        tracing::error!(
            program = %program,
            status = ?output.status.code(),
            stderr = %stderr,
            "Media tool failed"
        );
        return Err(TransformError::ToolFailed {
            status: output.status.code(),
            stderr,
        });
    }

    Ok(())
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
