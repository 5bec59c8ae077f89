//! Test helpers: build AppState and router around a fake media tool.
//!
//! Run from workspace root: `cargo test -p wavesmith-api`. No ffmpeg binary is needed.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wavesmith_api::setup::routes;
use wavesmith_api::state::AppState;
use wavesmith_core::Config;
use wavesmith_processing::{
    DiskWriter, InputWriter, TempFileManager, ToolRunner, TransformError,
};

/// How the fake tool behaves on `run`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolBehavior {
    /// Write [`fixtures::OUTPUT_BYTES`] to the output path.
    Succeed,
    /// Write this many zero bytes to the output path.
    SucceedWithSize(usize),
    /// Exit with a failure status without writing anything.
    Fail,
    /// Report the binary as missing.
    Missing,
}

/// Records every argument list and emulates the tool's effect on disk.
pub struct FakeTool {
    behavior: ToolBehavior,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeTool {
    pub fn new(behavior: ToolBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Arguments of the single recorded invocation.
    pub fn only_call(&self) -> Vec<String> {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one tool invocation");
        calls.into_iter().next().unwrap()
    }

    fn missing() -> TransformError {
        TransformError::ToolUnavailable {
            program: "ffmpeg".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        }
    }
}

#[async_trait]
impl ToolRunner for FakeTool {
    async fn run(&self, args: &[String]) -> Result<(), TransformError> {
        self.calls.lock().unwrap().push(args.to_vec());

        match self.behavior {
            ToolBehavior::Succeed => {
                let output = args.last().expect("output path is the last argument");
                tokio::fs::write(output, fixtures::OUTPUT_BYTES).await?;
                Ok(())
            }
            ToolBehavior::SucceedWithSize(size) => {
                let output = args.last().expect("output path is the last argument");
                tokio::fs::write(output, vec![0u8; size]).await?;
                Ok(())
            }
            ToolBehavior::Fail => Err(TransformError::ToolFailed {
                status: Some(1),
                stderr: "Invalid data found when processing input".to_string(),
            }),
            ToolBehavior::Missing => Err(Self::missing()),
        }
    }

    async fn check_available(&self) -> Result<(), TransformError> {
        match self.behavior {
            ToolBehavior::Missing => Err(Self::missing()),
            _ => Ok(()),
        }
    }
}

/// Writes inputs to disk, except that the `fail_at`-th write (0-based) fails.
#[derive(Debug)]
pub struct FailingWriter {
    fail_at: usize,
    calls: AtomicUsize,
    written: Mutex<Vec<PathBuf>>,
}

impl FailingWriter {
    pub fn new(fail_at: usize) -> Self {
        Self {
            fail_at,
            calls: AtomicUsize::new(0),
            written: Mutex::new(Vec::new()),
        }
    }

    /// Paths that were successfully written.
    pub fn written(&self) -> Vec<PathBuf> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl InputWriter for FailingWriter {
    async fn write(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_at {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "No space left on device",
            ));
        }
        DiskWriter.write(path, data).await?;
        self.written.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Test application: server, fake tool, and the temp directory it writes into.
pub struct TestApp {
    pub server: TestServer,
    pub tool: Arc<FakeTool>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Files currently left in the temp directory.
    pub fn leftover_files(&self) -> Vec<PathBuf> {
        list_files(self.temp_dir.path())
    }

    /// Waits for cleanup scheduled in the background to finish.
    pub async fn wait_for_no_leftovers(&self) {
        wait_for_empty_dir(self.temp_dir.path()).await;
    }
}

pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .expect("temp dir readable")
        .map(|entry| entry.expect("dir entry").path())
        .collect()
}

/// Polls `dir` until it is empty, failing after two seconds.
pub async fn wait_for_empty_dir(dir: &Path) {
    for _ in 0..200 {
        if list_files(dir).is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("temp files left behind: {:?}", list_files(dir));
}

pub fn test_config(temp_dir: &Path) -> Config {
    Config {
        temp_dir: temp_dir.to_path_buf(),
        ..Config::default()
    }
}

/// Router wired to a fake tool and, optionally, a custom input writer.
pub fn build_router(
    config: &Config,
    tool: Arc<FakeTool>,
    writer: Option<Arc<dyn InputWriter>>,
) -> Router {
    let temp_files = match writer {
        Some(writer) => TempFileManager::with_writer(config.temp_dir.clone(), writer),
        None => TempFileManager::new(config.temp_dir.clone()),
    };
    let state = Arc::new(AppState::with_temp_files(config.clone(), temp_files, tool));
    routes::setup_routes(config, state).expect("Failed to build router")
}

pub fn setup_test_app(behavior: ToolBehavior) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    setup_test_app_with(test_config(temp_dir.path()), temp_dir, behavior)
}

pub fn setup_test_app_with(config: Config, temp_dir: TempDir, behavior: ToolBehavior) -> TestApp {
    let tool = Arc::new(FakeTool::new(behavior));
    let app = build_router(&config, tool.clone(), None);
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        tool,
        temp_dir,
    }
}

pub fn setup_test_app_with_writer(behavior: ToolBehavior, writer: Arc<dyn InputWriter>) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let tool = Arc::new(FakeTool::new(behavior));
    let app = build_router(&config, tool.clone(), Some(writer));
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        tool,
        temp_dir,
    }
}

/// Same as [`setup_test_app`], but requests go over a real TCP connection.
pub fn setup_http_test_app(behavior: ToolBehavior) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let tool = Arc::new(FakeTool::new(behavior));
    let app = build_router(&config, tool.clone(), None);
    let server = TestServer::builder()
        .http_transport()
        .build(app.into_make_service())
        .expect("Failed to create test server");

    TestApp {
        server,
        tool,
        temp_dir,
    }
}

/// Serve `app` on an ephemeral local port.
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });
    addr
}

/// Value following `flag` in a recorded argument list.
pub fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Every value following `-i`, in order.
pub fn input_args(args: &[String]) -> Vec<String> {
    args.iter()
        .enumerate()
        .filter(|(_, a)| a.as_str() == "-i")
        .filter_map(|(i, _)| args.get(i + 1).cloned())
        .collect()
}
