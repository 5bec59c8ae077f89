//! Request-scoped temp files.
//!
//! Every request gets a [`RequestFiles`] scope from the shared [`TempFileManager`]. Paths are
//! registered with the scope *before* anything is written to them, and the scope removes all
//! of them exactly once: through [`RequestFiles::cleanup`] on the normal path, or from `Drop`
//! when the scope is abandoned (cancelled future, client disconnect, a response body that is
//! dropped once its last byte is written). Inside a tokio runtime `Drop` hands the removal to
//! the runtime instead of deleting on the worker thread.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::join_all;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;
use wavesmith_core::constants::AUDIO_EXTENSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempRole {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempFile {
    pub path: PathBuf,
    pub role: TempRole,
}

/// Writes uploaded bytes to a reserved path.
#[async_trait]
pub trait InputWriter: Send + Sync + fmt::Debug {
    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;
}

/// [`InputWriter`] for the local filesystem. Refuses to overwrite an existing file.
#[derive(Debug, Default)]
pub struct DiskWriter;

#[async_trait]
impl InputWriter for DiskWriter {
    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Allocates collision-free paths inside one directory.
#[derive(Debug, Clone)]
pub struct TempFileManager {
    dir: PathBuf,
    writer: Arc<dyn InputWriter>,
}

impl TempFileManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_writer(dir, Arc::new(DiskWriter))
    }

    pub fn with_writer(dir: impl Into<PathBuf>, writer: Arc<dyn InputWriter>) -> Self {
        Self {
            dir: dir.into(),
            writer,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A fresh `<uuid>.wav` path. Nothing is created on disk.
    pub fn allocate(&self) -> PathBuf {
        self.dir
            .join(format!("{}.{}", Uuid::new_v4(), AUDIO_EXTENSION))
    }

    pub fn scope(&self) -> RequestFiles {
        RequestFiles {
            manager: self.clone(),
            files: Vec::new(),
        }
    }

    /// Write `data` to a path that must not exist yet.
    pub async fn persist(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.writer.write(path, data).await
    }

    /// Best-effort removal. Never fails: errors are logged so they cannot mask the
    /// failure that led here.
    pub async fn cleanup<'a>(&self, paths: impl IntoIterator<Item = &'a Path>) {
        for path in paths {
            remove_quietly(path).await;
        }
    }
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed temp file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Temp file was never created");
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

fn remove_quietly_blocking(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed temp file on drop"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

/// Temp files owned by a single request.
#[derive(Debug)]
pub struct RequestFiles {
    manager: TempFileManager,
    files: Vec<TempFile>,
}

impl RequestFiles {
    /// Reserve a path and track it for cleanup.
    pub fn allocate(&mut self, role: TempRole) -> PathBuf {
        let path = self.manager.allocate();
        self.files.push(TempFile {
            path: path.clone(),
            role,
        });
        path
    }

    pub fn files(&self) -> &[TempFile] {
        &self.files
    }

    pub fn inputs(&self) -> Vec<PathBuf> {
        self.paths_with_role(TempRole::Input)
    }

    pub fn outputs(&self) -> Vec<PathBuf> {
        self.paths_with_role(TempRole::Output)
    }

    fn paths_with_role(&self, role: TempRole) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|f| f.role == role)
            .map(|f| f.path.clone())
            .collect()
    }

    /// Persist every buffer as a tracked input, in order.
    ///
    /// All paths are registered first and all writes are awaited, successful or not, so no
    /// write is still in flight when the caller cleans up after a failure.
    pub async fn write_inputs(&mut self, buffers: Vec<Bytes>) -> io::Result<Vec<PathBuf>> {
        let paths: Vec<PathBuf> = buffers
            .iter()
            .map(|_| self.allocate(TempRole::Input))
            .collect();

        let manager = &self.manager;
        let results = join_all(
            paths
                .iter()
                .zip(buffers.iter())
                .map(|(path, data)| manager.persist(path, data)),
        )
        .await;

        for (path, result) in paths.iter().zip(results) {
            if let Err(e) = result {
                tracing::error!(path = %path.display(), error = %e, "Failed to write input file");
                return Err(e);
            }
        }

        Ok(paths)
    }

    /// Remove every tracked file. Consumes the scope so it runs once.
    pub async fn cleanup(mut self) {
        while let Some(path) = self.files.last().map(|f| f.path.clone()) {
            remove_quietly(&path).await;
            self.files.pop();
        }
    }
}

impl Drop for RequestFiles {
    fn drop(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let paths: Vec<PathBuf> = self.files.drain(..).map(|f| f.path).collect();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    for path in paths.iter().rev() {
                        remove_quietly(path).await;
                    }
                });
            }
            Err(_) => {
                for path in paths.iter().rev() {
                    remove_quietly_blocking(path);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn dir_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_allocate_is_unique_and_uses_wav_extension() {
        let manager = TempFileManager::new("/tmp/wavesmith");
        let a = manager.allocate();
        let b = manager.allocate();
        assert_ne!(a, b);
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("wav"));
        assert!(a.starts_with("/tmp/wavesmith"));
    }

    #[tokio::test]
    async fn test_persist_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TempFileManager::new(dir.path());
        let path = manager.allocate();

        manager.persist(&path, b"first").await.unwrap();
        let err = manager.persist(&path, b"second").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_cleanup_removes_inputs_and_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TempFileManager::new(dir.path());
        let mut files = manager.scope();

        let inputs = files
            .write_inputs(vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")])
            .await
            .unwrap();
        let output = files.allocate(TempRole::Output);

        assert_eq!(inputs, files.inputs());
        assert_eq!(vec![output.clone()], files.outputs());
        assert_eq!(dir_entries(dir.path()), 2);

        files.cleanup().await;
        assert_eq!(dir_entries(dir.path()), 0);
    }

    /// Writes to disk except for the `fail_at`-th call (0-based).
    #[derive(Debug)]
    struct FailNthWriter {
        fail_at: usize,
        calls: AtomicUsize,
        written: Mutex<Vec<PathBuf>>,
    }

    impl FailNthWriter {
        fn new(fail_at: usize) -> Self {
            Self {
                fail_at,
                calls: AtomicUsize::new(0),
                written: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InputWriter for FailNthWriter {
        async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_at {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            DiskWriter.write(path, data).await?;
            self.written.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    async fn wait_until_empty(dir: &Path) {
        for _ in 0..100 {
            if dir_entries(dir) == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{} still has {} entries", dir.display(), dir_entries(dir));
    }

    #[tokio::test]
    async fn test_failed_input_write_keeps_all_paths_tracked() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let manager = TempFileManager::new(&missing);
        let mut files = manager.scope();

        let result = files
            .write_inputs(vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")])
            .await;
        assert!(result.is_err());
        assert_eq!(files.inputs().len(), 2);

        files.cleanup().await;
    }

    #[tokio::test]
    async fn test_one_failed_write_removes_written_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Arc::new(FailNthWriter::new(1));
        let manager = TempFileManager::with_writer(dir.path(), writer.clone());
        let mut files = manager.scope();

        let result = files
            .write_inputs(vec![
                Bytes::from_static(b"a"),
                Bytes::from_static(b"b"),
                Bytes::from_static(b"c"),
            ])
            .await;
        assert_eq!(result.unwrap_err().to_string(), "disk full");

        let written = writer.written.lock().unwrap().clone();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.exists()));
        assert_eq!(files.inputs().len(), 3);

        files.cleanup().await;
        assert!(written.iter().all(|p| !p.exists()));
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_drop_inside_runtime_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TempFileManager::new(dir.path());
        {
            let mut files = manager.scope();
            files
                .write_inputs(vec![Bytes::from_static(b"abc")])
                .await
                .unwrap();
            files.allocate(TempRole::Output);
            assert_eq!(dir_entries(dir.path()), 1);
        }
        wait_until_empty(dir.path()).await;
    }

    #[test]
    fn test_drop_outside_runtime_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TempFileManager::new(dir.path());
        let path = {
            let mut files = manager.scope();
            let path = files.allocate(TempRole::Input);
            std::fs::write(&path, b"abc").unwrap();
            path
        };
        assert!(!path.exists());
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_manager_cleanup_ignores_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TempFileManager::new(dir.path());
        let present = manager.allocate();
        manager.persist(&present, b"x").await.unwrap();
        let absent = manager.allocate();

        manager
            .cleanup([present.as_path(), absent.as_path()])
            .await;
        assert!(!present.exists());
    }
}
