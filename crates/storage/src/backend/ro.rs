//! Read-only storage decorator.
//!
//! Source scans are never modified. Wrapping the source backend in
//! [`ReadOnlyBackend`] turns every mutating call into a logged no-op.

use std::path::Path;

use crate::{BackendHandle, FileInfo, StorageBackend, error::Result};

/// Read-only storage backend.
///
/// Wraps another backend and silently drops all write operations, logging an
/// [`info event`](tracing::Event).
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list(&self, dir: Option<&Path>) -> Result<Vec<FileInfo>> {
        self.inner.list(dir)
    }

    fn walk(&self, dir: Option<&Path>) -> Result<Vec<FileInfo>> {
        self.inner.walk(dir)
    }

    fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.inner.stat(path)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        tracing::info!(backend = self.name(), path = %path.display(), bytes = data.len(), "Skipping write to read-only storage");
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        tracing::info!(backend = self.name(), path = %path.display(), "Skipping directory creation in read-only storage");
        Ok(())
    }
}
