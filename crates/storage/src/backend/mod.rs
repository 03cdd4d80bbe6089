//! Storage backend trait and implementations.
//!
//! [`StorageBackend`] is the single seam between the batch operations and the
//! filesystem. The local backend does real I/O, the read-only decorator
//! protects source scans, and the in-memory mock (feature `mock`) lets the
//! batch logic be tested without touching disk.

mod local;
#[cfg(feature = "mock")]
mod mock;
mod ro;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use crate::models::FileInfo;
use std::path::{Path, PathBuf};

/// Unified interface for storage backends.
///
/// All operations are synchronous; a batch run is strictly sequential.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations enforce
/// this validation. `None` addresses the root itself where a directory is
/// expected.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use arkiv_storage::{StorageBackend, error::Result};
///
/// fn count_tiffs(backend: &dyn StorageBackend, protocol: &Path) -> Result<usize> {
///     Ok(backend
///         .list(Some(protocol))?
///         .into_iter()
///         .filter(|entry| entry.is_file() && entry.extension().as_deref() == Some("tif"))
///         .count())
/// }
/// ```
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// List the immediate children of a directory, sorted by path.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the
    /// directory does not exist and
    /// [`NotADirectory`](crate::error::ErrorKind::NotADirectory) if the path
    /// is a file.
    fn list(&self, dir: Option<&Path>) -> Result<Vec<FileInfo>>;

    /// Recursively list every file below a directory, sorted by path.
    ///
    /// Directories themselves are not yielded. The default implementation
    /// walks [`list()`](Self::list) depth-first.
    fn walk(&self, dir: Option<&Path>) -> Result<Vec<FileInfo>> {
        let mut files = Vec::new();
        let mut stack: Vec<Option<PathBuf>> = vec![dir.map(Path::to_path_buf)];
        while let Some(current) = stack.pop() {
            for entry in self.list(current.as_deref())? {
                if entry.is_dir() {
                    stack.push(Some(entry.path));
                } else {
                    files.push(entry);
                }
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Get entry metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if nothing
    /// exists at the path.
    fn stat(&self, path: &Path) -> Result<FileInfo>;

    /// Check if a file or directory exists.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write file contents.
    ///
    /// Creates a new file or replaces an existing one. Parent directories are
    /// created as needed.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Create a directory and all of its missing parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}
