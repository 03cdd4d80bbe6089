//! Local filesystem storage backend.
//!
//! Entries are accessed below a configured root directory with plain
//! `std::fs` calls. Writes go through a temporary file in the target
//! directory and are renamed into place, so an interrupted run never leaves a
//! truncated file behind.

use crate::error::{ErrorKind, Result};
use crate::{FileInfo, StorageBackend, path::validate as validate_path};
use exn::ResultExt;
use std::fs::{self, Metadata};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use arkiv_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = LocalBackend::open("source", "/mnt/archive/AAB")?;
/// let output = LocalBackend::create("output", "/mnt/export/AAB")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
    /// Absolute root directory
    root: PathBuf,
}
impl LocalBackend {
    /// Open a backend on an existing directory.
    ///
    /// Relative roots are resolved against the current directory. Returns
    /// [`NotFound`](ErrorKind::NotFound) if the root does not exist and
    /// [`NotADirectory`](ErrorKind::NotADirectory) if it is not a directory.
    pub fn open(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = Self::absolute_root(root.as_ref())?;
        let metadata = fs::metadata(&root).map_err(|e| Self::map_io_error(e, &root))?;
        if !metadata.is_dir() {
            exn::bail!(ErrorKind::NotADirectory(root));
        }
        Ok(Self { name: name.into(), root })
    }

    /// Open a backend, creating the root directory if it is missing.
    pub fn create(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = Self::absolute_root(root.as_ref())?;
        if !root.exists() {
            tracing::debug!(root = %root.display(), "Creating storage root");
            fs::create_dir_all(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Self::open(name, root)
    }

    /// The absolute root directory of this backend.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute_root(root: &Path) -> Result<PathBuf> {
        if root.as_os_str().is_empty() {
            exn::bail!(ErrorKind::InvalidPath(root.to_path_buf()));
        }
        std::path::absolute(root).or_raise(|| ErrorKind::InvalidPath(root.to_path_buf()))
    }

    /// Get the absolute path for a relative storage path.
    fn absolute_path(&self, path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(self.root.join(validate_path(path)?)),
            None => Ok(self.root.clone()),
        }
    }

    /// Convert an absolute path back to a relative storage path.
    fn relative_path(&self, absolute: &Path) -> Result<PathBuf> {
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("path `{}` is not within root `{}`", absolute.display(), self.root.display()))
        })?;
        validate_path(relative)
    }

    fn info(relative: PathBuf, metadata: &Metadata) -> Option<FileInfo> {
        if metadata.is_dir() {
            Some(FileInfo::directory(relative))
        } else if metadata.is_file() {
            Some(FileInfo::file(relative, metadata.len()))
        } else {
            None
        }
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::NotADirectory => ErrorKind::NotADirectory(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, dir: Option<&Path>) -> Result<Vec<FileInfo>> {
        let absolute = self.absolute_path(dir)?;
        let display = dir.unwrap_or(Path::new("."));
        let metadata = fs::metadata(&absolute).map_err(|e| Self::map_io_error(e, display))?;
        if !metadata.is_dir() {
            exn::bail!(ErrorKind::NotADirectory(display.to_path_buf()));
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&absolute).map_err(|e| Self::map_io_error(e, display))? {
            let entry = entry.map_err(|e| Self::map_io_error(e, display))?;
            let path = entry.path();
            // Follow symlinks; silently drop what is most likely a broken one.
            let Ok(metadata) = fs::metadata(&path) else {
                tracing::debug!(path = %path.display(), "Skipping unreadable directory entry");
                continue;
            };
            if let Some(info) = Self::info(self.relative_path(&path)?, &metadata) {
                entries.push(info);
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn stat(&self, path: &Path) -> Result<FileInfo> {
        let relative = validate_path(path)?;
        let metadata = fs::metadata(self.root.join(&relative)).map_err(|e| Self::map_io_error(e, path))?;
        Self::info(relative, &metadata).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.to_path_buf())))
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        let absolute = self.absolute_path(Some(path))?;
        Ok(absolute.try_exists().map_err(ErrorKind::Io)?)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let absolute = self.absolute_path(Some(path))?;
        Ok(fs::read(&absolute).map_err(|e| Self::map_io_error(e, path))?)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let absolute = self.absolute_path(Some(path))?;
        let parent = absolute.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent).map_err(|e| Self::map_io_error(e, path))?;
        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| Self::map_io_error(e, path))?;
        tmp.write_all(data).map_err(|e| Self::map_io_error(e, path))?;
        tmp.persist(&absolute).map_err(|e| Self::map_io_error(e.error, path))?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let absolute = self.absolute_path(Some(path))?;
        Ok(fs::create_dir_all(&absolute).map_err(|e| Self::map_io_error(e, path))?)
    }
}
