//! Storage models.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Whether a listed entry is a regular file or a directory.
///
/// Anything else (sockets, broken symlinks) is never listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// Entry metadata returned by storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Size in bytes (zero for directories)
    pub size: u64,
}
impl FileInfo {
    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        Self { path: path.into(), kind: EntryKind::File, size }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), kind: EntryKind::Directory, size: 0 }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Final path component, if it is valid UTF-8.
    pub fn name(&self) -> Option<&str> {
        self.path.file_name().and_then(OsStr::to_str)
    }

    /// File name without its final extension.
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(OsStr::to_str)
    }

    /// Lowercased extension without the leading dot.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.path)
    }
}

pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension().and_then(OsStr::to_str).map(str::to_lowercase)
}
