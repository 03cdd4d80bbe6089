//! In-memory storage backend for testing.

use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use crate::{FileInfo, StorageBackend};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

#[derive(Default)]
struct Tree {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}
impl Tree {
    fn add_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }
}

/// In-memory storage backend for testing.
///
/// Files live in a map behind a [`RwLock`]; directories are tracked
/// explicitly and implied by every stored file's ancestors.
///
/// # Examples
///
/// ```
/// use arkiv_storage::backend::MockBackend;
/// use arkiv_storage::StorageBackend;
/// use std::path::Path;
///
/// let backend = MockBackend::with_files([
///     ("AAB 1/scan_0001.tif", b"tiff".to_vec()),
/// ]);
/// assert!(backend.exists(Path::new("AAB 1")).unwrap());
///
/// backend.write(Path::new("AAB 1/jpgs/scan_0001.jpg"), b"jpeg").unwrap();
/// assert_eq!(backend.stat(Path::new("AAB 1/jpgs/scan_0001.jpg")).unwrap().size, 4);
/// ```
pub struct MockBackend {
    name: String,
    tree: RwLock<Tree>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation. If test setup is wrong, then the
    /// test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut tree = Tree::default();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            tree.add_parents(&validated);
            tree.files.insert(validated, data.into());
        }
        Self {
            name: "mock".to_string(),
            tree: RwLock::new(tree),
        }
    }

    /// Add an (empty) directory.
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let Ok(validated) = validate_path(&path) else {
            panic!("MockBackend::with_dir: invalid path {}", path.display());
        };
        {
            let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
            tree.add_parents(&validated);
            tree.dirs.insert(validated);
        }
        self
    }

    /// Every stored file path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner).files.keys().cloned().collect()
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &[u8]); 0] = [];
        Self::with_files(files)
    }
}

impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, dir: Option<&Path>) -> Result<Vec<FileInfo>> {
        let dir = dir.map(validate_path).transpose()?;
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(dir) = &dir
            && !tree.is_dir(dir)
        {
            if tree.files.contains_key(dir) {
                exn::bail!(ErrorKind::NotADirectory(dir.clone()));
            }
            exn::bail!(ErrorKind::NotFound(dir.clone()));
        }
        let is_child = |path: &Path| match &dir {
            Some(dir) => path.parent() == Some(dir.as_path()),
            None => path.parent() == Some(Path::new("")),
        };
        let mut entries: Vec<FileInfo> = tree
            .dirs
            .iter()
            .filter(|path| is_child(path))
            .map(|path| FileInfo::directory(path.clone()))
            .chain(
                tree.files
                    .iter()
                    .filter(|(path, _)| is_child(path))
                    .map(|(path, data)| FileInfo::file(path.clone(), data.len() as u64)),
            )
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn stat(&self, path: &Path) -> Result<FileInfo> {
        let path = validate_path(path)?;
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(data) = tree.files.get(&path) {
            return Ok(FileInfo::file(path, data.len() as u64));
        }
        if tree.is_dir(&path) {
            return Ok(FileInfo::directory(path));
        }
        exn::bail!(ErrorKind::NotFound(path))
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tree.files.contains_key(&path) || tree.is_dir(&path))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        tree.files.get(&path).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        if tree.is_dir(&path) {
            exn::bail!(ErrorKind::BackendError(format!("cannot overwrite directory {}", path.display())));
        }
        tree.add_parents(&path);
        tree.files.insert(path, data.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        if tree.files.contains_key(&path) {
            exn::bail!(ErrorKind::NotADirectory(path));
        }
        tree.add_parents(&path);
        tree.dirs.insert(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read() {
        let backend = MockBackend::default();
        backend.write(Path::new("P/jpgs/a.jpg"), b"hello").unwrap();
        assert_eq!(backend.read(Path::new("P/jpgs/a.jpg")).unwrap(), b"hello");
        assert!(backend.stat(Path::new("P/jpgs")).unwrap().is_dir());
    }

    #[test]
    fn test_list_children_only() {
        let backend = MockBackend::with_files([
            ("top.txt", b"t".to_vec()),
            ("P1/a.tif", b"aa".to_vec()),
            ("P1/sub/b.tif", b"b".to_vec()),
        ])
        .with_dir("P2");
        let root: Vec<_> = backend.list(None).unwrap().into_iter().map(|e| e.path).collect();
        assert_eq!(root, vec![PathBuf::from("P1"), PathBuf::from("P2"), PathBuf::from("top.txt")]);
        let p1 = backend.list(Some(Path::new("P1"))).unwrap();
        assert_eq!(p1, vec![FileInfo::file("P1/a.tif", 2), FileInfo::directory("P1/sub")]);
        assert!(backend.list(Some(Path::new("P2"))).unwrap().is_empty());
    }

    #[test]
    fn test_list_errors() {
        let backend = MockBackend::with_files([("file.txt", b"x".to_vec())]);
        assert!(backend.list(Some(Path::new("missing"))).unwrap_err().is_not_found());
        let err = backend.list(Some(Path::new("file.txt"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotADirectory(_)));
    }

    #[test]
    fn test_walk_and_list() {
        let backend = MockBackend::with_files([
            ("P1/jpgs/1.jpg", vec![0u8; 10]),
            ("P1/jpgs/2.jpg", vec![0u8; 15]),
            ("P1/jpgs/nested/3.jpg", vec![0u8; 100]),
        ]);
        assert_eq!(backend.walk(Some(Path::new("P1"))).unwrap().len(), 3);
        assert_eq!(backend.list(Some(Path::new("P1/jpgs"))).unwrap().len(), 3);
    }

    #[test]
    #[should_panic(expected = "invalid path")]
    fn test_with_files_rejects_traversal() {
        let _ = MockBackend::with_files([("../escape", b"x".to_vec())]);
    }
}
