//! Find output folders that don't look finished.

use crate::SkipPolicy;
use crate::error::{ErrorKind, Result};
use crate::manifest;
use crate::skip::IncompleteReason;
use arkiv_storage::StorageBackend;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncompleteFolder {
    pub path: PathBuf,
    /// Aggregate size of the files directly inside the folder, manifest
    /// excluded.
    pub size: u64,
    pub reason: IncompleteReason,
}

/// Every directory named `folder`, anywhere in `storage`, that `policy` does
/// not consider complete. Sorted by path.
#[instrument(skip_all, fields(storage = storage.name(), folder = folder))]
pub fn audit(storage: &dyn StorageBackend, policy: &SkipPolicy, folder: &str) -> Result<Vec<IncompleteFolder>> {
    let mut incomplete = Vec::new();
    let mut stack: Vec<Option<PathBuf>> = vec![None];
    let mut checked = 0usize;
    while let Some(dir) = stack.pop() {
        let entries = match storage.list(dir.as_deref()) {
            Ok(entries) => entries,
            Err(err) if dir.is_none() => return Err(err).or_raise(|| ErrorKind::Root(storage.name().to_string())),
            Err(error) => {
                warn!(path = %dir_display(dir.as_deref()), ?error, "Unable to list folder");
                continue;
            },
        };
        for entry in entries.into_iter().filter(|e| e.is_dir()) {
            if entry.name() == Some(folder) {
                checked += 1;
                if let Some(reason) = policy.assess(storage, &entry.path)? {
                    let size = manifest::content_size(storage, &entry.path)?;
                    info!(path = %entry.path.display(), size, %reason, "Incomplete folder");
                    incomplete.push(IncompleteFolder { path: entry.path.clone(), size, reason });
                }
            }
            stack.push(Some(entry.path));
        }
    }
    incomplete.sort_by(|a, b| a.path.cmp(&b.path));
    info!(checked, incomplete = incomplete.len(), "Audit finished");
    Ok(incomplete)
}

fn dir_display(dir: Option<&Path>) -> std::path::Display<'_> {
    dir.unwrap_or(Path::new(".")).display()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, ManifestEntry};
    use arkiv_storage::FileInfo;
    use arkiv_storage::backend::MockBackend;

    #[test]
    fn test_finds_incomplete_folders() {
        let storage = MockBackend::with_files([
            ("AAB 1/jpgs/0001.jpg", b"x".repeat(100)),
            ("AAB 2/jpgs/0001.jpg", b"x".repeat(5)),
            ("Box/AAB 3/jpgs/0001.jpg", b"x".repeat(10)),
            ("AAB 4/scans/0001.tif", b"x".repeat(100)),
        ])
        .with_dir("AAB 5/jpgs");

        let found = audit(&storage, &SkipPolicy::SizeThreshold { bytes: 20 }, "jpgs").unwrap();

        let paths: Vec<_> = found.iter().map(|f| (f.path.to_string_lossy().into_owned(), f.size)).collect();
        assert_eq!(
            paths,
            [("AAB 2/jpgs".to_string(), 5), ("AAB 5/jpgs".to_string(), 0), ("Box/AAB 3/jpgs".to_string(), 10)]
        );
    }

    #[test]
    fn test_manifest_policy() {
        let storage = MockBackend::with_files([("AAB 1/jpgs/0001.jpg", "jpeg"), ("AAB 2/jpgs/0001.jpg", "jpeg")]);
        let mut manifest = Manifest::default();
        manifest.record("0001.tif", ManifestEntry::new(&FileInfo::file("0001.tif", 9), "0001.jpg", b"jpeg"));
        manifest.save(&storage, Path::new("AAB 1/jpgs")).unwrap();

        let found = audit(&storage, &SkipPolicy::Manifest, "jpgs").unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, PathBuf::from("AAB 2/jpgs"));
        assert_eq!(found[0].reason, IncompleteReason::NoManifest);
    }
}
