//! Copy finished output folders (`<protocol>/jpgs`) from one tree into
//! another. Copying is create-only: files already present in the target are
//! left alone.

use crate::error::{ErrorKind, Failure, Result};
use arkiv_storage::{FileInfo, StorageBackend};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Debug)]
pub struct CollectOptions {
    /// Folder inside each protocol to copy.
    pub folder: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectOutcome {
    /// The protocol has no such folder.
    Missing,
    Copied { copied: usize, existing: usize, failed: usize },
    /// The folder could not be listed.
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectEntry {
    pub protocol: String,
    pub outcome: CollectOutcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectReport {
    pub protocols: Vec<CollectEntry>,
    pub failures: Vec<Failure>,
}
impl CollectReport {
    pub fn copied(&self) -> usize {
        self.protocols
            .iter()
            .map(|p| match p.outcome {
                CollectOutcome::Copied { copied, .. } => copied,
                _ => 0,
            })
            .sum()
    }
}

#[instrument(skip_all, fields(source = source.name(), output = output.name()))]
pub fn collect(source: &dyn StorageBackend, output: &dyn StorageBackend, options: &CollectOptions) -> Result<CollectReport> {
    let root = source.list(None).or_raise(|| ErrorKind::Root(source.name().to_string()))?;
    let mut report = CollectReport::default();
    for protocol in root.iter().filter(|e| e.is_dir()) {
        let Some(name) = protocol.name() else {
            warn!(path = %protocol.path.display(), "Skipping folder with a non UTF-8 name");
            continue;
        };
        let folder = protocol.path.join(&options.folder);
        let outcome = match collect_folder(source, output, &folder, &mut report.failures) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(path = %folder.display(), error = ?err, "Unable to collect folder");
                report.failures.push(Failure::new(&folder, &err));
                CollectOutcome::Failed
            },
        };
        report.protocols.push(CollectEntry { protocol: name.to_string(), outcome });
    }
    info!(copied = report.copied(), failed = report.failures.len(), "Collect finished");
    Ok(report)
}

fn collect_folder(
    source: &dyn StorageBackend,
    output: &dyn StorageBackend,
    folder: &Path,
    failures: &mut Vec<Failure>,
) -> Result<CollectOutcome> {
    let files = match source.walk(Some(folder)) {
        Ok(files) => files,
        Err(e) if e.is_not_found() => {
            info!(path = %folder.display(), "No jpgs folder");
            return Ok(CollectOutcome::Missing);
        },
        Err(e) => return Err(e).or_raise(|| ErrorKind::Storage(folder.to_path_buf())),
    };
    let (mut copied, mut existing, mut failed) = (0, 0, 0);
    for file in &files {
        match copy_file(source, output, file) {
            Ok(true) => copied += 1,
            Ok(false) => existing += 1,
            Err(err) => {
                warn!(path = %file.path.display(), error = ?err, "Unable to copy file");
                failures.push(Failure::new(&file.path, &err));
                failed += 1;
            },
        }
    }
    Ok(CollectOutcome::Copied { copied, existing, failed })
}

/// Copy one file to the same relative path. `false` when the target already
/// exists.
fn copy_file(source: &dyn StorageBackend, output: &dyn StorageBackend, file: &FileInfo) -> Result<bool> {
    let target: PathBuf = file.path.clone();
    if output.exists(&target).or_raise(|| ErrorKind::Storage(target.clone()))? {
        debug!(path = %target.display(), "Already present");
        return Ok(false);
    }
    let data = source.read(&file.path).or_raise(|| ErrorKind::Storage(file.path.clone()))?;
    output.write(&target, &data).or_raise(|| ErrorKind::Storage(target.clone()))?;
    Ok(true)
}
