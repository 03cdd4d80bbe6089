//! Completion manifest of an output folder.
//!
//! After a unit's conversion loop finishes, `.arkiv-manifest.json` is written
//! into its output folder, recording for every converted source what it was
//! converted into:
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "scan_0001.tif": {
//!       "source_size": 48213344,
//!       "output": "scan_0001.jpg",
//!       "output_hash": "a3f1...",
//!       "converted_at": "2026-10-19T09:12:44Z"
//!     }
//!   }
//! }
//! ```
//!
//! A folder counts as done when every current source is recorded with its
//! current size and the recorded output still exists. Sources that were
//! added, changed, or failed last time are converted again.

use crate::error::{ErrorKind, Result};
use arkiv_storage::{FileInfo, StorageBackend};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

/// File name of the manifest inside an output folder.
pub const MANIFEST_FILE: &str = ".arkiv-manifest.json";
const VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    /// Keyed by source file name.
    pub entries: BTreeMap<String, ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub source_size: u64,
    /// Output file name, relative to the output folder.
    pub output: String,
    /// BLAKE3 hash of the output file, hex encoded.
    pub output_hash: String,
    /// RFC 3339 timestamp.
    pub converted_at: String,
}
impl ManifestEntry {
    /// Describe a freshly written output, stamped with the current time.
    pub fn new(source: &FileInfo, output: impl Into<String>, data: &[u8]) -> Self {
        Self {
            source_size: source.size,
            output: output.into(),
            output_hash: blake3::hash(data).to_hex().to_string(),
            converted_at: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        }
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self { version: VERSION, entries: BTreeMap::new() }
    }
}

impl Manifest {
    pub fn path(folder: &Path) -> PathBuf {
        folder.join(MANIFEST_FILE)
    }

    /// Load the manifest of an output folder.
    ///
    /// A missing manifest is `None`. So is one that can't be parsed; it is
    /// logged and will be overwritten by the next run.
    pub fn load(storage: &dyn StorageBackend, folder: &Path) -> Result<Option<Self>> {
        let path = Self::path(folder);
        if !storage.exists(&path).or_raise(|| ErrorKind::Storage(path.clone()))? {
            return Ok(None);
        }
        let data = storage.read(&path).or_raise(|| ErrorKind::Storage(path.clone()))?;
        match serde_json::from_slice::<Self>(&data) {
            Ok(manifest) => Ok(Some(manifest)),
            Err(error) => {
                warn!(path = %path.display(), %error, "Ignoring unreadable manifest");
                Ok(None)
            },
        }
    }

    pub fn save(&self, storage: &dyn StorageBackend, folder: &Path) -> Result<()> {
        let path = Self::path(folder);
        let data = serde_json::to_vec_pretty(self).or_raise(|| ErrorKind::Manifest(folder.to_path_buf()))?;
        storage.write(&path, &data).or_raise(|| ErrorKind::Manifest(folder.to_path_buf()))?;
        debug!(path = %path.display(), entries = self.entries.len(), "Wrote manifest");
        Ok(())
    }

    pub fn record(&mut self, source: impl Into<String>, entry: ManifestEntry) {
        self.entries.insert(source.into(), entry);
    }

    /// Sources that are not recorded, were recorded with another size, or
    /// whose recorded output is missing from `outputs`.
    pub fn pending<'a>(&self, sources: &'a [FileInfo], outputs: &BTreeSet<String>) -> Vec<&'a FileInfo> {
        sources.iter().filter(|source| !self.is_done(source, outputs)).collect()
    }

    /// Every source is recorded and its output exists.
    pub fn is_complete(&self, sources: &[FileInfo], outputs: &BTreeSet<String>) -> bool {
        sources.iter().all(|source| self.is_done(source, outputs))
    }

    /// Recorded outputs that are not in `outputs`.
    pub fn missing_outputs<'a>(&'a self, outputs: &BTreeSet<String>) -> Vec<&'a str> {
        self.entries.values().map(|e| e.output.as_str()).filter(|o| !outputs.contains(*o)).collect()
    }

    fn is_done(&self, source: &FileInfo, outputs: &BTreeSet<String>) -> bool {
        source
            .name()
            .and_then(|name| self.entries.get(name))
            .is_some_and(|entry| entry.source_size == source.size && outputs.contains(&entry.output))
    }
}

/// Aggregate size of the files directly inside an output folder, not counting
/// the manifest itself. A missing folder is empty.
pub(crate) fn content_size(storage: &dyn StorageBackend, folder: &Path) -> Result<u64> {
    match storage.list(Some(folder)) {
        Ok(entries) => {
            Ok(entries.iter().filter(|e| e.is_file() && e.name() != Some(MANIFEST_FILE)).map(|e| e.size).sum())
        },
        Err(e) if e.is_not_found() => Ok(0),
        Err(e) => Err(e).or_raise(|| ErrorKind::Storage(folder.to_path_buf())),
    }
}

/// Names of the files directly inside an output folder. A missing folder has
/// none.
pub(crate) fn file_names(storage: &dyn StorageBackend, folder: &Path) -> Result<BTreeSet<String>> {
    match storage.list(Some(folder)) {
        Ok(entries) => Ok(entries.iter().filter(|e| e.is_file()).filter_map(|e| e.name().map(str::to_string)).collect()),
        Err(e) if e.is_not_found() => Ok(BTreeSet::new()),
        Err(e) => Err(e).or_raise(|| ErrorKind::Storage(folder.to_path_buf())),
    }
}
