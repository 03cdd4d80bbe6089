//! One PDF per protocol folder of the output tree.
//!
//! Pages are the JPEGs below `<protocol>/<folder>` (recursively), in natural
//! file name order. An existing PDF is never touched, and nothing is written
//! unless the whole document rendered.

use crate::error::{ErrorKind, Failure, Result};
use crate::{ExtensionFilter, PathGenerator, natural};
use arkiv_render::{Page, PdfAssembler};
use arkiv_storage::{FileInfo, StorageBackend};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Debug)]
pub struct AssembleOptions {
    pub filter: ExtensionFilter,
    /// Folder inside each protocol that holds the pages.
    pub folder: String,
    /// PDF file name, relative to the protocol folder.
    pub naming: PathGenerator,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssembleOutcome {
    /// The PDF already exists.
    Skipped,
    /// No pages were found.
    Empty,
    /// Reading a page or rendering the document failed.
    Failed,
    Written { pages: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolReport {
    pub protocol: String,
    /// Target PDF, relative to the output root.
    pub target: PathBuf,
    pub outcome: AssembleOutcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssembleReport {
    pub protocols: Vec<ProtocolReport>,
    pub failures: Vec<Failure>,
}
impl AssembleReport {
    pub fn written(&self) -> usize {
        self.protocols.iter().filter(|p| matches!(p.outcome, AssembleOutcome::Written { .. })).count()
    }
}

/// Writes `<protocol>/<name>.pdf` for every protocol folder in `storage`.
#[instrument(skip_all, fields(storage = storage.name()))]
pub fn assemble(
    storage: &dyn StorageBackend,
    assembler: &dyn PdfAssembler,
    options: &AssembleOptions,
) -> Result<AssembleReport> {
    let root = storage.list(None).or_raise(|| ErrorKind::Root(storage.name().to_string()))?;
    let mut report = AssembleReport::default();
    for protocol in root.iter().filter(|e| e.is_dir()) {
        let Some(name) = protocol.name() else {
            warn!(path = %protocol.path.display(), "Skipping folder with a non UTF-8 name");
            continue;
        };
        let target = protocol.path.join(options.naming.generate(name, name)?);
        let outcome = match assemble_protocol(storage, assembler, options, protocol, name, &target) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(path = %protocol.path.display(), error = ?err, "Unable to create PDF");
                report.failures.push(Failure::new(&protocol.path, &err));
                AssembleOutcome::Failed
            },
        };
        report.protocols.push(ProtocolReport { protocol: name.to_string(), target, outcome });
    }
    info!(written = report.written(), failed = report.failures.len(), "PDF assembly finished");
    Ok(report)
}

#[instrument(skip_all, fields(protocol = name))]
fn assemble_protocol(
    storage: &dyn StorageBackend,
    assembler: &dyn PdfAssembler,
    options: &AssembleOptions,
    protocol: &FileInfo,
    name: &str,
    target: &Path,
) -> Result<AssembleOutcome> {
    if storage.exists(target).or_raise(|| ErrorKind::Storage(target.to_path_buf()))? {
        info!(target = %target.display(), "PDF already exists");
        return Ok(AssembleOutcome::Skipped);
    }
    let pages = collect_pages(storage, &protocol.path.join(&options.folder), &options.filter)?;
    if pages.is_empty() {
        warn!(path = %protocol.path.display(), "No pages found");
        return Ok(AssembleOutcome::Empty);
    }

    let mut loaded = Vec::with_capacity(pages.len());
    for page in &pages {
        let data = storage.read(&page.path).or_raise(|| ErrorKind::Storage(page.path.clone()))?;
        loaded.push(Page::new(page.path.to_string_lossy(), data));
    }
    let pdf = assembler.assemble(name, loaded).or_raise(|| ErrorKind::Assemble(protocol.path.clone()))?;
    storage.write(target, &pdf).or_raise(|| ErrorKind::Storage(target.to_path_buf()))?;
    info!(target = %target.display(), pages = pages.len(), "Wrote PDF");
    Ok(AssembleOutcome::Written { pages: pages.len() })
}

/// Qualifying files below `folder`, ordered naturally by file name with the
/// full relative path as tie-break. A missing folder has no pages.
fn collect_pages(storage: &dyn StorageBackend, folder: &Path, filter: &ExtensionFilter) -> Result<Vec<FileInfo>> {
    let files = match storage.walk(Some(folder)) {
        Ok(files) => files,
        Err(e) if e.is_not_found() => return Ok(Vec::new()),
        Err(e) => return Err(e).or_raise(|| ErrorKind::Storage(folder.to_path_buf())),
    };
    let mut pages: Vec<FileInfo> = files.into_iter().filter(|f| filter.matches(f)).collect();
    pages.sort_by(|a, b| {
        natural::compare(a.name().unwrap_or_default(), b.name().unwrap_or_default()).then_with(|| a.path.cmp(&b.path))
    });
    Ok(pages)
}
