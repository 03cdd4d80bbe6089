//! Flat resize: every qualifying image anywhere below the source root becomes
//! `<stem>.jpg` directly in the output root.

use crate::ExtensionFilter;
use crate::convert::{convert_file, output_name};
use crate::error::{ErrorKind, Failure, Result};
use arkiv_imaging::{ImageCodec, Quality, ResizeBounds};
use arkiv_storage::StorageBackend;
use exn::ResultExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Clone, Debug)]
pub struct ResizeOptions {
    pub filter: ExtensionFilter,
    pub bounds: ResizeBounds,
    pub quality: Quality,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResizeReport {
    pub converted: usize,
    pub failures: Vec<Failure>,
}

#[instrument(skip_all, fields(source = source.name(), output = output.name()))]
pub fn resize(
    source: &dyn StorageBackend,
    output: &dyn StorageBackend,
    codec: &dyn ImageCodec,
    options: &ResizeOptions,
) -> Result<ResizeReport> {
    let files = source.walk(None).or_raise(|| ErrorKind::Root(source.name().to_string()))?;
    let mut report = ResizeReport::default();
    let mut written: HashMap<String, PathBuf> = HashMap::new();
    for file in files.iter().filter(|f| options.filter.matches(f)) {
        if let Some(name) = output_name(file)
            && let Some(previous) = written.get(&name)
        {
            warn!(
                path = %file.path.display(),
                previous = %previous.display(),
                output = %name,
                "Output name collision, overwriting"
            );
        }
        match convert_file(source, output, codec, file, Path::new(""), &options.bounds, options.quality) {
            Ok(entry) => {
                written.insert(entry.output, file.path.clone());
                report.converted += 1;
            },
            Err(err) => {
                warn!(path = %file.path.display(), error = ?err, "Unable to convert image");
                report.failures.push(Failure::new(&file.path, &err));
            },
        }
    }
    info!(converted = report.converted, failed = report.failures.len(), "Resize finished");
    Ok(report)
}
