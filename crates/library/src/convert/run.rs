use crate::convert::ConvertOptions;
use crate::convert::file::{convert_file, output_name};
use crate::error::{ErrorKind, Failure, Result};
use crate::skip::{Plan, SkipReason};
use crate::unit::{self, Found, Unit};
use arkiv_imaging::ImageCodec;
use arkiv_storage::StorageBackend;
use exn::ResultExt;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// What happened to one conversion unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnitOutcome {
    /// The skip policy considered the output folder done.
    Skipped(SkipReason),
    /// The folder had no qualifying files.
    Empty,
    /// The conversion loop ran. Failed files are listed in the report.
    Converted { converted: usize, failed: usize },
    /// The unit could not be processed at all (planning or bookkeeping
    /// failed).
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitReport {
    pub name: String,
    /// Source folder, relative to the source root.
    pub source: PathBuf,
    /// Output folder, relative to the output root. `None` for empty folders.
    pub output: Option<PathBuf>,
    pub outcome: UnitOutcome,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConvertReport {
    pub units: Vec<UnitReport>,
    /// Every file or folder that failed, in processing order.
    pub failures: Vec<Failure>,
}
impl ConvertReport {
    /// Total number of images written.
    pub fn converted(&self) -> usize {
        self.units
            .iter()
            .map(|u| match u.outcome {
                UnitOutcome::Converted { converted, .. } => converted,
                _ => 0,
            })
            .sum()
    }

    pub fn skipped(&self) -> usize {
        self.units.iter().filter(|u| matches!(u.outcome, UnitOutcome::Skipped(_))).count()
    }
}

/// Converts every unit found in `source` into the `output` tree.
///
/// Units are handled one at a time in name order. Per-file and per-folder
/// failures are logged and collected into the returned report; only an
/// unreadable source root or a template that can't be rendered aborts the
/// run.
#[instrument(skip_all, fields(source = source.name(), output = output.name()))]
pub fn convert(
    source: &dyn StorageBackend,
    output: &dyn StorageBackend,
    codec: &dyn ImageCodec,
    options: &ConvertOptions,
) -> Result<ConvertReport> {
    let mut report = ConvertReport::default();
    for found in unit::discover(source, &options.filter, &options.exclude)? {
        match found {
            Found::Unit(unit) => {
                let folder = options.layout.generate(&unit.name, &unit.protocol)?;
                let outcome = match convert_unit(source, output, codec, options, &unit, &folder, &mut report.failures) {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        warn!(path = %unit.folder.display(), error = ?err, "Unable to process folder");
                        report.failures.push(Failure::new(&unit.folder, &err));
                        UnitOutcome::Failed
                    },
                };
                report.units.push(UnitReport {
                    name: unit.name,
                    source: unit.folder,
                    output: Some(folder),
                    outcome,
                });
            },
            Found::Empty(path) => report.units.push(UnitReport {
                name: path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
                source: path,
                output: None,
                outcome: UnitOutcome::Empty,
            }),
            Found::Unreadable(path) => report.failures.push(Failure {
                reason: "folder could not be listed".to_string(),
                path,
            }),
        }
    }
    info!(
        converted = report.converted(),
        skipped = report.skipped(),
        failed = report.failures.len(),
        "Conversion finished"
    );
    Ok(report)
}

#[instrument(skip_all, fields(unit = %unit.folder.display()))]
fn convert_unit(
    source: &dyn StorageBackend,
    output: &dyn StorageBackend,
    codec: &dyn ImageCodec,
    options: &ConvertOptions,
    unit: &Unit,
    folder: &Path,
    failures: &mut Vec<Failure>,
) -> Result<UnitOutcome> {
    let (pending, mut manifest) = match options.policy.plan(output, folder, &unit.sources)? {
        Plan::Skip(reason) => {
            info!(output = %folder.display(), %reason, "Skipping converted folder");
            return Ok(UnitOutcome::Skipped(reason));
        },
        Plan::Convert { pending, manifest } => (pending, manifest),
    };
    info!(output = %folder.display(), pending = pending.len(), total = unit.sources.len(), "Converting folder");
    output.create_dir_all(folder).or_raise(|| ErrorKind::Storage(folder.to_path_buf()))?;

    let mut names = HashSet::new();
    let (mut converted, mut failed) = (0, 0);
    for file in pending {
        if let Some(name) = output_name(file)
            && !names.insert(name.clone())
        {
            warn!(path = %file.path.display(), output = %name, "Output name already used in this folder, overwriting");
        }
        match convert_file(source, output, codec, file, folder, &options.bounds, options.quality) {
            Ok(entry) => {
                // Non UTF-8 names never reach this point: they have no output name.
                if let Some(name) = file.name() {
                    manifest.record(name, entry);
                }
                converted += 1;
            },
            Err(err) => {
                warn!(path = %file.path.display(), error = ?err, "Unable to convert image");
                failures.push(Failure::new(&file.path, &err));
                failed += 1;
            },
        }
    }
    manifest.save(output, folder)?;
    Ok(UnitOutcome::Converted { converted, failed })
}
