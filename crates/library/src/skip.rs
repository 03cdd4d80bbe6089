use crate::error::Result;
use crate::manifest::{self, Manifest};
use arkiv_storage::{FileInfo, StorageBackend};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Aggregate size, in bytes, above which an output folder used to be
/// considered converted.
pub const DEFAULT_SIZE_THRESHOLD: u64 = 20;

const fn default_threshold() -> u64 {
    DEFAULT_SIZE_THRESHOLD
}

/// Decides whether an output folder still needs work.
///
/// ```toml
/// [skip]
/// policy = "size_threshold"
/// bytes = 20
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SkipPolicy {
    /// Skip when the folder's manifest accounts for every current source,
    /// otherwise convert only the sources it doesn't.
    #[default]
    Manifest,
    /// Skip when the files directly inside the folder, manifest excluded,
    /// add up to more than `bytes`; otherwise convert everything.
    SizeThreshold {
        #[serde(default = "default_threshold")]
        bytes: u64,
    },
    /// Always convert everything.
    Never,
}

#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum SkipReason {
    #[display("manifest is complete")]
    Complete,
    #[display("folder holds {size} bytes, above the {threshold} byte threshold")]
    AboveThreshold { size: u64, threshold: u64 },
}

/// Why an existing output folder does not look finished.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum IncompleteReason {
    #[display("no manifest")]
    NoManifest,
    #[display("{_0} recorded outputs are missing")]
    MissingOutputs(usize),
    #[display("folder holds {size} bytes, not above the {threshold} byte threshold")]
    BelowThreshold { size: u64, threshold: u64 },
}

/// What to do with one conversion unit.
#[derive(Debug)]
pub enum Plan<'a> {
    Skip(SkipReason),
    /// Convert `pending`, recording results into `manifest`.
    Convert { pending: Vec<&'a FileInfo>, manifest: Manifest },
}

impl SkipPolicy {
    /// Plan the conversion of `sources` into the output `folder`.
    pub fn plan<'a>(&self, output: &dyn StorageBackend, folder: &Path, sources: &'a [FileInfo]) -> Result<Plan<'a>> {
        match *self {
            Self::Manifest => {
                let manifest = Manifest::load(output, folder)?.unwrap_or_default();
                let existing = manifest::file_names(output, folder)?;
                if !sources.is_empty() && manifest.is_complete(sources, &existing) {
                    return Ok(Plan::Skip(SkipReason::Complete));
                }
                let pending = manifest.pending(sources, &existing);
                Ok(Plan::Convert { pending, manifest })
            },
            Self::SizeThreshold { bytes } => {
                let size = manifest::content_size(output, folder)?;
                if size > bytes {
                    return Ok(Plan::Skip(SkipReason::AboveThreshold { size, threshold: bytes }));
                }
                let manifest = Manifest::load(output, folder)?.unwrap_or_default();
                Ok(Plan::Convert { pending: sources.iter().collect(), manifest })
            },
            Self::Never => {
                let manifest = Manifest::load(output, folder)?.unwrap_or_default();
                Ok(Plan::Convert { pending: sources.iter().collect(), manifest })
            },
        }
    }

    /// Judge an existing output folder without knowing its sources.
    ///
    /// Only the size threshold can be checked on its own; the other policies
    /// fall back to checking the manifest against the folder's contents.
    pub fn assess(&self, output: &dyn StorageBackend, folder: &Path) -> Result<Option<IncompleteReason>> {
        if let Self::SizeThreshold { bytes } = *self {
            let size = manifest::content_size(output, folder)?;
            return Ok((size <= bytes).then_some(IncompleteReason::BelowThreshold { size, threshold: bytes }));
        }
        let Some(manifest) = Manifest::load(output, folder)? else {
            return Ok(Some(IncompleteReason::NoManifest));
        };
        let existing = manifest::file_names(output, folder)?;
        let missing = manifest.missing_outputs(&existing).len();
        Ok((missing > 0).then_some(IncompleteReason::MissingOutputs(missing)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;
    use arkiv_storage::backend::MockBackend;
    use rstest::rstest;

    fn sources() -> Vec<FileInfo> {
        vec![FileInfo::file("AAB 1/a.tif", 100), FileInfo::file("AAB 1/b.tif", 200)]
    }

    fn pending_names(plan: Plan<'_>) -> Vec<String> {
        match plan {
            Plan::Convert { pending, .. } => pending.iter().filter_map(|f| f.name()).map(str::to_string).collect(),
            Plan::Skip(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[rstest]
    #[case::above(b"x".repeat(21), true)]
    #[case::at_threshold(b"x".repeat(20), false)]
    #[case::empty(Vec::new(), false)]
    fn test_size_threshold(#[case] existing: Vec<u8>, #[case] skipped: bool) {
        let output = MockBackend::with_files([("AAB 1/jpgs/old.jpg", existing)]);
        let policy = SkipPolicy::SizeThreshold { bytes: 20 };
        let sources = sources();
        let plan = policy.plan(&output, Path::new("AAB 1/jpgs"), &sources).unwrap();
        assert_eq!(matches!(plan, Plan::Skip(SkipReason::AboveThreshold { .. })), skipped);
    }

    #[test]
    fn test_size_threshold_ignores_manifest() {
        let output = MockBackend::default();
        let folder = Path::new("AAB 1/jpgs");
        Manifest::default().save(&output, folder).unwrap();
        let policy = SkipPolicy::SizeThreshold { bytes: 20 };
        let sources = sources();

        let plan = policy.plan(&output, folder, &sources).unwrap();
        assert_eq!(pending_names(plan), ["a.tif", "b.tif"]);
        assert_eq!(
            policy.assess(&output, folder).unwrap(),
            Some(IncompleteReason::BelowThreshold { size: 0, threshold: 20 })
        );
    }

    #[test]
    fn test_size_threshold_counts_only_direct_files() {
        let output = MockBackend::with_files([("AAB 1/jpgs/nested/big.jpg", b"x".repeat(100))]);
        let policy = SkipPolicy::SizeThreshold { bytes: 20 };
        let sources = sources();
        let plan = policy.plan(&output, Path::new("AAB 1/jpgs"), &sources).unwrap();
        assert_eq!(pending_names(plan), ["a.tif", "b.tif"]);
    }

    #[test]
    fn test_missing_folder_converts_everything() {
        let output = MockBackend::default();
        let sources = sources();
        for policy in [SkipPolicy::Manifest, SkipPolicy::SizeThreshold { bytes: 20 }, SkipPolicy::Never] {
            let plan = policy.plan(&output, Path::new("AAB 1/jpgs"), &sources).unwrap();
            assert_eq!(pending_names(plan), ["a.tif", "b.tif"]);
        }
    }

    #[test]
    fn test_manifest_converts_only_pending() {
        let output = MockBackend::with_files([("AAB 1/jpgs/a.jpg", b"jpeg".to_vec())]);
        let folder = Path::new("AAB 1/jpgs");
        let sources = sources();
        let mut manifest = Manifest::default();
        manifest.record("a.tif", ManifestEntry::new(&sources[0], "a.jpg", b"jpeg"));
        manifest.save(&output, folder).unwrap();

        let plan = SkipPolicy::Manifest.plan(&output, folder, &sources).unwrap();
        assert_eq!(pending_names(plan), ["b.tif"]);

        // Never ignores the manifest but keeps its entries for the rewrite.
        match SkipPolicy::Never.plan(&output, folder, &sources).unwrap() {
            Plan::Convert { pending, manifest } => {
                assert_eq!(pending.len(), 2);
                assert!(manifest.entries.contains_key("a.tif"));
            },
            Plan::Skip(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn test_manifest_complete_skips() {
        let output = MockBackend::with_files([("AAB 1/jpgs/a.jpg", b"jpeg".to_vec())]);
        let folder = Path::new("AAB 1/jpgs");
        let sources = [FileInfo::file("AAB 1/a.tif", 100)];
        let mut manifest = Manifest::default();
        manifest.record("a.tif", ManifestEntry::new(&sources[0], "a.jpg", b"jpeg"));
        manifest.save(&output, folder).unwrap();

        let plan = SkipPolicy::Manifest.plan(&output, folder, &sources).unwrap();
        assert!(matches!(plan, Plan::Skip(SkipReason::Complete)));
        assert_eq!(SkipPolicy::Manifest.assess(&output, folder).unwrap(), None);
    }

    #[test]
    fn test_assess() {
        let output = MockBackend::with_files([("AAB 1/jpgs/a.jpg", b"jpeg".to_vec())]);
        let folder = Path::new("AAB 1/jpgs");
        assert_eq!(SkipPolicy::Manifest.assess(&output, folder).unwrap(), Some(IncompleteReason::NoManifest));
        assert_eq!(
            SkipPolicy::SizeThreshold { bytes: 20 }.assess(&output, folder).unwrap(),
            Some(IncompleteReason::BelowThreshold { size: 4, threshold: 20 })
        );

        let mut manifest = Manifest::default();
        manifest.record("b.tif", ManifestEntry::new(&FileInfo::file("b.tif", 1), "b.jpg", b""));
        manifest.save(&output, folder).unwrap();
        assert_eq!(SkipPolicy::Never.assess(&output, folder).unwrap(), Some(IncompleteReason::MissingOutputs(1)));
    }

    #[rstest]
    #[case(r#"{"policy":"manifest"}"#, SkipPolicy::Manifest)]
    #[case(r#"{"policy":"never"}"#, SkipPolicy::Never)]
    #[case(r#"{"policy":"size_threshold"}"#, SkipPolicy::SizeThreshold { bytes: 20 })]
    #[case(r#"{"policy":"size_threshold","bytes":4096}"#, SkipPolicy::SizeThreshold { bytes: 4096 })]
    fn test_deserialize(#[case] json: &str, #[case] expected: SkipPolicy) {
        assert_eq!(serde_json::from_str::<SkipPolicy>(json).unwrap(), expected);
    }
}
