//! Discovery of conversion units in a source tree.
//!
//! The root holds protocol folders. A protocol with qualifying files directly
//! inside it is one unit; otherwise each of its subfolders (minus excluded
//! names) is a unit of its own. Nothing deeper is considered.

use crate::error::{ErrorKind, Result};
use crate::filter::ExtensionFilter;
use arkiv_storage::{FileInfo, StorageBackend};
use exn::ResultExt;
use std::path::PathBuf;
use tracing::{info, warn};

/// A source folder whose qualifying files are converted into one output
/// folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    /// Name of the source folder itself.
    pub name: String,
    /// Name of the top-level protocol folder.
    pub protocol: String,
    /// Source folder, relative to the source root.
    pub folder: PathBuf,
    /// Qualifying files directly inside `folder`, sorted by path.
    pub sources: Vec<FileInfo>,
}

/// A folder that was looked at during discovery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Found {
    Unit(Unit),
    /// A subfolder without any qualifying files.
    Empty(PathBuf),
    /// A folder whose listing failed.
    Unreadable(PathBuf),
}

/// Walk the protocol folders of `source` and collect their units.
///
/// Only a failure to list the root itself is an error.
pub fn discover(source: &dyn StorageBackend, filter: &ExtensionFilter, exclude: &[String]) -> Result<Vec<Found>> {
    let root = source.list(None).or_raise(|| ErrorKind::Root(source.name().to_string()))?;
    let mut found = Vec::new();
    for protocol in root.iter().filter(|e| e.is_dir()) {
        let Some(protocol_name) = protocol.name() else {
            warn!(path = %protocol.path.display(), "Skipping folder with a non UTF-8 name");
            continue;
        };
        let Some(entries) = list_or_log(source, protocol) else {
            found.push(Found::Unreadable(protocol.path.clone()));
            continue;
        };

        let sources: Vec<FileInfo> = entries.iter().filter(|e| filter.matches(e)).cloned().collect();
        if !sources.is_empty() {
            found.push(Found::Unit(Unit {
                name: protocol_name.to_string(),
                protocol: protocol_name.to_string(),
                folder: protocol.path.clone(),
                sources,
            }));
            continue;
        }

        for subfolder in entries.iter().filter(|e| e.is_dir()) {
            let Some(name) = subfolder.name() else {
                warn!(path = %subfolder.path.display(), "Skipping folder with a non UTF-8 name");
                continue;
            };
            if exclude.iter().any(|x| x == name) {
                continue;
            }
            let Some(children) = list_or_log(source, subfolder) else {
                found.push(Found::Unreadable(subfolder.path.clone()));
                continue;
            };
            let sources: Vec<FileInfo> = children.into_iter().filter(|e| filter.matches(e)).collect();
            if sources.is_empty() {
                info!(path = %subfolder.path.display(), "Subfolder without source files");
                found.push(Found::Empty(subfolder.path.clone()));
                continue;
            }
            found.push(Found::Unit(Unit {
                name: name.to_string(),
                protocol: protocol_name.to_string(),
                folder: subfolder.path.clone(),
                sources,
            }));
        }
    }
    Ok(found)
}

fn list_or_log(source: &dyn StorageBackend, dir: &FileInfo) -> Option<Vec<FileInfo>> {
    match source.list(Some(&dir.path)) {
        Ok(entries) => Some(entries),
        Err(error) => {
            warn!(path = %dir.path.display(), ?error, "Unable to list folder");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkiv_storage::backend::MockBackend;
    use std::path::Path;

    fn units(found: &[Found]) -> Vec<(&str, &str, &Path, usize)> {
        found
            .iter()
            .filter_map(|f| match f {
                Found::Unit(u) => Some((u.name.as_str(), u.protocol.as_str(), u.folder.as_path(), u.sources.len())),
                _ => None,
            })
            .collect()
    }

    fn exclude() -> Vec<String> {
        ["Color", "thumb", "tmpfilename", "undo"].map(String::from).to_vec()
    }

    #[test]
    fn test_discovers_direct_and_nested_units() {
        let source = MockBackend::with_files([
            ("loose.tif", "x"),
            ("AAB 1/0001.tif", "x"),
            ("AAB 1/0002.TIFF", "x"),
            ("AAB 1/notes.txt", "x"),
            // Ignored, the protocol already has direct sources.
            ("AAB 1/extra/0003.tif", "x"),
            ("AAB 2/Scan A/0001.tif", "x"),
            ("AAB 2/Scan B/0001.tif", "x"),
            ("AAB 2/Scan B/0002.tif", "x"),
            ("AAB 2/thumb/0001.tif", "x"),
            ("AAB 2/Color/0001.tif", "x"),
            ("AAB 2/Scan C/readme.txt", "x"),
            ("AAB 2/Scan D/deeper/0001.tif", "x"),
        ]);
        let filter = ExtensionFilter::new(["tif", "tiff"]);
        let found = discover(&source, &filter, &exclude()).unwrap();

        assert_eq!(
            units(&found),
            [
                ("AAB 1", "AAB 1", Path::new("AAB 1"), 2),
                ("Scan A", "AAB 2", Path::new("AAB 2/Scan A"), 1),
                ("Scan B", "AAB 2", Path::new("AAB 2/Scan B"), 2),
            ]
        );
        assert!(found.contains(&Found::Empty(PathBuf::from("AAB 2/Scan C"))));
        assert!(found.contains(&Found::Empty(PathBuf::from("AAB 2/Scan D"))));
    }

    #[test]
    fn test_empty_root() {
        let source = MockBackend::default();
        let found = discover(&source, &ExtensionFilter::new(["tif"]), &[]).unwrap();
        assert!(found.is_empty());
    }
}
