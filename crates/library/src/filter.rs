use arkiv_storage::FileInfo;

/// Extension allow-list, compared case-insensitively and without the dot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}
impl ExtensionFilter {
    pub fn new<S: AsRef<str>>(extensions: impl IntoIterator<Item = S>) -> Self {
        let mut extensions: Vec<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        extensions.sort();
        extensions.dedup();
        Self { extensions }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Whether the entry is a regular file with an allowed extension.
    pub fn matches(&self, entry: &FileInfo) -> bool {
        entry.is_file() && entry.extension().is_some_and(|ext| self.extensions.contains(&ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("scan.tif", true)]
    #[case("scan.TIF", true)]
    #[case("scan.Tiff", true)]
    #[case("scan.jpg", false)]
    #[case("scan", false)]
    #[case("tif", false)]
    fn test_matches_files(#[case] path: &str, #[case] expected: bool) {
        let filter = ExtensionFilter::new(["tif", ".TIFF"]);
        assert_eq!(filter.matches(&FileInfo::file(path, 1)), expected);
    }

    #[test]
    fn test_ignores_directories() {
        let filter = ExtensionFilter::new(["tif"]);
        assert!(!filter.matches(&FileInfo::directory("odd.tif")));
    }

    #[test]
    fn test_blank_entries_dropped() {
        assert!(ExtensionFilter::new(["", " . "]).is_empty());
    }
}
