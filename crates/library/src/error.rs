//! Library Error Types
//!
//! Only a handful of conditions abort a whole run (an unusable root, a broken
//! template). Everything that goes wrong for a single file or folder is
//! raised with the same kinds, caught by the batch loops, logged and recorded
//! in the run's report.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("issue with path generation from template")]
    Template,
    /// The root of a tree could not be listed.
    #[display("unable to read root directory of storage {_0}")]
    Root(#[error(not(source))] String),
    #[display("storage operation failed on {}", _0.display())]
    Storage(#[error(not(source))] PathBuf),
    #[display("unable to convert image {}", _0.display())]
    Convert(#[error(not(source))] PathBuf),
    #[display("unable to assemble PDF for {}", _0.display())]
    Assemble(#[error(not(source))] PathBuf),
    #[display("unable to write manifest in {}", _0.display())]
    Manifest(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Manifest(_))
    }
}

/// A single file or folder that could not be processed.
///
/// Batch runs keep going after a failure; these are what the report keeps of
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub path: PathBuf,
    pub reason: String,
}
impl Failure {
    pub(crate) fn new(path: impl Into<PathBuf>, err: &Error) -> Self {
        Self { path: path.into(), reason: (**err).to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_top_level_reason() {
        let err = Error::from(ErrorKind::Convert(PathBuf::from("AAB 1/0001.tif")));
        let failure = Failure::new("AAB 1/0001.tif", &err);
        assert_eq!(failure.reason, "unable to convert image AAB 1/0001.tif");
        assert!(!err.is_retryable());
    }
}
