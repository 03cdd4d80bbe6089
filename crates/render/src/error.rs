//! Render Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A PDF needs at least one page.
    #[display("no pages to assemble")]
    EmptyDocument,
    /// Page data is not a readable JPEG.
    #[display("invalid JPEG page: {_0}")]
    InvalidPage(#[error(not(source))] String),
    /// The JPEG uses a colour layout PDF can't embed directly.
    #[display("unsupported colour components ({components}) in page: {page}")]
    UnsupportedColor { page: String, components: u8 },
    /// Serializing the finished document failed.
    #[display("PDF serialization failed: {_0}")]
    Serialize(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Same pages in, same failure out.
        false
    }
}
