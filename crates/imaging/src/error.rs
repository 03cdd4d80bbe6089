//! Imaging Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An imaging error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for imaging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input bytes are not a decodable image. Don't retry with the same input.
    #[display("undecodable image data")]
    Decode,
    /// Re-encoding the raster as JPEG failed.
    #[display("JPEG encoding failed")]
    Encode,
    /// Scale factor is not a positive, finite number.
    #[display("invalid scale factor: {_0}")]
    InvalidScale(#[error(not(source))] String),
    /// JPEG quality outside of 1..=100.
    #[display("invalid JPEG quality: {_0}")]
    InvalidQuality(#[error(not(source))] u8),
    /// A resize bound of zero pixels.
    #[display("invalid resize bound: {_0}")]
    InvalidBound(#[error(not(source))] &'static str),
    /// The requested codec name is unknown.
    #[display("unsupported codec: {_0}")]
    UnsupportedCodec(#[error(not(source))] String),
    #[display("ImageMagick not detected on your system")]
    MagickNotFound,
    /// ImageMagick exited with a non-zero exit code (or was killed by a signal).
    #[display("ImageMagick exited with code: {_0}")]
    MagickFailed(#[error(not(source))] i32),
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exn::ResultExt;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Decode.to_string(), "undecodable image data");
        assert_eq!(ErrorKind::InvalidScale("-1".to_string()).to_string(), "invalid scale factor: -1");
        assert_eq!(ErrorKind::InvalidQuality(0).to_string(), "invalid JPEG quality: 0");
        assert_eq!(ErrorKind::MagickFailed(1).to_string(), "ImageMagick exited with code: 1");
    }

    #[test]
    fn error_from_result() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"));
        let err = result.or_raise(|| ErrorKind::Io).unwrap_err();
        assert_eq!(*err, ErrorKind::Io);
        assert!(err.is_retryable());
    }
}
