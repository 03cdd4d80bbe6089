//! Command Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a command could not run at all. Failures of single files or
/// folders are reported by the command, not raised.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("unable to open directory {}", _0.display())]
    Directory(#[error(not(source))] PathBuf),
    #[display("image codec unavailable")]
    Codec,
    #[display("{_0} failed")]
    Command(#[error(not(source))] &'static str),
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        false
    }
}
