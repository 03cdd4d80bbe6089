//! Relative path validation.
//!
//! Every path a backend receives is relative to that backend's root. This
//! module normalizes those paths and refuses anything that would escape the
//! root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates and normalizes a storage path.
///
/// `.` segments, duplicate separators and trailing separators are dropped,
/// `..` is resolved lexically. A path that resolves to nothing, climbs above
/// the root, carries a drive prefix or contains a null byte is rejected with
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use arkiv_storage::validate_path;
/// assert!(validate_path("AAB 1/jpgs/scan_0001.jpg").is_ok());
/// assert!(validate_path("AAB 1/../AAB 2/jpgs").is_ok());
/// assert!(validate_path("../outside").is_err());
/// assert!(validate_path("a\0b").is_err());
/// assert_eq!(
///     validate_path("AAB 1/./tmp/../jpgs//").unwrap(),
///     Path::new("AAB 1/jpgs")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let mut components = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes survive Path::components() on Unix but truncate
                // the path in the underlying syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(original.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
                }
            },
        }
    }
    if components.is_empty() {
        exn::bail!(ErrorKind::InvalidPath(original.to_path_buf()));
    }
    Ok(components.into_iter().collect())
}
