//! Storage for archive trees.
//!
//! Both sides of a batch run (the read-only source scans and the generated
//! output tree) are accessed through a [`StorageBackend`]. All paths handed to
//! a backend are relative to its root and validated with [`validate_path`]
//! before they touch the filesystem.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::{EntryKind, FileInfo};
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
