//! Path templating for output folders and PDF names.
//!
//! Templates use [upon]'s Mustache-like syntax (`{{ variable }}`) and are
//! rendered relative to an output root. Two variables are available:
//!
//! | Variable   | Description                                                  |
//! |------------|--------------------------------------------------------------|
//! | `name`     | Name of the conversion unit (protocol or subfolder name)     |
//! | `protocol` | Name of the top-level protocol folder the unit was found in  |
//!
//! The `truncate` function is also registered, usable as either
//! `truncate(name, 20)` or `{{ name|truncate: 20 }}`.
//!
//! # Example
//!
//! ```
//! use arkiv_library::PathGenerator;
//! use std::path::Path;
//!
//! let generator: PathGenerator = "{{ protocol }}/{{ name }}/jpgs".parse().unwrap();
//! let path = generator.generate("Scan 2", "AAB 1").unwrap();
//! assert_eq!(path, Path::new("AAB 1/Scan 2/jpgs"));
//! ```

use crate::error::{Error, ErrorKind, Result};
use arkiv_storage::validate_path;
use exn::ResultExt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

/// Generates relative output paths from a unit's names and a user-defined
/// template string.
///
/// Constructed via [`FromStr`], which compiles the template eagerly so that
/// syntax errors surface at creation time rather than at render time.
///
/// Generated paths are normalized (blank segments dropped) and
/// validated by [`arkiv_storage::validate_path`] to prevent directory
/// traversal.
pub struct PathGenerator {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl FromStr for PathGenerator {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        engine.add_function("truncate", truncate_to_char_boundary);
        // Compile the template early so we can fail-fast in construction.
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}
impl std::fmt::Debug for PathGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathGenerator").finish_non_exhaustive()
    }
}
impl PathGenerator {
    /// Renders the template for a unit, returning the normalized relative
    /// path.
    #[instrument(skip_all, fields(name = name))]
    pub fn generate(&self, name: &str, protocol: &str) -> Result<PathBuf> {
        let path = self
            .template
            .render(&self.engine, upon::value! { name: name, protocol: protocol })
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        Self::normalize(path)
    }

    /// Drops blank path segments, then validates. Other segments are kept
    /// verbatim: `AAB 1` and `AAB 1 ` are different folders.
    fn normalize(s: impl Into<String>) -> Result<PathBuf> {
        let path = s.into().split('/').filter(|s| !s.trim().is_empty()).collect::<Vec<_>>().join("/");
        if path.is_empty() {
            exn::bail!(ErrorKind::Template);
        }
        validate_path(&path).or_raise(|| ErrorKind::Template)
    }
}

/// Truncates a string to a maximum byte length at a character boundary.
fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> String {
    s[..s.floor_char_boundary(max_bytes)].to_string()
}
