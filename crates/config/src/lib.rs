//! Layered configuration for arkiv.
//!
//! Values are merged, lowest precedence first, from:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. a configuration file (`--config <file>`, otherwise `arkiv.toml` in the
//!    platform configuration directory when it exists),
//! 3. `ARKIV_`-prefixed environment variables, nested keys separated by `__`
//!    (`ARKIV_CONVERT__QUALITY=80`),
//! 4. overrides merged by the caller onto the returned [`Figment`].
//!
//! ```toml
//! codec = "magick"
//!
//! [convert]
//! max_height = 3000
//! quality = 90
//!
//! [skip]
//! policy = "size_threshold"
//! bytes = 20
//! ```

pub mod error;
mod validate;

use crate::error::{ErrorKind, Result};
use arkiv_imaging::{CodecKind, Quality, ResizeBounds};
use arkiv_library::SkipPolicy;
use arkiv_render::DEFAULT_DPI;
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the platform configuration directory.
pub const CONFIG_FILE: &str = "arkiv.toml";
/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "ARKIV_";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Decoder used for source images.
    pub codec: CodecKind,
    pub convert: ConvertConfig,
    pub pdf: PdfConfig,
    pub resize: ResizeConfig,
    pub collect: CollectConfig,
    /// When an output folder counts as already converted.
    pub skip: SkipPolicy,
}

/// Batch conversion of protocol folders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub extensions: Vec<String>,
    /// Subfolder names never treated as conversion units.
    pub exclude: Vec<String>,
    /// Output folder template, relative to the output root.
    pub output: String,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub quality: Quality,
}
impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            extensions: strings(&["tif", "tiff"]),
            exclude: strings(&["Color", "thumb", "tmpfilename", "undo"]),
            output: "{{ name }}/jpgs".to_string(),
            max_width: None,
            max_height: None,
            quality: Quality::DEFAULT,
        }
    }
}
impl ConvertConfig {
    pub fn bounds(&self) -> Result<ResizeBounds> {
        bounds(self.max_width, self.max_height, "convert")
    }
}

/// Assembly of per-protocol PDFs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    pub extensions: Vec<String>,
    /// Folder inside each protocol holding the pages.
    pub folder: String,
    /// PDF file name template, relative to the protocol folder.
    pub name: String,
    /// Density assumed for JPEGs that declare none.
    pub dpi: f32,
}
impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            extensions: strings(&["jpg", "jpeg"]),
            folder: "jpgs".to_string(),
            name: "{{ name }}.pdf".to_string(),
            dpi: DEFAULT_DPI,
        }
    }
}

/// Flat resize of a whole directory tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    pub extensions: Vec<String>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub quality: Quality,
}
impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            extensions: strings(&["png", "jpg", "jp2", "jpeg", "tiff", "tif"]),
            max_width: None,
            max_height: None,
            quality: Quality::DEFAULT,
        }
    }
}
impl ResizeConfig {
    pub fn bounds(&self) -> Result<ResizeBounds> {
        bounds(self.max_width, self.max_height, "resize")
    }
}

/// Copying finished output folders between trees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    pub folder: String,
}
impl Default for CollectConfig {
    fn default() -> Self {
        Self { folder: "jpgs".to_string() }
    }
}

impl Config {
    /// Load and validate the configuration without caller overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::extract(&Self::figment(explicit)?)
    }

    /// Build the layered provider chain.
    ///
    /// An explicit path must exist; the default path is only used when
    /// present.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        let file = match explicit {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_path().filter(|path| path.is_file()),
        };
        if let Some(file) = file {
            debug!(path = %file.display(), "Loading configuration file");
            figment = merge_file(figment, file)?;
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Deserialize and validate a provider chain.
    pub fn extract(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Parse)?;
        config.validate()?;
        Ok(config)
    }
}

/// Location of the configuration file in the platform configuration directory.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "arkiv").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

fn merge_file(figment: Figment, path: PathBuf) -> Result<Figment> {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path)),
    })
}

fn bounds(max_width: Option<u32>, max_height: Option<u32>, section: &str) -> Result<ResizeBounds> {
    ResizeBounds::new(max_width, max_height)
        .or_raise(|| ErrorKind::Invalid(format!("{section}: resize bounds must be greater than zero")))
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}
