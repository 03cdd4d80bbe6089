//! Multi-page PDF assembly.
//!
//! Every page is one JPEG, embedded as-is (DCT-encoded image XObject) on a
//! page exactly the size of the image at its declared density. Nothing is
//! decoded or re-compressed.

pub mod error;
mod page;
mod render;

use crate::error::Result;
pub use crate::page::PageGeometry;

/// Density assumed for JPEGs that declare none.
pub const DEFAULT_DPI: f32 = 96.0;

/// One page of a document: a JPEG and the name it is reported under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub name: String,
    pub data: Vec<u8>,
}
impl Page {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), data: data.into() }
    }
}

/// PDF assembly capability: ordered JPEG pages in, PDF bytes out.
///
/// Implementations reject the whole document if any page is unusable; a
/// partial PDF is never returned.
pub trait PdfAssembler: Send + Sync {
    fn assemble(&self, title: &str, pages: Vec<Page>) -> Result<Vec<u8>>;
}

/// [`PdfAssembler`] backed by `printpdf`.
#[derive(Clone, Debug)]
pub struct PrintPdfAssembler {
    default_dpi: f32,
}
impl PrintPdfAssembler {
    pub fn new(default_dpi: f32) -> Self {
        Self { default_dpi }
    }
}
impl Default for PrintPdfAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_DPI)
    }
}
