//! Batch operations over archive scan trees.
//!
//! - [`convert`](convert::convert): protocol folders of source scans to
//!   folders of JPEGs, skipping work that is already done
//! - [`assemble`](assemble::assemble): one PDF per protocol from its JPEGs
//! - [`resize`](resize::resize): a whole tree of images into one flat folder
//! - [`collect`](collect::collect): copy finished JPEG folders to another tree
//! - [`audit`](audit::audit): list JPEG folders that don't look finished
//!
//! All of them run sequentially against [`StorageBackend`]s, log and record
//! per-file failures, and only return an error when the run cannot start.
//!
//! [`StorageBackend`]: arkiv_storage::StorageBackend

pub mod assemble;
pub mod audit;
pub mod collect;
pub mod convert;
pub mod error;
mod filter;
pub mod manifest;
mod natural;
pub mod resize;
mod skip;
mod template;
pub mod unit;

pub use crate::error::Failure;
pub use crate::filter::ExtensionFilter;
pub use crate::skip::{DEFAULT_SIZE_THRESHOLD, IncompleteReason, Plan, SkipPolicy, SkipReason};
pub use crate::template::PathGenerator;

#[cfg(test)]
pub(crate) mod test_support {
    use arkiv_render::error::Result;
    use arkiv_render::{Page, PdfAssembler};
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;
    use std::sync::Mutex;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut data = Vec::new();
        image.write_to(&mut Cursor::new(&mut data), format).unwrap();
        data
    }

    pub fn tiff(width: u32, height: u32) -> Vec<u8> {
        encode(DynamicImage::new_rgb8(width, height), ImageFormat::Tiff)
    }

    pub fn png(width: u32, height: u32) -> Vec<u8> {
        encode(DynamicImage::new_luma8(width, height), ImageFormat::Png)
    }

    pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
        encode(DynamicImage::new_rgb8(width, height), ImageFormat::Jpeg)
    }

    /// Remembers the title and page names of every document it is asked to
    /// assemble and returns a fixed placeholder.
    #[derive(Default)]
    pub struct RecordingAssembler {
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }
    impl RecordingAssembler {
        pub fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }
    impl PdfAssembler for RecordingAssembler {
        fn assemble(&self, title: &str, pages: Vec<Page>) -> Result<Vec<u8>> {
            let names = pages.into_iter().map(|p| p.name).collect();
            self.calls.lock().unwrap().push((title.to_string(), names));
            Ok(b"%PDF-recorded".to_vec())
        }
    }
}
