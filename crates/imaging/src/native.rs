use crate::ImageCodec;
use crate::Raster;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use image::ImageReader;
use std::io::Cursor;

/// Decoder backed by the linked `image` crate.
///
/// The format is sniffed from the data, not the file name. Allocation limits
/// are lifted: archival scans routinely exceed the crate's defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeCodec;

impl ImageCodec for NativeCodec {
    fn name(&self) -> &str {
        "native"
    }

    fn decode(&self, data: &[u8]) -> Result<Raster> {
        let mut reader = ImageReader::new(Cursor::new(data)).with_guessed_format().or_raise(|| ErrorKind::Io)?;
        if reader.format().is_none() {
            exn::bail!(ErrorKind::Decode);
        }
        reader.no_limits();
        let image = reader.decode().or_raise(|| ErrorKind::Decode)?;
        Ok(Raster::from(image))
    }
}
