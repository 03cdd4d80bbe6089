use crate::error::{ErrorKind, Result};
use crate::{MagickCodec, NativeCodec, Quality, Raster, ResizeBounds, raster};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub type CodecHandle = Arc<dyn ImageCodec>;

/// Image decode/resize/encode capability.
///
/// Only [`decode`](Self::decode) has to be provided; resampling and JPEG
/// encoding default to the linked `image` crate.
pub trait ImageCodec: Send + Sync {
    /// Short name of the codec, used for logging.
    fn name(&self) -> &str;

    /// Decode encoded image bytes into a raster.
    ///
    /// Multi-page inputs yield their first page.
    fn decode(&self, data: &[u8]) -> Result<Raster>;

    /// Uniformly scale a raster by `factor`. Factors of `1.0` and above
    /// return the raster unchanged.
    fn resize(&self, raster: Raster, factor: f64) -> Result<Raster> {
        raster::resize(raster, factor)
    }

    /// Encode a raster as JPEG.
    fn encode_jpeg(&self, raster: &Raster, quality: Quality) -> Result<Vec<u8>> {
        raster::encode_jpeg(raster, quality)
    }

    /// Decode, shrink to fit `bounds`, and encode as JPEG in one go.
    fn convert(&self, data: &[u8], bounds: &ResizeBounds, quality: Quality) -> Result<Vec<u8>> {
        let raster = self.decode(data)?;
        let factor = bounds.scale_factor(raster.width(), raster.height());
        let raster = if factor < 1.0 { self.resize(raster, factor)? } else { raster };
        self.encode_jpeg(&raster, quality)
    }
}

/// Which [`ImageCodec`] implementation to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CodecKind {
    /// Linked `image` crate decoders (TIFF, PNG, JPEG).
    #[default]
    Native,
    /// ImageMagick executable discovered on `PATH`.
    Magick,
}
impl CodecKind {
    /// Construct the codec. Discovering ImageMagick can fail.
    pub fn build(self) -> Result<CodecHandle> {
        Ok(match self {
            Self::Native => Arc::new(NativeCodec),
            Self::Magick => Arc::new(MagickCodec::discover()?),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Magick => "magick",
        }
    }
}
impl FromStr for CodecKind {
    type Err = crate::error::Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" | "image" => Ok(Self::Native),
            "magick" | "imagemagick" => Ok(Self::Magick),
            _ => exn::bail!(ErrorKind::UnsupportedCodec(s.to_string())),
        }
    }
}
impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    #[case("native", CodecKind::Native)]
    #[case("IMAGE", CodecKind::Native)]
    #[case("magick", CodecKind::Magick)]
    #[case(" ImageMagick ", CodecKind::Magick)]
    fn test_from_str(#[case] input: &str, #[case] expected: CodecKind) {
        assert_eq!(input.parse::<CodecKind>().unwrap(), expected);
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("opencv".parse::<CodecKind>().is_err());
    }

    #[test]
    fn test_convert_applies_bounds() {
        let mut tiff = Vec::new();
        DynamicImage::new_rgb8(2000, 1000).write_to(&mut Cursor::new(&mut tiff), ImageFormat::Tiff).unwrap();
        let bounds = ResizeBounds::new(None, Some(500)).unwrap();
        let jpeg = NativeCodec.convert(&tiff, &bounds, Quality::DEFAULT).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1000, 500));
    }

    #[test]
    fn test_convert_keeps_size_without_bounds() {
        let mut png = Vec::new();
        DynamicImage::new_luma8(30, 20).write_to(&mut Cursor::new(&mut png), ImageFormat::Png).unwrap();
        let jpeg = NativeCodec.convert(&png, &ResizeBounds::NONE, Quality::DEFAULT).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 20));
    }
}
