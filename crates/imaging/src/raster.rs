use crate::Quality;
use crate::error::{ErrorKind, Result};
use crate::scale::scaled;
use exn::ResultExt;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView};
use std::borrow::Cow;

/// A decoded image held in memory.
#[derive(Clone, Debug)]
pub struct Raster(DynamicImage);
impl Raster {
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }
}
impl From<DynamicImage> for Raster {
    fn from(image: DynamicImage) -> Self {
        Self(image)
    }
}

/// Shrink a raster uniformly. Factors of `1.0` or more return it untouched.
pub(crate) fn resize(raster: Raster, factor: f64) -> Result<Raster> {
    if !factor.is_finite() || factor <= 0.0 {
        exn::bail!(ErrorKind::InvalidScale(factor.to_string()));
    }
    if factor >= 1.0 {
        return Ok(raster);
    }
    let (width, height) = raster.dimensions();
    let (target_width, target_height) = (scaled(width, factor), scaled(height, factor));
    tracing::trace!(width, height, target_width, target_height, "Downscaling raster");
    Ok(Raster(raster.0.resize_exact(target_width, target_height, FilterType::CatmullRom)))
}

/// Encode as baseline JPEG.
///
/// JPEG carries neither alpha nor 16-bit samples: greyscale sources are
/// flattened to 8-bit luma, everything else to 8-bit RGB.
pub(crate) fn encode_jpeg(raster: &Raster, quality: Quality) -> Result<Vec<u8>> {
    let image = &raster.0;
    let flattened = match image.color() {
        ColorType::L8 | ColorType::Rgb8 => Cow::Borrowed(image),
        ColorType::La8 | ColorType::L16 | ColorType::La16 => Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    };
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.get());
    flattened.write_with_encoder(encoder).or_raise(|| ErrorKind::Encode)?;
    Ok(buffer)
}
