use crate::error::{ErrorKind, Result};

/// JPEG encoder quality, `1..=100`.
///
/// Passed straight through to the encoder. Defaults to `95`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Quality(u8);
impl Quality {
    pub const DEFAULT: Quality = Quality(95);

    pub fn new(value: u8) -> Result<Self> {
        match value {
            1..=100 => Ok(Self(value)),
            _ => exn::bail!(ErrorKind::InvalidQuality(value)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}
impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}
impl TryFrom<u8> for Quality {
    type Error = ErrorKind;
    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::new(value).map_err(|e| (*e).clone())
    }
}
impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Optional upper bounds on output dimensions.
///
/// Images are only ever shrunk to fit, never enlarged, and always keep their
/// aspect ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResizeBounds {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}
impl ResizeBounds {
    /// No bounds: every image keeps its original size.
    pub const NONE: ResizeBounds = ResizeBounds { max_width: None, max_height: None };

    pub fn new(max_width: Option<u32>, max_height: Option<u32>) -> Result<Self> {
        if max_width == Some(0) {
            exn::bail!(ErrorKind::InvalidBound("max_width"));
        }
        if max_height == Some(0) {
            exn::bail!(ErrorKind::InvalidBound("max_height"));
        }
        Ok(Self { max_width, max_height })
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_width.is_none() && self.max_height.is_none()
    }

    /// Uniform downscale factor for an image of the given size.
    ///
    /// The smallest of `max_height / height` and `max_width / width`, clamped
    /// to `1.0`. Missing bounds don't constrain.
    pub fn scale_factor(&self, width: u32, height: u32) -> f64 {
        let mut factor = 1.0_f64;
        if let Some(max_height) = self.max_height
            && height > 0
        {
            factor = factor.min(f64::from(max_height) / f64::from(height));
        }
        if let Some(max_width) = self.max_width
            && width > 0
        {
            factor = factor.min(f64::from(max_width) / f64::from(width));
        }
        factor
    }

    /// Output dimensions after applying [`scale_factor`](Self::scale_factor).
    ///
    /// Rounded to the nearest pixel, never below one.
    pub fn target(&self, width: u32, height: u32) -> (u32, u32) {
        let factor = self.scale_factor(width, height);
        (scaled(width, factor), scaled(height, factor))
    }
}

pub(crate) fn scaled(length: u32, factor: f64) -> u32 {
    if factor >= 1.0 {
        return length;
    }
    ((f64::from(length) * factor).round() as u32).max(1)
}
