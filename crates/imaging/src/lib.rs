//! Decode, downscale and re-encode archive scans.
//!
//! The batch tools only ever need three operations on an image, expressed by
//! the [`ImageCodec`] trait:
//!
//! - **decode** source bytes (TIFF, PNG, JPEG, ...) into a [`Raster`]
//! - **resize** a raster by a uniform [`scale factor`](ResizeBounds::scale_factor)
//! - **encode** a raster as JPEG at a given [`Quality`]
//!
//! Two implementations exist: [`NativeCodec`] links the `image` crate, and
//! [`MagickCodec`] hands decoding to an ImageMagick executable found on
//! `PATH` for formats the native decoders can't read (JPEG 2000, exotic TIFF
//! compressions). Both share the native resize and encode paths.

mod codec;
pub mod error;
pub mod jpeg;
mod magick;
mod native;
mod raster;
mod scale;

pub use crate::codec::{CodecHandle, CodecKind, ImageCodec};
pub use crate::magick::MagickCodec;
pub use crate::native::NativeCodec;
pub use crate::raster::Raster;
pub use crate::scale::{Quality, ResizeBounds};
