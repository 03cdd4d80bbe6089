//! Batch conversion of protocol folders to JPEG.
//!
//! [`convert`] walks the source root's protocol folders (see
//! [`discover`](crate::unit::discover)), asks the [`SkipPolicy`] what is
//! still to do for each unit, and converts the pending sources one by one
//! with [`convert_file`]. Each unit's manifest is written once its loop has
//! finished, so an interrupted run leaves that unit to be picked up again.

mod file;
mod run;

pub use self::file::{convert_file, output_name};
pub use self::run::{ConvertReport, UnitOutcome, UnitReport, convert};
use crate::{ExtensionFilter, PathGenerator, SkipPolicy};
use arkiv_imaging::{Quality, ResizeBounds};

/// Everything [`convert`] needs besides the storage and the codec.
#[derive(Debug)]
pub struct ConvertOptions {
    pub filter: ExtensionFilter,
    /// Subfolder names that are never units.
    pub exclude: Vec<String>,
    /// Output folder of a unit, relative to the output root.
    pub layout: PathGenerator,
    pub policy: SkipPolicy,
    pub bounds: ResizeBounds,
    pub quality: Quality,
}
