use arkiv_imaging::jpeg::JpegInfo;

const MM_PER_INCH: f32 = 25.4;

/// Physical size of a page holding one image edge to edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub dpi: f32,
}
impl PageGeometry {
    /// Page size for a JPEG, using its JFIF density or `default_dpi`.
    pub fn for_jpeg(info: &JpegInfo, default_dpi: f32) -> Self {
        let dpi = info.density.map(|d| d.x).filter(|dpi| *dpi > 0.0).unwrap_or(default_dpi);
        Self {
            width_mm: px_to_mm(info.width, dpi),
            height_mm: px_to_mm(info.height, dpi),
            dpi,
        }
    }
}

pub(crate) fn px_to_mm(px: u32, dpi: f32) -> f32 {
    px as f32 / dpi * MM_PER_INCH
}
