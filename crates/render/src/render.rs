use crate::error::{ErrorKind, Result};
use crate::{Page, PageGeometry, PdfAssembler, PrintPdfAssembler};
use arkiv_imaging::jpeg::{self, JpegInfo};
use printpdf::{ColorBits, ColorSpace, Image, ImageFilter, ImageTransform, ImageXObject, Mm, PdfDocument, Px};
use tracing::instrument;

/// A page whose header has been checked and whose geometry is known.
struct Prepared {
    image: Image,
    geometry: PageGeometry,
}

impl PrintPdfAssembler {
    fn prepare(&self, page: Page) -> Result<Prepared> {
        let info = jpeg::sniff(&page.data).map_err(|_| exn::Exn::from(ErrorKind::InvalidPage(page.name.clone())))?;
        let color_space = color_space(&page.name, &info)?;
        let geometry = PageGeometry::for_jpeg(&info, self.default_dpi);
        let image = Image::from(ImageXObject {
            width: Px(info.width as usize),
            height: Px(info.height as usize),
            color_space,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: page.data,
            image_filter: Some(ImageFilter::DCT),
            clipping_bbox: None,
            smask: None,
        });
        Ok(Prepared { image, geometry })
    }
}

/// Four-component JPEGs are refused: Adobe writes CMYK inverted, and without a
/// decode array those pages would come out as negatives.
fn color_space(name: &str, info: &JpegInfo) -> Result<ColorSpace> {
    match info.components {
        1 => Ok(ColorSpace::Greyscale),
        3 => Ok(ColorSpace::Rgb),
        components => exn::bail!(ErrorKind::UnsupportedColor { page: name.to_string(), components }),
    }
}

impl PdfAssembler for PrintPdfAssembler {
    #[instrument(skip_all, fields(title = title, pages = pages.len()))]
    fn assemble(&self, title: &str, pages: Vec<Page>) -> Result<Vec<u8>> {
        if pages.is_empty() {
            exn::bail!(ErrorKind::EmptyDocument);
        }
        // Validate every page before building anything.
        let prepared = pages.into_iter().map(|page| self.prepare(page)).collect::<Result<Vec<_>>>()?;
        let mut prepared = prepared.into_iter();
        let Some(first) = prepared.next() else {
            exn::bail!(ErrorKind::EmptyDocument);
        };

        let (doc, page, layer) =
            PdfDocument::new(title, Mm(first.geometry.width_mm), Mm(first.geometry.height_mm), "Layer 1");
        place(first, doc.get_page(page).get_layer(layer));
        let mut count = 1_usize;
        for next in prepared {
            let (page, layer) = doc.add_page(Mm(next.geometry.width_mm), Mm(next.geometry.height_mm), "Layer 1");
            place(next, doc.get_page(page).get_layer(layer));
            count += 1;
        }
        let bytes = doc.save_to_bytes().map_err(|e| exn::Exn::from(ErrorKind::Serialize(e.to_string())))?;
        tracing::debug!(pages = count, bytes = bytes.len(), "PDF assembled");
        Ok(bytes)
    }
}

fn place(prepared: Prepared, layer: printpdf::PdfLayerReference) {
    let transform = ImageTransform {
        dpi: Some(prepared.geometry.dpi),
        ..Default::default()
    };
    prepared.image.add_to_layer(layer, transform);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::{DynamicImage, ImageEncoder};

    fn jpeg_page(name: &str, image: DynamicImage) -> Page {
        let mut data = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut data, 90);
        encoder.write_image(image.as_bytes(), image.width(), image.height(), image.color().into()).unwrap();
        Page::new(name, data)
    }

    #[test]
    fn test_assembles_mixed_pages() {
        let pages = vec![
            jpeg_page("a.jpg", DynamicImage::new_rgb8(40, 60)),
            jpeg_page("b.jpeg", DynamicImage::new_luma8(60, 40)),
        ];
        let pdf = PrintPdfAssembler::default().assemble("AAB 1", pages).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_empty_document_rejected() {
        let err = PrintPdfAssembler::default().assemble("empty", Vec::new()).unwrap_err();
        assert_eq!(*err, ErrorKind::EmptyDocument);
    }

    #[test]
    fn test_corrupt_page_rejects_document() {
        let pages = vec![jpeg_page("a.jpg", DynamicImage::new_rgb8(4, 4)), Page::new("broken.jpg", b"\xFF\xD8garbage")];
        let err = PrintPdfAssembler::default().assemble("AAB 2", pages).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidPage("broken.jpg".to_string()));
    }

    #[test]
    fn test_color_space_mapping() {
        let info = |components| JpegInfo { width: 1, height: 1, components, density: None };
        assert!(matches!(color_space("p", &info(1)).unwrap(), ColorSpace::Greyscale));
        assert!(matches!(color_space("p", &info(3)).unwrap(), ColorSpace::Rgb));
        assert!(color_space("p", &info(2)).is_err());
        let err = color_space("cmyk.jpg", &info(4)).unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedColor { page: "cmyk.jpg".to_string(), components: 4 });
    }
}
