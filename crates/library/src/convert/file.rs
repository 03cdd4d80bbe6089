use crate::error::{ErrorKind, Result};
use crate::manifest::ManifestEntry;
use arkiv_imaging::{ImageCodec, Quality, ResizeBounds};
use arkiv_storage::{FileInfo, StorageBackend};
use exn::{OptionExt, ResultExt};
use std::path::Path;
use tracing::{debug, instrument};

/// Name of the JPEG a source is converted into: its stem plus `.jpg`.
pub fn output_name(file: &FileInfo) -> Option<String> {
    file.stem().map(|stem| format!("{stem}.jpg"))
}

/// Converts a single source image into `<folder>/<stem>.jpg` on the output
/// backend.
///
/// The source is read whole, decoded, shrunk to fit `bounds` (never enlarged)
/// and encoded at `quality`. An existing output of the same name is replaced.
///
/// # Errors
/// - [`ErrorKind::Storage`] when the source can't be read or the output can't
///   be written.
/// - [`ErrorKind::Convert`] when the codec rejects the image, or the source
///   name has no usable stem.
#[instrument(skip_all, fields(path = %file.path.display()))]
pub fn convert_file(
    source: &dyn StorageBackend,
    output: &dyn StorageBackend,
    codec: &dyn ImageCodec,
    file: &FileInfo,
    folder: &Path,
    bounds: &ResizeBounds,
    quality: Quality,
) -> Result<ManifestEntry> {
    let name = output_name(file).ok_or_raise(|| ErrorKind::Convert(file.path.clone()))?;
    let data = source.read(&file.path).or_raise(|| ErrorKind::Storage(file.path.clone()))?;
    let jpeg = codec.convert(&data, bounds, quality).or_raise(|| ErrorKind::Convert(file.path.clone()))?;
    let target = folder.join(&name);
    output.write(&target, &jpeg).or_raise(|| ErrorKind::Storage(target.clone()))?;
    debug!(target = %target.display(), size = jpeg.len(), codec = codec.name(), "Converted image");
    Ok(ManifestEntry::new(file, name, &jpeg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tiff;
    use arkiv_imaging::NativeCodec;
    use arkiv_storage::backend::MockBackend;

    #[test]
    fn test_converts_into_folder() {
        let source = MockBackend::with_files([("AAB 1/Scan 01.TIF", tiff(200, 100))]);
        let output = MockBackend::default();
        let file = source.stat(Path::new("AAB 1/Scan 01.TIF")).unwrap();
        let bounds = ResizeBounds::new(Some(100), None).unwrap();

        let entry =
            convert_file(&source, &output, &NativeCodec, &file, Path::new("AAB 1/jpgs"), &bounds, Quality::DEFAULT)
                .unwrap();
        assert_eq!(entry.output, "Scan 01.jpg");

        let jpeg = output.read(Path::new("AAB 1/jpgs/Scan 01.jpg")).unwrap();
        assert_eq!(entry.output_hash, blake3::hash(&jpeg).to_hex().to_string());
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 50));
    }

    #[test]
    fn test_corrupt_source_is_convert_error() {
        let source = MockBackend::with_files([("AAB 1/broken.tif", b"II*\0 definitely not a tiff".to_vec())]);
        let output = MockBackend::default();
        let file = source.stat(Path::new("AAB 1/broken.tif")).unwrap();

        let err = convert_file(&source, &output, &NativeCodec, &file, Path::new("jpgs"), &ResizeBounds::NONE, Quality::DEFAULT)
            .unwrap_err();
        assert_eq!(*err, ErrorKind::Convert(file.path.clone()));
        assert!(output.paths().is_empty());
    }

    #[test]
    fn test_missing_source_is_storage_error() {
        let source = MockBackend::default();
        let output = MockBackend::default();
        let file = FileInfo::file("AAB 1/gone.tif", 10);

        let err = convert_file(&source, &output, &NativeCodec, &file, Path::new("jpgs"), &ResizeBounds::NONE, Quality::DEFAULT)
            .unwrap_err();
        assert!(matches!(*err, ErrorKind::Storage(_)));
    }
}
