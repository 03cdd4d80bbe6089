use crate::error::{ErrorKind, Result};
use crate::{ImageCodec, Raster};
use exn::ResultExt;
use image::ImageFormat;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

/// Decoder that shells out to ImageMagick.
///
/// The source bytes are written to a temporary file, ImageMagick renders the
/// first frame as PNG on stdout, and the PNG is decoded natively. Resize and
/// JPEG encode use the native defaults.
#[derive(Clone, Debug)]
pub struct MagickCodec {
    program: PathBuf,
}
impl MagickCodec {
    /// Locate ImageMagick on `PATH`.
    ///
    /// Prefers the version 7 `magick` front-end, falling back to a version 6
    /// `convert` only if it identifies itself as ImageMagick (Windows ships an
    /// unrelated `convert.exe`).
    pub fn discover() -> Result<Self> {
        if let Ok(program) = which::which("magick") {
            tracing::debug!(program = %program.display(), "Discovered ImageMagick 7");
            return Ok(Self { program });
        }
        tracing::info!("ImageMagick 7 `magick` executable not found in PATH");
        if let Ok(program) = which::which("convert") {
            let identifies = Command::new(&program)
                .arg("-version")
                .output()
                .is_ok_and(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).contains("ImageMagick"));
            if identifies {
                tracing::debug!(program = %program.display(), "Discovered ImageMagick 6");
                return Ok(Self { program });
            }
            tracing::trace!(program = %program.display(), "Found `convert` but it is not ImageMagick");
        }
        exn::bail!(ErrorKind::MagickNotFound);
    }

    /// Use a specific executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    /// Both `magick` (v7) and `convert` (v6) accept `<input> <output>`.
    fn decode_args(input: &Path) -> [OsString; 3] {
        // `[0]` selects the first page of multi-page TIFFs.
        let mut source = input.as_os_str().to_os_string();
        source.push("[0]");
        [source, "-quiet".into(), "png:-".into()]
    }
}

impl ImageCodec for MagickCodec {
    fn name(&self) -> &str {
        "magick"
    }

    fn decode(&self, data: &[u8]) -> Result<Raster> {
        let mut input = NamedTempFile::new().or_raise(|| ErrorKind::Io)?;
        input.write_all(data).or_raise(|| ErrorKind::Io)?;
        input.flush().or_raise(|| ErrorKind::Io)?;
        let output =
            Command::new(&self.program).args(Self::decode_args(input.path())).output().or_raise(|| ErrorKind::Io)?;
        if !output.status.success() {
            tracing::debug!(stderr = %String::from_utf8_lossy(&output.stderr).trim(), "ImageMagick rejected input");
            exn::bail!(ErrorKind::MagickFailed(output.status.code().unwrap_or(-1)));
        }
        let image =
            image::load_from_memory_with_format(&output.stdout, ImageFormat::Png).or_raise(|| ErrorKind::Decode)?;
        Ok(Raster::from(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_args() {
        let args = MagickCodec::decode_args(Path::new("/tmp/scan.tif"));
        assert_eq!(args, [OsString::from("/tmp/scan.tif[0]"), OsString::from("-quiet"), OsString::from("png:-")]);
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let codec = MagickCodec::with_program("/definitely/not/here/magick");
        let err = codec.decode(b"data").unwrap_err();
        assert_eq!(*err, ErrorKind::Io);
    }
}
