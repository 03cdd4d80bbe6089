use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use arkiv_config::Config;
use arkiv_library::assemble::{AssembleOptions, assemble};
use arkiv_library::audit::audit;
use arkiv_library::collect::{CollectOptions, collect};
use arkiv_library::convert::{ConvertOptions, convert};
use arkiv_library::resize::{ResizeOptions, resize};
use arkiv_library::{ExtensionFilter, PathGenerator};
use arkiv_render::PrintPdfAssembler;
use arkiv_storage::backend::{LocalBackend, ReadOnlyBackend};
use arkiv_storage::BackendHandle;
use exn::ResultExt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Load the configuration, layer the command line on top, and run the
/// selected command.
pub fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    cli.command.apply(&mut config);
    config.validate().or_raise(|| ErrorKind::Config)?;
    debug!(?config, "Effective configuration");

    match &cli.command {
        Command::Convert(args) => run_convert(&config, &args.source, &args.output),
        Command::Pdf(args) => run_pdf(&config, &args.root),
        Command::Resize(args) => run_resize(&config, &args.source, &args.output),
        Command::Collect(args) => run_collect(&config, &args.source, &args.output),
        Command::Audit(args) => run_audit(&config, &args.root),
    }
}

/// Existing directory, wrapped so that nothing can be written to it.
fn open_source(path: &Path) -> Result<BackendHandle> {
    let local = LocalBackend::open("source", path).or_raise(|| ErrorKind::Directory(path.to_path_buf()))?;
    Ok(Arc::new(ReadOnlyBackend::new(Arc::new(local))))
}

fn template(source: &str) -> Result<PathGenerator> {
    source.parse::<PathGenerator>().or_raise(|| ErrorKind::Config)
}

fn run_convert(config: &Config, source: &Path, output: &Path) -> Result<()> {
    let source = open_source(source)?;
    let output = LocalBackend::create("output", output).or_raise(|| ErrorKind::Directory(output.to_path_buf()))?;
    let codec = config.codec.build().or_raise(|| ErrorKind::Codec)?;
    let options = ConvertOptions {
        filter: ExtensionFilter::new(&config.convert.extensions),
        exclude: config.convert.exclude.clone(),
        layout: template(&config.convert.output)?,
        policy: config.skip,
        bounds: config.convert.bounds().or_raise(|| ErrorKind::Config)?,
        quality: config.convert.quality,
    };
    let report = convert(&*source, &output, &*codec, &options).or_raise(|| ErrorKind::Command("convert"))?;
    println!(
        "converted {} images in {} folders, {} folders skipped, {} failures",
        report.converted(),
        report.units.len(),
        report.skipped(),
        report.failures.len()
    );
    Ok(())
}

fn run_pdf(config: &Config, root: &Path) -> Result<()> {
    let storage = LocalBackend::open("output", root).or_raise(|| ErrorKind::Directory(root.to_path_buf()))?;
    let options = AssembleOptions {
        filter: ExtensionFilter::new(&config.pdf.extensions),
        folder: config.pdf.folder.clone(),
        naming: template(&config.pdf.name)?,
    };
    let assembler = PrintPdfAssembler::new(config.pdf.dpi);
    let report = assemble(&storage, &assembler, &options).or_raise(|| ErrorKind::Command("pdf"))?;
    println!(
        "wrote {} PDFs for {} folders, {} failures",
        report.written(),
        report.protocols.len(),
        report.failures.len()
    );
    Ok(())
}

fn run_resize(config: &Config, source: &Path, output: &Path) -> Result<()> {
    let source = open_source(source)?;
    let output = LocalBackend::create("output", output).or_raise(|| ErrorKind::Directory(output.to_path_buf()))?;
    let codec = config.codec.build().or_raise(|| ErrorKind::Codec)?;
    let options = ResizeOptions {
        filter: ExtensionFilter::new(&config.resize.extensions),
        bounds: config.resize.bounds().or_raise(|| ErrorKind::Config)?,
        quality: config.resize.quality,
    };
    let report = resize(&*source, &output, &*codec, &options).or_raise(|| ErrorKind::Command("resize"))?;
    println!("converted {} images, {} failures", report.converted, report.failures.len());
    Ok(())
}

fn run_collect(config: &Config, source: &Path, output: &Path) -> Result<()> {
    let source = open_source(source)?;
    let output = LocalBackend::create("output", output).or_raise(|| ErrorKind::Directory(output.to_path_buf()))?;
    let options = CollectOptions { folder: config.collect.folder.clone() };
    let report = collect(&*source, &output, &options).or_raise(|| ErrorKind::Command("collect"))?;
    println!("copied {} files, {} failures", report.copied(), report.failures.len());
    Ok(())
}

fn run_audit(config: &Config, root: &Path) -> Result<()> {
    let storage = open_source(root)?;
    let incomplete = audit(&*storage, &config.skip, &config.pdf.folder).or_raise(|| ErrorKind::Command("audit"))?;
    for folder in &incomplete {
        println!("{}\t{}\t{}", root.join(&folder.path).display(), folder.size, folder.reason);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use image::{DynamicImage, ImageFormat};
    use std::fs;

    fn write_tiff(path: &Path, width: u32, height: u32) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        DynamicImage::new_rgb8(width, height).save_with_format(path, ImageFormat::Tiff).unwrap();
    }

    fn arkiv(args: &[&str]) -> Result<()> {
        run(&Cli::parse_from(std::iter::once("arkiv").chain(args.iter().copied())))
    }

    #[test]
    fn test_convert_then_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("scans");
        let output = dir.path().join("out");
        for page in ["page1", "page2", "page10"] {
            write_tiff(&source.join("AAB 1").join(format!("{page}.tif")), 40, 20);
        }
        fs::write(source.join("AAB 1/notes.txt"), "notes").unwrap();
        let (source_arg, output_arg) = (source.to_str().unwrap(), output.to_str().unwrap());

        arkiv(&["convert", source_arg, output_arg, "--max-width", "20"]).unwrap();
        let jpgs = output.join("AAB 1/jpgs");
        for page in ["page1", "page2", "page10"] {
            let decoded = image::open(jpgs.join(format!("{page}.jpg"))).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (20, 10));
        }
        assert!(jpgs.join(".arkiv-manifest.json").is_file());
        assert!(!jpgs.join("notes.jpg").exists());

        arkiv(&["pdf", output_arg]).unwrap();
        let pdf = fs::read(output.join("AAB 1/AAB 1.pdf")).unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        // Nothing is rewritten by a second pass.
        let before = fs::metadata(jpgs.join("page1.jpg")).unwrap().modified().unwrap();
        arkiv(&["convert", source_arg, output_arg]).unwrap();
        arkiv(&["pdf", output_arg]).unwrap();
        assert_eq!(fs::metadata(jpgs.join("page1.jpg")).unwrap().modified().unwrap(), before);
        assert_eq!(fs::read(output.join("AAB 1/AAB 1.pdf")).unwrap(), pdf);
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let output = dir.path().join("out");
        let err = arkiv(&["convert", missing.to_str().unwrap(), output.to_str().unwrap()]).unwrap_err();
        assert_eq!(*err, ErrorKind::Directory(missing));
    }

    #[test]
    fn test_collect_and_audit() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        fs::create_dir_all(first.join("AAB 1/jpgs")).unwrap();
        fs::write(first.join("AAB 1/jpgs/0001.jpg"), "jpeg").unwrap();

        arkiv(&["collect", first.to_str().unwrap(), second.to_str().unwrap()]).unwrap();
        assert_eq!(fs::read(second.join("AAB 1/jpgs/0001.jpg")).unwrap(), b"jpeg");
        arkiv(&["audit", second.to_str().unwrap()]).unwrap();
    }
}
