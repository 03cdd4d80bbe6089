use arkiv_config::Config;
use arkiv_imaging::{CodecKind, Quality};
use arkiv_library::{DEFAULT_SIZE_THRESHOLD, SkipPolicy};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "arkiv", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (toml, yaml or json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More logging; repeat for trace output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert protocol folders of scans into `<name>/jpgs` folders
    Convert(ConvertArgs),
    /// Assemble one PDF per protocol folder from its JPEGs
    Pdf(PdfArgs),
    /// Convert every image below a directory into one flat folder of JPEGs
    Resize(ResizeArgs),
    /// Copy finished `jpgs` folders into another tree
    Collect(CollectArgs),
    /// List `jpgs` folders that do not look finished
    Audit(AuditArgs),
}

#[derive(Debug, Args)]
pub struct ScaleArgs {
    /// Shrink images wider than this many pixels
    #[arg(long, value_name = "PIXELS")]
    pub max_width: Option<u32>,

    /// Shrink images taller than this many pixels
    #[arg(long, value_name = "PIXELS")]
    pub max_height: Option<u32>,

    /// JPEG quality (1-100)
    #[arg(long, value_parser = parse_quality)]
    pub quality: Option<Quality>,

    /// Image decoder
    #[arg(long, value_parser = parse_codec)]
    pub codec: Option<CodecKind>,
}

#[derive(Debug, Args)]
pub struct SkipArgs {
    /// When an output folder counts as done
    #[arg(long, value_enum)]
    pub skip: Option<SkipArg>,

    /// Byte threshold for `--skip size-threshold`
    #[arg(long, value_name = "BYTES", requires = "skip")]
    pub threshold: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SkipArg {
    Manifest,
    SizeThreshold,
    Never,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Directory holding the protocol folders
    pub source: PathBuf,
    /// Directory the JPEG folders are written to
    pub output: PathBuf,
    #[command(flatten)]
    pub scale: ScaleArgs,
    #[command(flatten)]
    pub skip: SkipArgs,
}

#[derive(Debug, Args)]
pub struct PdfArgs {
    /// Output directory of a previous `convert` run
    pub root: PathBuf,
    /// Density assumed for JPEGs that declare none
    #[arg(long)]
    pub dpi: Option<f32>,
}

#[derive(Debug, Args)]
pub struct ResizeArgs {
    pub source: PathBuf,
    pub output: PathBuf,
    #[command(flatten)]
    pub scale: ScaleArgs,
}

#[derive(Debug, Args)]
pub struct CollectArgs {
    pub source: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Output directory to check
    pub root: PathBuf,
    #[command(flatten)]
    pub skip: SkipArgs,
}

impl Command {
    /// Apply command line options on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        match self {
            Self::Convert(args) => {
                let convert = &mut config.convert;
                args.scale.apply(&mut config.codec, &mut convert.max_width, &mut convert.max_height, &mut convert.quality);
                args.skip.apply(&mut config.skip);
            },
            Self::Resize(args) => {
                let resize = &mut config.resize;
                args.scale.apply(&mut config.codec, &mut resize.max_width, &mut resize.max_height, &mut resize.quality);
            },
            Self::Pdf(args) => {
                if let Some(dpi) = args.dpi {
                    config.pdf.dpi = dpi;
                }
            },
            Self::Audit(args) => args.skip.apply(&mut config.skip),
            Self::Collect(_) => {},
        }
    }
}

impl ScaleArgs {
    fn apply(&self, codec: &mut CodecKind, width: &mut Option<u32>, height: &mut Option<u32>, quality: &mut Quality) {
        if let Some(kind) = self.codec {
            *codec = kind;
        }
        if self.max_width.is_some() {
            *width = self.max_width;
        }
        if self.max_height.is_some() {
            *height = self.max_height;
        }
        if let Some(q) = self.quality {
            *quality = q;
        }
    }
}

impl SkipArgs {
    fn apply(&self, policy: &mut SkipPolicy) {
        *policy = match (self.skip, self.threshold) {
            (None, _) => return,
            (Some(SkipArg::Manifest), _) => SkipPolicy::Manifest,
            (Some(SkipArg::Never), _) => SkipPolicy::Never,
            (Some(SkipArg::SizeThreshold), bytes) => SkipPolicy::SizeThreshold {
                bytes: bytes.unwrap_or(match *policy {
                    SkipPolicy::SizeThreshold { bytes } => bytes,
                    _ => DEFAULT_SIZE_THRESHOLD,
                }),
            },
        };
    }
}

fn parse_quality(s: &str) -> Result<Quality, String> {
    let value: u8 = s.parse().map_err(|_| format!("`{s}` is not a number between 1 and 100"))?;
    Quality::try_from(value).map_err(|e| e.to_string())
}

fn parse_codec(s: &str) -> Result<CodecKind, String> {
    s.parse::<CodecKind>().map_err(|e| (*e).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_overrides() {
        let cli = Cli::parse_from([
            "arkiv", "-vv", "convert", "in", "out", "--max-height", "3000", "--quality", "80", "--codec", "magick",
            "--skip", "size-threshold", "--threshold", "4096",
        ]);
        assert_eq!(cli.verbose, 2);
        let mut config = Config::default();
        cli.command.apply(&mut config);
        assert_eq!(config.convert.max_height, Some(3000));
        assert_eq!(config.convert.max_width, None);
        assert_eq!(config.convert.quality.get(), 80);
        assert_eq!(config.codec, CodecKind::Magick);
        assert_eq!(config.skip, SkipPolicy::SizeThreshold { bytes: 4096 });
        // Resize settings are untouched by convert options.
        assert_eq!(config.resize.max_height, None);
    }

    #[rstest]
    #[case(&["--skip", "never"], SkipPolicy::Never)]
    #[case(&["--skip", "size-threshold"], SkipPolicy::SizeThreshold { bytes: DEFAULT_SIZE_THRESHOLD })]
    #[case(&[], SkipPolicy::Manifest)]
    fn test_audit_skip(#[case] extra: &[&str], #[case] expected: SkipPolicy) {
        let args = ["arkiv", "audit", "out"].iter().chain(extra).copied();
        let cli = Cli::parse_from(args);
        let mut config = Config::default();
        cli.command.apply(&mut config);
        assert_eq!(config.skip, expected);
    }

    #[rstest]
    #[case("0")]
    #[case("101")]
    #[case("high")]
    fn test_rejects_bad_quality(#[case] quality: &str) {
        let result = Cli::try_parse_from(["arkiv", "resize", "in", "out", "--quality", quality]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["arkiv", "-q", "-v", "collect", "a", "b"]).is_err());
    }
}
