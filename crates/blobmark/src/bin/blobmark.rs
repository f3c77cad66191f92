//! blobmark CLI: locate the dominant marker blob in an image.

use std::fs;
use std::path::{Path, PathBuf};

use blobmark::detect::{grey_image, locate_image, render_image};
use blobmark::{CornerSet, Isolation, LocateParams, MarkerLocator, Region};
use clap::{Parser, Subcommand};
use image::ImageReader;
use serde::Serialize;

#[cfg(not(feature = "tracing"))]
use log::LevelFilter;
use log::{info, warn};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "blobmark")]
#[command(about = "Locate a high-contrast rectangular marker in an image")]
#[command(version)]
struct Cli {
    /// Log pipeline stages at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the dominant region and its corners; prints a JSON report.
    Locate {
        /// Input image (any format the `image` crate decodes).
        input: PathBuf,

        /// JSON file with `LocateParams`; missing fields take defaults.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Threshold offset subtracted from the local mean.
        #[arg(long, allow_hyphen_values = true)]
        c: Option<f64>,

        /// Keep every labeled pixel inside the region's bounding box.
        #[arg(long)]
        bound: bool,

        /// Skip corner location.
        #[arg(long)]
        no_corners: bool,

        /// Write the colourised isolated region as PNG.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the JSON report here instead of stdout.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Write the luminance of an image as a grey RGBA image.
    Grey { input: PathBuf, output: PathBuf },
}

#[derive(Debug, Serialize)]
struct LocateReport {
    input: String,
    width: u32,
    height: u32,
    detected: bool,
    region_count: usize,
    region: Option<Region>,
    corners: Option<CornerSet>,
    error: Option<String>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Locate {
            input,
            config,
            c,
            bound,
            no_corners,
            output,
            report,
        } => {
            let mut params = load_params(config.as_deref())?;
            if let Some(c) = c {
                params.threshold.c = c;
            }
            if bound {
                params.isolation = Isolation::Bound;
            }
            if no_corners {
                params.find_corners = false;
            }
            run_locate(&input, params, output.as_deref(), report.as_deref())
        }
        Commands::Grey { input, output } => run_grey(&input, &output),
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: bool) -> CliResult<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    blobmark::core::init_with_level(level)?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: bool) -> CliResult<()> {
    let _ = tracing_log::LogTracer::init();
    blobmark::core::init_tracing(false);
    Ok(())
}

fn load_params(path: Option<&Path>) -> CliResult<LocateParams> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(LocateParams::default()),
    }
}

fn load_image(path: &Path) -> CliResult<image::RgbaImage> {
    let img = ImageReader::open(path)
        .map_err(|e| -> CliError { format!("failed to open {}: {e}", path.display()).into() })?
        .decode()?;
    Ok(img.to_rgba8())
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
fn run_locate(
    input: &Path,
    params: LocateParams,
    output: Option<&Path>,
    report_path: Option<&Path>,
) -> CliResult<()> {
    let img = load_image(input)?;
    info!("loaded {} ({}x{})", input.display(), img.width(), img.height());

    let locator = MarkerLocator::new(params);
    let mut report = LocateReport {
        input: input.to_string_lossy().into_owned(),
        width: img.width(),
        height: img.height(),
        detected: false,
        region_count: 0,
        region: None,
        corners: None,
        error: None,
    };

    match locate_image(&locator, &img) {
        Ok(found) => {
            report.detected = true;
            report.region_count = found.region_count;
            report.region = Some(found.region);
            report.corners = found.corners;
            if let Some(path) = output {
                render_image(&found)?.save(path)?;
                info!("isolated region written to {}", path.display());
            }
        }
        Err(e) if e.is_not_detected() => {
            warn!("marker not detected: {e}");
            report.error = Some(e.to_string());
        }
        Err(e) => return Err(e.into()),
    }

    write_report(report_path, &report)
}

fn run_grey(input: &Path, output: &Path) -> CliResult<()> {
    let img = load_image(input)?;
    grey_image(&img)?.save(output)?;
    info!("grey image written to {}", output.display());
    Ok(())
}

fn write_report(path: Option<&Path>, report: &LocateReport) -> CliResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    match path {
        Some(path) => {
            fs::write(path, json)?;
            info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
