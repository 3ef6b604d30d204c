use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use imgpre::{PipelineConfig, Preprocessor, ResampleFilter};
use tracing_subscriber::EnvFilter;

/// Sharpness-driven image resizer:
/// - single mode: one input file to one output file
/// - batch mode: every image in a directory, written under the same names
#[derive(Parser, Debug)]
#[command(name = "imgpre")]
#[command(version, about = "Shrink images until they are sharp enough, then fit them to a screen box")]
#[command(long_about = "Shrink images step by step until their Laplacian sharpness reaches a target
derived from the original, then optionally fit them into a screen-sized box.
Output format follows the output file extension.")]
struct Args {
    /// Input image (single mode)
    #[arg(required_unless_present = "batch")]
    input: Option<PathBuf>,

    /// Output image (single mode)
    #[arg(required_unless_present = "batch")]
    output: Option<PathBuf>,

    /// Process a whole directory instead of a single file
    #[arg(long, requires_all = ["input_dir", "output_dir"], conflicts_with_all = ["input", "output"])]
    batch: bool,

    /// Input directory (batch mode)
    #[arg(short = 'i', long)]
    input_dir: Option<PathBuf>,

    /// Output directory (batch mode, created if missing)
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Screen-fit box width
    #[arg(long)]
    max_width: Option<u32>,

    /// Screen-fit box height
    #[arg(long)]
    max_height: Option<u32>,

    /// Screen fit applies only when a side exceeds this many pixels
    #[arg(long)]
    threshold: Option<u32>,

    /// Resolution recorded in saved files
    #[arg(long)]
    dpi: Option<u16>,

    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u8>,

    /// Optimizer floor for the short side
    #[arg(long)]
    min_short_side: Option<u32>,

    /// Pixel budget for the pre-scale guard
    #[arg(long)]
    max_pixels: Option<u64>,

    /// Relative score gain below which a step counts toward the plateau
    #[arg(long)]
    plateau_threshold: Option<f64>,

    /// Resampling filter
    #[arg(long, value_enum)]
    filter: Option<ResampleFilter>,

    /// JSON configuration file; flags above override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON report of the run to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = build_config(&args)?;
    let mut preprocessor = Preprocessor::new(config).context("invalid configuration")?;

    if args.batch {
        // clap enforces both directories in batch mode
        let (Some(input_dir), Some(output_dir)) = (&args.input_dir, &args.output_dir) else {
            bail!("--batch needs --input-dir and --output-dir");
        };
        let report = preprocessor
            .process_batch(input_dir, output_dir)
            .with_context(|| format!("batch over {} failed", input_dir.display()))?;
        for (name, error) in report.failures() {
            eprintln!("{name}: {error}");
        }
        println!("Done! {} processed, {} errors.", report.succeeded(), report.failed());
        if let Some(path) = &args.report {
            write_report(path, &report.to_json_pretty()?)?;
        }
    } else {
        let (Some(input), Some(output)) = (&args.input, &args.output) else {
            bail!("expected INPUT and OUTPUT paths, or --batch");
        };
        let done = preprocessor
            .process_image(input, output)
            .with_context(|| format!("failed to process {}", input.display()))?;
        println!("Done! {} -> {} ({} steps)", done.source_size, done.size, done.steps);
        if let Some(path) = &args.report {
            write_report(path, &serde_json::to_string_pretty(&done)?)?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Defaults, then the optional JSON file, then individual flags.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(v) = args.max_width {
        config.screen.max_width = v;
    }
    if let Some(v) = args.max_height {
        config.screen.max_height = v;
    }
    if let Some(v) = args.threshold {
        config.screen.threshold = v;
    }
    if let Some(v) = args.dpi {
        config.save.dpi = v;
    }
    if let Some(v) = args.quality {
        config.save.jpeg_quality = v;
    }
    if let Some(v) = args.min_short_side {
        config.optimizer.min_short_side = v;
    }
    if let Some(v) = args.max_pixels {
        config.max_pixels = v;
    }
    if let Some(v) = args.plateau_threshold {
        config.optimizer.plateau_threshold = v;
    }
    if let Some(v) = args.filter {
        config.filter = v;
    }
    Ok(config)
}

fn write_report(path: &Path, json: &str) -> Result<()> {
    fs::write(path, json).with_context(|| format!("failed to write report to {}", path.display()))
}
