//! # ImgPre
//!
//! A perceptual image preprocessor. Instead of resizing to a fixed pixel size,
//! it shrinks an image step by step and stops once the image is sharp enough
//! (by Laplacian-variance score) or can no longer usefully shrink.
//!
//! ## Architecture
//!
//! - `processing`: the per-image stages (sharpness, pre-scale, optimizer, screen fit)
//!   and their collaborators (decode/encode, color normalization, resampling)
//! - `pipeline`: [`Preprocessor`], which sequences the stages for one file
//! - `batch`: directory mode and its per-file report
//! - `config`: tunables with serde defaults and validation
//! - `error`: the [`PipelineError`] taxonomy
//!
//! Resampling itself lives in the `imgpre-scale` workspace crate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use imgpre::{PipelineConfig, process_image};
//!
//! # fn example() -> Result<(), imgpre::PipelineError> {
//! let mut config = PipelineConfig::default();
//! config.save.dpi = 600;
//!
//! let report = process_image("scan.png", "scan_small.jpg", &config)?;
//! println!("{} -> {} after {} steps", report.source_size, report.size, report.steps);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod processing;

/// Re-export error types for convenience
pub use error::{PipelineError, PipelineResult};

pub use batch::{BatchEntry, BatchReport};
pub use config::{OptimizerConfig, PipelineConfig, SaveOptions, ScreenFitConfig};
pub use imgpre_scale::{ResampleFilter, Size};
pub use pipeline::{Prepared, ProcessedImage, Preprocessor};
pub use processing::StopReason;

/// Process one file with `config`. See [`Preprocessor::process_image`].
pub fn process_image(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &PipelineConfig,
) -> PipelineResult<ProcessedImage> {
    Preprocessor::new(config.clone())?.process_image(input, output)
}

/// Process every image in a directory with `config`. See [`Preprocessor::process_batch`].
pub fn process_batch(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &PipelineConfig,
) -> PipelineResult<BatchReport> {
    Preprocessor::new(config.clone())?.process_batch(input_dir, output_dir)
}
