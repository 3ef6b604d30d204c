//! # Pipeline Orchestrator
//!
//! Sequences the stages for one image:
//!
//! ```text
//! decode -> normalize -> (halve if oversized) -> pre-scale -> optimize
//!        -> (re-render from pre-scaled source) -> screen fit -> encode
//! ```
//!
//! Each stage consumes its input buffer and hands the superseding buffer to the
//! next one. The only state carried between images is the resampler's
//! coefficient cache.

use std::path::Path;

use image::RgbImage;
use imgpre_scale::Size;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::processing::{
    decode, encode, image_size, normalize_to_rgb, optimize, optimize_prescaled, pre_scale, screen_fit, Decoded,
    Optimized, PreScaled, Resampler, StopReason,
};

/// Summary of one processed image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedImage {
    /// Dimensions as decoded.
    pub source_size: Size,
    /// Dimensions the optimization loop settled on, before screen fit.
    pub optimized_size: Size,
    /// Dimensions written.
    pub size: Size,
    /// Whether the pre-scale guard (or the oversized-decode halving) shrank the source.
    pub prescaled: bool,
    pub baseline_score: f64,
    /// Score of the loop's last accepted candidate.
    pub final_score: f64,
    pub steps: usize,
    pub stop: StopReason,
}

/// In-memory result of [`Preprocessor::prepare`].
#[derive(Debug, Clone)]
pub struct Prepared {
    pub image: RgbImage,
    pub report: ProcessedImage,
}

/// Runs the pipeline with one configuration, reusing its resampler across images.
pub struct Preprocessor {
    config: PipelineConfig,
    resampler: Resampler,
}

impl Preprocessor {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate().map_err(PipelineError::Config)?;
        let resampler = Resampler::new(config.filter, config.progressive_step);
        Ok(Self { config, resampler })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Pre-scale, optimize and screen-fit an already normalized buffer.
    pub fn prepare(&mut self, image: RgbImage) -> PipelineResult<Prepared> {
        let source_size = image_size(&image);
        let PreScaled { image, scaled } = pre_scale(&mut self.resampler, image, self.config.max_pixels)?;

        // Keep the pre-scaled buffer only if the loop can actually move.
        let source = (self.config.render_from_source
            && self.config.optimizer.max_iterations(image_size(&image)) > 0)
            .then(|| image.clone());

        let optimized = if scaled {
            optimize_prescaled(&mut self.resampler, image, &self.config.optimizer)?
        } else {
            optimize(&mut self.resampler, image, &self.config.optimizer)?
        };
        let Optimized {
            image: optimized,
            baseline_score,
            final_score,
            steps,
            stop,
            ..
        } = optimized;

        let optimized_size = image_size(&optimized);
        let image = match source {
            Some(source) if steps > 0 => {
                drop(optimized);
                self.resampler.progressive_resize(source, optimized_size)?
            }
            _ => optimized,
        };

        let image = screen_fit(&mut self.resampler, image, &self.config.screen)?;
        let report = ProcessedImage {
            source_size,
            optimized_size,
            size: image_size(&image),
            prescaled: scaled,
            baseline_score,
            final_score,
            steps,
            stop,
        };
        Ok(Prepared { image, report })
    }

    /// Run the full pipeline on one file. Collaborator errors are returned unchanged.
    pub fn process_image(&mut self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> PipelineResult<ProcessedImage> {
        let (input, output) = (input.as_ref(), output.as_ref());

        let Decoded { image, oversized } = decode(input)?;
        let mut rgb = normalize_to_rgb(image)?;
        let decoded_size = image_size(&rgb);
        if oversized {
            let half = Size::new((decoded_size.w / 2).max(1), (decoded_size.h / 2).max(1));
            warn!(input = %input.display(), from = %decoded_size, to = %half, "halving oversized source");
            rgb = self.resampler.progressive_resize(rgb, half)?;
        }

        let Prepared { image, mut report } = self.prepare(rgb)?;
        report.source_size = decoded_size;
        report.prescaled |= oversized;

        encode(&image, output, &self.config.save)?;
        info!(
            input = %input.display(),
            output = %output.display(),
            from = %report.source_size,
            to = %report.size,
            stop = ?report.stop,
            steps = report.steps,
            "processed image"
        );
        Ok(report)
    }
}
