//! # Configuration Module
//!
//! Configuration structures and validation for the preprocessing pipeline.
//! It serves as the common interface between the CLI, JSON configuration files
//! and the library entry points. Nothing in the decision path reads module-level
//! constants: every tunable travels in one of these structs.
//!
//! ## Pipeline Parameters
//!
//! | Parameter | Type | Default | Description |
//! |-----------|------|---------|-------------|
//! | `max_pixels` | `u64` | 20 000 000 | Pre-scale budget before optimization |
//! | `optimizer.step_ratio` | `f64` | 0.98 | Per-step shrink factor |
//! | `optimizer.min_short_side` | `u32` | 500 | Floor on the shorter side |
//! | `optimizer.plateau_steps` | `u32` | 8 | Consecutive stalled steps before giving up |
//! | `optimizer.plateau_threshold` | `f64` | 0.005 | Relative gain counted as stalled |
//! | `optimizer.target_multiplier` | `f64` | 1.5 | Target = baseline × multiplier |
//! | `screen.max_width` | `u32` | 1920 | Screen-fit box width |
//! | `screen.max_height` | `u32` | 1080 | Screen-fit box height |
//! | `screen.threshold` | `u32` | 2000 | Side length that triggers screen fit |
//! | `save.dpi` | `u16` | 300 | Density written to JPEG metadata |
//! | `save.jpeg_quality` | `u8` | 100 | JPEG quality (1-100) |
//!
//! ## Examples
//!
//! ```rust
//! use imgpre::config::PipelineConfig;
//!
//! let mut config = PipelineConfig::default();
//! config.optimizer.min_short_side = 300;
//! config.screen.threshold = 1600;
//! assert!(config.validate().is_ok());
//!
//! config.optimizer.step_ratio = 1.2;
//! assert!(config.validate().is_err());
//! ```

use std::path::Path;

use imgpre_scale::plan::{fit_within, Size};
use imgpre_scale::ResampleFilter;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Parameters of the adaptive optimization loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Multiplicative shrink applied per step, in `(0, 1)`.
    pub step_ratio: f64,

    /// The loop never produces an image whose shorter side is below this.
    pub min_short_side: u32,

    /// Number of consecutive low-gain steps that ends the search.
    pub plateau_steps: u32,

    /// Relative score gain below which a step counts toward the plateau.
    pub plateau_threshold: f64,

    /// Target score as a multiple of the baseline score.
    pub target_multiplier: f64,

    /// Absolute lower bound on the target score. `0.0` disables it.
    pub min_target: f64,

    /// Target multiplier used instead of `target_multiplier` for images the
    /// pre-scale guard already shrank, when their baseline exceeds
    /// `min_target`. `None` disables it.
    pub prescaled_target_multiplier: Option<f64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            step_ratio: 0.98,
            min_short_side: 500,
            plateau_steps: 8,
            plateau_threshold: 0.005,
            target_multiplier: 1.5,
            min_target: 0.0,
            prescaled_target_multiplier: None,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.step_ratio > 0.0 && self.step_ratio < 1.0) {
            return Err(format!("step ratio must be in (0, 1), got {}", self.step_ratio));
        }
        if self.min_short_side == 0 {
            return Err("minimum short side must be greater than 0".to_string());
        }
        if self.plateau_steps == 0 {
            return Err("plateau steps must be greater than 0".to_string());
        }
        if !self.plateau_threshold.is_finite() {
            return Err("plateau threshold must be finite".to_string());
        }
        if !(self.target_multiplier.is_finite() && self.target_multiplier >= 0.0) {
            return Err(format!(
                "target multiplier must be finite and non-negative, got {}",
                self.target_multiplier
            ));
        }
        if !(self.min_target.is_finite() && self.min_target >= 0.0) {
            return Err(format!("minimum target must be finite and non-negative, got {}", self.min_target));
        }
        if let Some(m) = self.prescaled_target_multiplier {
            if !(m.is_finite() && m >= 0.0) {
                return Err(format!("pre-scaled target multiplier must be finite and non-negative, got {m}"));
            }
        }
        Ok(())
    }

    /// Target score for an image whose baseline score is `baseline`.
    ///
    /// Computed once per image before the loop starts.
    pub fn target_for(&self, baseline: f64, prescaled: bool) -> f64 {
        match self.prescaled_target_multiplier {
            Some(m) if prescaled && baseline > self.min_target => baseline * m,
            _ => (baseline * self.target_multiplier).max(self.min_target),
        }
    }

    /// Upper bound on the number of resample steps the loop can take from `size`.
    ///
    /// Each step maps the shorter side `s` to `round(s * r)`, so
    /// `s_k - d <= r^k (s_0 - d)` with `d = 0.5 / (1 - r)`. When the floor sits
    /// too close to `d` for that to bound anything, fall back to the fact that
    /// every accepted step shrinks `w + h`.
    pub fn max_iterations(&self, size: Size) -> usize {
        let short = f64::from(size.short_side());
        let floor = f64::from(self.min_short_side);
        if short < floor {
            return 0;
        }
        let shrink_bound = size.w as usize + size.h as usize;
        let drift = 0.5 / (1.0 - self.step_ratio);
        if floor - drift < 1.0 {
            return shrink_bound;
        }
        let k = ((floor - drift) / (short - drift)).ln() / self.step_ratio.ln();
        (k.ceil().max(0.0) as usize + 1).min(shrink_bound)
    }
}

/// Final bounding-box fit for oversized outputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenFitConfig {
    pub max_width: u32,
    pub max_height: u32,
    /// Fit only applies when either side exceeds this.
    pub threshold: u32,
}

impl Default for ScreenFitConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            threshold: 2000,
        }
    }
}

impl ScreenFitConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err("screen box must be at least 1x1".to_string());
        }
        Ok(())
    }

    /// Output size for an image of `size`. Never larger than `size`.
    pub fn plan(&self, size: Size) -> Size {
        if size.w <= self.threshold && size.h <= self.threshold {
            return size;
        }
        fit_within(size, Size::new(self.max_width, self.max_height))
    }
}

/// Format-specific save parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// Pixel density written to the JFIF header of JPEG output.
    pub dpi: u16,
    pub jpeg_quality: u8,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            dpi: 300,
            jpeg_quality: 100,
        }
    }
}

impl SaveOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.dpi == 0 {
            return Err("DPI must be greater than 0".to_string());
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err("JPEG quality must be between 1 and 100".to_string());
        }
        Ok(())
    }
}

/// Complete configuration for one pipeline run (single image or batch).
///
/// # Examples
///
/// ```rust
/// use imgpre::config::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.max_pixels, 20_000_000);
/// assert_eq!(config.screen.max_width, 1920);
/// assert!(config.render_from_source);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pixel budget enforced before the optimization loop.
    pub max_pixels: u64,

    pub optimizer: OptimizerConfig,

    pub screen: ScreenFitConfig,

    pub save: SaveOptions,

    /// Convolution filter for every resample.
    pub filter: ResampleFilter,

    /// Shrink factor per step of a progressive resize, in `(0, 1)`.
    pub progressive_step: f64,

    /// Render the final image with one progressive resize of the pre-scaled
    /// buffer instead of keeping the loop's chain of 2% resamples.
    pub render_from_source: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_pixels: 20_000_000,
            optimizer: OptimizerConfig::default(),
            screen: ScreenFitConfig::default(),
            save: SaveOptions::default(),
            filter: ResampleFilter::Lanczos3,
            progressive_step: 0.9,
            render_from_source: true,
        }
    }
}

impl PipelineConfig {
    /// Validates every nested section.
    ///
    /// Time complexity: O(1) - constant-time range checks.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_pixels == 0 {
            return Err("pixel budget must be greater than 0".to_string());
        }
        if !(self.progressive_step > 0.0 && self.progressive_step < 1.0) {
            return Err(format!("progressive step must be in (0, 1), got {}", self.progressive_step));
        }
        self.optimizer.validate()?;
        self.screen.validate()?;
        self.save.validate()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| PipelineError::config(format!("{}: {e}", path.display())))?;
        config.validate().map_err(PipelineError::Config)?;
        Ok(config)
    }
}
