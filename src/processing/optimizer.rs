//! # Adaptive Optimization Loop
//!
//! Searches downward in small multiplicative steps for the size at which the
//! image's sharpness score reaches an adaptive target. Downscaling concentrates
//! detail per pixel, which usually raises the score until it levels off; the
//! score has no invertible relation to scale for arbitrary content, so the loop
//! measures instead of solving.
//!
//! Each iteration checks, in order:
//! 1. **Floor**: the next step would put the shorter side below
//!    `min_short_side` (or would not shrink at all) → stop, keep the current image
//! 2. **Target**: the candidate scores at least the target → stop, keep the candidate
//! 3. **Plateau**: `plateau_steps` consecutive steps gained less than
//!    `plateau_threshold` → stop, keep the candidate
//!
//! Every accepted step strictly shrinks the image, so the loop terminates;
//! [`OptimizerConfig::max_iterations`] gives the bound.

use image::RgbImage;
use imgpre_scale::plan::scale_uniform;
use imgpre_scale::ScaleError;
use serde::Serialize;
use tracing::{debug, trace};

use super::resample::{image_size, Resampler};
use super::sharpness::sharpness_score;
use crate::config::OptimizerConfig;

/// Guards the relative-gain division when the previous score is zero.
const SCORE_EPSILON: f64 = 1e-12;

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StopReason {
    Floor,
    Target,
    Plateau,
}

/// Result of one optimization run.
#[derive(Debug, Clone)]
pub struct Optimized {
    pub image: RgbImage,
    pub baseline_score: f64,
    pub target_score: f64,
    pub final_score: f64,
    /// Number of accepted resample steps.
    pub steps: usize,
    pub stop: StopReason,
}

/// Optimize an image that did not go through the pre-scale guard.
pub fn optimize(resampler: &mut Resampler, image: RgbImage, config: &OptimizerConfig) -> Result<Optimized, ScaleError> {
    run(resampler, image, config, false)
}

/// Optimize an image the pre-scale guard already shrank. Identical to
/// [`optimize`] unless `prescaled_target_multiplier` is configured.
pub fn optimize_prescaled(
    resampler: &mut Resampler,
    image: RgbImage,
    config: &OptimizerConfig,
) -> Result<Optimized, ScaleError> {
    run(resampler, image, config, true)
}

fn run(
    resampler: &mut Resampler,
    image: RgbImage,
    config: &OptimizerConfig,
    prescaled: bool,
) -> Result<Optimized, ScaleError> {
    let baseline_score = sharpness_score(&image);
    let target_score = config.target_for(baseline_score, prescaled);
    debug!(
        size = %image_size(&image),
        baseline_score,
        target_score,
        bound = config.max_iterations(image_size(&image)),
        "starting optimization"
    );

    let mut current = image;
    let mut current_score = baseline_score;
    let mut previous_score = baseline_score;
    let mut plateau = 0u32;
    let mut steps = 0usize;

    let stop = loop {
        let size = image_size(&current);
        let next = scale_uniform(size, config.step_ratio);
        if next.short_side() < config.min_short_side || (next.w >= size.w && next.h >= size.h) {
            break StopReason::Floor;
        }

        current = resampler.resize(&current, next)?;
        current_score = sharpness_score(&current);
        steps += 1;

        if current_score >= target_score {
            break StopReason::Target;
        }

        let delta = (current_score - previous_score) / previous_score.max(SCORE_EPSILON);
        if delta < config.plateau_threshold {
            plateau += 1;
        } else {
            plateau = 0;
        }
        trace!(step = steps, size = %next, score = current_score, delta, plateau, "optimization step");
        if plateau >= config.plateau_steps {
            break StopReason::Plateau;
        }
        previous_score = current_score;
    };

    debug!(
        size = %image_size(&current),
        steps,
        final_score = current_score,
        stop = ?stop,
        "optimization finished"
    );
    Ok(Optimized {
        image: current,
        baseline_score,
        target_score,
        final_score: current_score,
        steps,
        stop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Deterministic value noise, blurred so downscaling has something to gain.
    fn textured(w: u32, h: u32, sigma: f32) -> RgbImage {
        let mut state = 0x2545_f491u32;
        let img = RgbImage::from_fn(w, h, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let v = (state & 0xff) as u8;
            Rgb([v, v.wrapping_mul(3), 255 - v])
        });
        if sigma > 0.0 { image::imageops::blur(&img, sigma) } else { img }
    }

    fn small_floor(min_short_side: u32) -> OptimizerConfig {
        OptimizerConfig {
            min_short_side,
            ..OptimizerConfig::default()
        }
    }

    #[test]
    fn below_floor_is_untouched() {
        let mut resampler = Resampler::default();
        let img = textured(400, 300, 1.0);
        let out = optimize(&mut resampler, img.clone(), &OptimizerConfig::default()).unwrap();
        assert_eq!(out.image.dimensions(), (400, 300));
        assert_eq!(out.image, img);
        assert_eq!(out.stop, StopReason::Floor);
        assert_eq!(out.steps, 0);
    }

    #[test]
    fn floor_exactly_at_min_is_untouched() {
        let mut resampler = Resampler::default();
        let out = optimize(&mut resampler, textured(120, 100, 0.0), &small_floor(100)).unwrap();
        assert_eq!(out.image.dimensions(), (120, 100));
        assert_eq!(out.stop, StopReason::Floor);
    }

    #[test]
    fn uniform_image_stops_at_first_check() {
        let mut resampler = Resampler::default();
        let img = RgbImage::from_pixel(200, 150, Rgb([128, 128, 128]));
        let out = optimize(&mut resampler, img, &small_floor(100)).unwrap();
        assert_eq!(out.baseline_score, 0.0);
        assert_eq!(out.target_score, 0.0);
        assert_eq!(out.stop, StopReason::Target);
        assert_eq!(out.steps, 1);
        assert_eq!(out.image.dimensions(), (196, 147));
    }

    #[test]
    fn target_multiplier_at_or_below_one_fires_immediately() {
        let mut resampler = Resampler::default();
        let cfg = OptimizerConfig {
            target_multiplier: 0.0,
            ..small_floor(50)
        };
        let out = optimize(&mut resampler, textured(160, 120, 1.5), &cfg).unwrap();
        assert_eq!(out.stop, StopReason::Target);
        assert_eq!(out.steps, 1);
    }

    #[test]
    fn plateau_stops_after_configured_steps() {
        let mut resampler = Resampler::default();
        let cfg = OptimizerConfig {
            min_short_side: 40,
            plateau_steps: 3,
            plateau_threshold: 10.0,
            target_multiplier: 1e6,
            ..OptimizerConfig::default()
        };
        let out = optimize(&mut resampler, textured(200, 160, 1.0), &cfg).unwrap();
        assert_eq!(out.stop, StopReason::Plateau);
        assert_eq!(out.steps, 3);
    }

    #[test]
    fn never_crosses_the_floor_and_respects_bound() {
        let mut resampler = Resampler::default();
        for (w, h, sigma) in [(300, 200, 0.0), (260, 400, 2.0), (181, 181, 3.0)] {
            let cfg = OptimizerConfig {
                target_multiplier: 1e6,
                plateau_steps: u32::MAX,
                ..small_floor(120)
            };
            let img = textured(w, h, sigma);
            let bound = cfg.max_iterations(image_size(&img));
            let out = optimize(&mut resampler, img, &cfg).unwrap();
            let (ow, oh) = out.image.dimensions();
            assert!(ow.min(oh) >= 120, "{w}x{h} -> {ow}x{oh}");
            assert_eq!(out.stop, StopReason::Floor);
            assert!(out.steps <= bound, "{} steps > bound {bound}", out.steps);
            // One more step would have crossed the floor.
            assert!(scale_uniform(image_size(&out.image), cfg.step_ratio).short_side() < 120);
        }
    }

    #[test]
    fn aspect_ratio_is_preserved() {
        let mut resampler = Resampler::default();
        let out = optimize(&mut resampler, textured(400, 200, 2.0), &small_floor(100)).unwrap();
        let (w, h) = out.image.dimensions();
        // Per-side rounding lets the ratio wander by a few pixels at most.
        assert!((f64::from(w) / f64::from(h) - 2.0).abs() < 0.05, "{w}x{h}");
    }

    #[test]
    fn target_is_fixed_from_baseline() {
        let mut resampler = Resampler::default();
        let cfg = small_floor(80);
        let out = optimize(&mut resampler, textured(240, 180, 2.5), &cfg).unwrap();
        assert_eq!(out.target_score, out.baseline_score * cfg.target_multiplier);
        if out.stop == StopReason::Target {
            assert!(out.final_score >= out.target_score);
        }
    }

    #[test]
    fn prescaled_variant_uses_its_multiplier() {
        let mut resampler = Resampler::default();
        let cfg = OptimizerConfig {
            prescaled_target_multiplier: Some(0.0),
            ..small_floor(50)
        };
        let img = textured(160, 120, 1.0);
        let plain = optimize(&mut resampler, img.clone(), &cfg).unwrap();
        let pre = optimize_prescaled(&mut resampler, img, &cfg).unwrap();
        assert_eq!(pre.target_score, 0.0);
        assert_eq!(pre.stop, StopReason::Target);
        assert_eq!(plain.target_score, plain.baseline_score * 1.5);
    }
}
