//! # Pre-Scale Guard
//!
//! Bounds the working image's pixel count before any iterative work. Keeps both
//! the cost of repeated scoring and peak memory in check for 50MP+ sources,
//! independent of what the optimization loop later decides.

use image::RgbImage;
use imgpre_scale::plan::cap_pixels;
use imgpre_scale::ScaleError;
use tracing::debug;

use super::resample::{image_size, Resampler};

/// Output of [`pre_scale`].
#[derive(Debug, Clone)]
pub struct PreScaled {
    pub image: RgbImage,
    /// Whether the guard had to shrink the image.
    pub scaled: bool,
}

/// Shrink `image` to the largest aspect-preserving size within `max_pixels`.
/// Images already within budget are returned untouched.
pub fn pre_scale(resampler: &mut Resampler, image: RgbImage, max_pixels: u64) -> Result<PreScaled, ScaleError> {
    let size = image_size(&image);
    let target = cap_pixels(size, max_pixels);
    if target == size {
        return Ok(PreScaled { image, scaled: false });
    }
    debug!(from = %size, to = %target, max_pixels, "pre-scaling oversized image");
    let image = resampler.progressive_resize(image, target)?;
    Ok(PreScaled { image, scaled: true })
}
