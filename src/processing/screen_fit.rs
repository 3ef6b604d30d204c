//! # Screen-Fit Constrainer
//!
//! Final proportional fit into a display bounding box, applied only when a side
//! exceeds the configured threshold. Never upsamples.

use image::RgbImage;
use imgpre_scale::ScaleError;
use tracing::debug;

use super::resample::{image_size, Resampler};
use crate::config::ScreenFitConfig;

pub fn screen_fit(resampler: &mut Resampler, image: RgbImage, config: &ScreenFitConfig) -> Result<RgbImage, ScaleError> {
    let size = image_size(&image);
    let target = config.plan(size);
    if target == size {
        return Ok(image);
    }
    debug!(from = %size, to = %target, "fitting to screen box");
    resampler.resize(&image, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn cfg(max_width: u32, max_height: u32, threshold: u32) -> ScreenFitConfig {
        ScreenFitConfig {
            max_width,
            max_height,
            threshold,
        }
    }

    #[test]
    fn below_threshold_unchanged() {
        let mut resampler = Resampler::default();
        let img = RgbImage::from_pixel(200, 150, Rgb([9, 9, 9]));
        let out = screen_fit(&mut resampler, img.clone(), &cfg(192, 108, 200)).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn oversized_fits_box_preserving_aspect() {
        let mut resampler = Resampler::default();
        let img = RgbImage::from_fn(400, 300, |x, _| Rgb([x as u8, 0, 0]));
        let out = screen_fit(&mut resampler, img, &cfg(192, 108, 200)).unwrap();
        assert_eq!(out.dimensions(), (144, 108));
    }

    #[test]
    fn never_enlarges() {
        let mut resampler = Resampler::default();
        // Above the threshold but already inside the box.
        let img = RgbImage::from_pixel(250, 40, Rgb([1, 2, 3]));
        let out = screen_fit(&mut resampler, img, &cfg(1920, 1080, 200)).unwrap();
        assert_eq!(out.dimensions(), (250, 40));
    }
}
