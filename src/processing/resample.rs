//! `RgbImage` front end to the `imgpre-scale` CPU resampler.

use fast_image_resize::Resizer;
use image::RgbImage;
use imgpre_scale::cpu::{resize_rgb_cpu, resize_rgb_progressive};
use imgpre_scale::{ResampleFilter, ScaleError, Size};

/// Owns the SIMD resizer state and the filter choice for one pipeline.
///
/// The inner `Resizer` caches convolution coefficients between calls, so a
/// single instance is reused across every stage of an image and across images
/// of a batch.
pub struct Resampler {
    resizer: Resizer,
    filter: ResampleFilter,
    progressive_step: f64,
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new(ResampleFilter::Lanczos3, 0.9)
    }
}

impl Resampler {
    pub fn new(filter: ResampleFilter, progressive_step: f64) -> Self {
        Self {
            resizer: Resizer::new(),
            filter,
            progressive_step,
        }
    }

    pub fn filter(&self) -> ResampleFilter {
        self.filter
    }

    /// Single-pass resample of `image` to `to`.
    pub fn resize(&mut self, image: &RgbImage, to: Size) -> Result<RgbImage, ScaleError> {
        let from = image_size(image);
        if from == to {
            return Ok(image.clone());
        }
        let buf = resize_rgb_cpu(&mut self.resizer, image.as_raw(), from, to, self.filter)?;
        into_image(to, buf)
    }

    /// Multi-step resample for large reductions. Returns `image` itself when
    /// it is already `to`.
    pub fn progressive_resize(&mut self, image: RgbImage, to: Size) -> Result<RgbImage, ScaleError> {
        let from = image_size(&image);
        if from == to {
            return Ok(image);
        }
        let buf = resize_rgb_progressive(
            &mut self.resizer,
            image.as_raw(),
            from,
            to,
            self.progressive_step,
            self.filter,
        )?;
        into_image(to, buf)
    }
}

pub fn image_size(image: &RgbImage) -> Size {
    let (w, h) = image.dimensions();
    Size::new(w, h)
}

fn into_image(size: Size, buf: Vec<u8>) -> Result<RgbImage, ScaleError> {
    let actual = buf.len();
    RgbImage::from_raw(size.w, size.h, buf).ok_or(ScaleError::BufferSize {
        size,
        expected: size.rgb_len(),
        actual,
    })
}
