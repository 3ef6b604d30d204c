//! Color-model normalization: any decoded layout to 8-bit RGB.
//! Alpha is composited onto white before the channel is dropped.

use image::{DynamicImage, Rgb, RgbImage, RgbaImage};

use crate::error::PipelineError;

pub fn normalize_to_rgb(image: DynamicImage) -> Result<RgbImage, PipelineError> {
    match image {
        DynamicImage::ImageRgb8(rgb) => Ok(rgb),
        opaque @ (DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgb32F(_)) => Ok(opaque.to_rgb8()),
        alpha @ (DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgba8(_)
        | DynamicImage::ImageRgba16(_)
        | DynamicImage::ImageRgba32F(_)) => Ok(flatten_on_white(&alpha.to_rgba8())),
        other => Err(PipelineError::UnsupportedColorMode {
            color: format!("{:?}", other.color()),
        }),
    }
}

fn flatten_on_white(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}
