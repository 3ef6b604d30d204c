// SPDX-License-Identifier: MIT
// CPU scaler built on fast_image_resize (SIMD-accelerated).
// RGB8 in -> RGB8 out, tightly packed rows.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x3;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::{progressive_steps, Size};

#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("RGB buffer for {size} must hold {expected} bytes, got {actual}")]
    BufferSize {
        size: Size,
        expected: usize,
        actual: usize,
    },
    #[error("cannot resample to or from an empty size {0}")]
    EmptySize(Size),
    #[error("fast image resize error: {0}")]
    Fir(#[from] fir::ResizeError),
    #[error("image buffer error: {0}")]
    ImageBuf(#[from] fir::ImageBufferError),
}

/// Convolution filter used for every resample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    /// Quality-preserving default
    #[default]
    Lanczos3,
    CatmullRom,
    Mitchell,
    /// Fastest, softest
    Bilinear,
}

impl ResampleFilter {
    fn to_alg(self) -> ResizeAlg {
        let filter = match self {
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Mitchell => FilterType::Mitchell,
            ResampleFilter::Bilinear => FilterType::Bilinear,
        };
        ResizeAlg::Convolution(filter)
    }
}

/// Resample a tightly packed RGB8 buffer from `src` to `dst` dimensions.
/// Returns a freshly allocated buffer of exactly `dst.rgb_len()` bytes.
pub fn resize_rgb_cpu(
    resizer: &mut Resizer,
    src_rgb: &[u8],
    src: Size,
    dst: Size,
    filter: ResampleFilter,
) -> Result<Vec<u8>, ScaleError> {
    check_len(src_rgb, src)?;
    if dst.is_empty() {
        return Err(ScaleError::EmptySize(dst));
    }
    if src == dst {
        return Ok(src_rgb.to_vec());
    }

    let src_view = TypedImageRef::<U8x3>::from_buffer(src.w, src.h, src_rgb)?;
    let mut out = vec![0u8; dst.rgb_len()];
    {
        let mut dst_image = TypedImage::<U8x3>::from_buffer(dst.w, dst.h, &mut out)?;
        let opts = ResizeOptions::new().resize_alg(filter.to_alg()).use_alpha(false);
        resizer.resize_typed::<U8x3>(&src_view, &mut dst_image, &opts)?;
    }
    Ok(out)
}

/// Downscale in several steps of `step` (see [`progressive_steps`]) for a
/// cleaner result on large reductions. A plain resize when the change is small.
pub fn resize_rgb_progressive(
    resizer: &mut Resizer,
    src_rgb: &[u8],
    src: Size,
    dst: Size,
    step: f64,
    filter: ResampleFilter,
) -> Result<Vec<u8>, ScaleError> {
    let mut steps = progressive_steps(src, dst, step).into_iter();
    let Some(first) = steps.next() else {
        check_len(src_rgb, src)?;
        return Ok(src_rgb.to_vec());
    };

    let mut buf = resize_rgb_cpu(resizer, src_rgb, src, first, filter)?;
    let mut at = first;
    for next in steps {
        buf = resize_rgb_cpu(resizer, &buf, at, next, filter)?;
        at = next;
    }
    Ok(buf)
}

fn check_len(buf: &[u8], size: Size) -> Result<(), ScaleError> {
    if size.is_empty() {
        return Err(ScaleError::EmptySize(size));
    }
    let expected = size.rgb_len();
    if buf.len() != expected {
        return Err(ScaleError::BufferSize {
            size,
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}
