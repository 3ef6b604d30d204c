// SPDX-License-Identifier: MIT
//! # imgpre-scale: Scale Plans and RGB Resampling
//!
//! This crate holds the size arithmetic and the CPU resampler used by the
//! sharpness-driven preprocessor. It knows nothing about sharpness, files or
//! codecs: callers hand it tightly packed RGB8 bytes and a target [`plan::Size`].
//!
//! ## Key Components
//!
//! - [`plan`]: Pure size computations (uniform steps, pixel budgets, bounding-box
//!   fits, progressive step schedules)
//! - [`cpu`]: Lanczos3 (or other convolution filter) RGB8 resizing built on
//!   `fast_image_resize`
//!
//! ## Usage Example
//!
//! ```rust
//! use imgpre_scale::cpu::{resize_rgb_cpu, ResampleFilter};
//! use imgpre_scale::plan::{fit_within, Size};
//!
//! let input = Size::new(4000, 3000);
//! let out = fit_within(input, Size::new(1920, 1080));
//! assert_eq!(out, Size::new(1440, 1080));
//!
//! let mut resizer = fast_image_resize::Resizer::new();
//! let src = vec![127u8; input.rgb_len()];
//! let dst = resize_rgb_cpu(&mut resizer, &src, input, out, ResampleFilter::Lanczos3)?;
//! assert_eq!(dst.len(), out.rgb_len());
//! # Ok::<(), imgpre_scale::ScaleError>(())
//! ```

pub mod cpu;
pub mod plan;

pub use cpu::{ResampleFilter, ScaleError};
pub use plan::Size;
