// SPDX-License-Identifier: MIT
//! # Scale Plans
//!
//! Size arithmetic shared by every resizing stage. All functions here are pure:
//! they take dimensions and return dimensions, so the decision logic can be
//! tested without touching pixels.
//!
//! - Floating-point math, rounded or floored back to whole pixels
//! - Every computed side is clamped to at least 1px
//! - Nothing here upscales unless the caller explicitly asks for a larger size

use std::fmt;

use serde::{Deserialize, Serialize};

/// Width and height of a raster in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn short_side(self) -> u32 {
        self.w.min(self.h)
    }

    pub fn long_side(self) -> u32 {
        self.w.max(self.h)
    }

    /// Pixel count, widened so 50MP+ sources cannot overflow.
    pub fn pixels(self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }

    /// Byte length of a tightly packed RGB8 buffer of this size.
    pub fn rgb_len(self) -> usize {
        (self.w as usize) * (self.h as usize) * 3
    }

    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Scale both sides by the same `ratio`, rounding to whole pixels.
pub fn scale_uniform(input: Size, ratio: f64) -> Size {
    let (w, h) = (f64::from(input.w), f64::from(input.h));
    Size {
        w: ((w * ratio).round() as u32).max(1),
        h: ((h * ratio).round() as u32).max(1),
    }
}

/// Largest aspect-preserving size whose pixel count does not exceed `max_pixels`.
///
/// Returns `input` untouched when it is already within budget.
pub fn cap_pixels(input: Size, max_pixels: u64) -> Size {
    if input.pixels() <= max_pixels || input.is_empty() {
        return input;
    }
    let s = (max_pixels as f64 / input.pixels() as f64).sqrt();
    let mut w = ((f64::from(input.w) * s).floor() as u32).max(1);
    let mut h = ((f64::from(input.h) * s).floor() as u32).max(1);
    // Floating error can leave us one row or column over budget.
    while u64::from(w) * u64::from(h) > max_pixels && (w > 1 || h > 1) {
        if w >= h {
            w -= 1;
        } else {
            h -= 1;
        }
    }
    Size { w, h }
}

/// Fit image within a bounding box while preserving aspect ratio.
/// Never upscales: returns the input when it already fits.
pub fn fit_within(input: Size, box_: Size) -> Size {
    let (w, h) = (f64::from(input.w), f64::from(input.h));
    let (bw, bh) = (f64::from(box_.w), f64::from(box_.h));
    let s = (bw / w).min(bh / h).min(1.0);
    Size {
        w: ((w * s).round() as u32).max(1),
        h: ((h * s).round() as u32).max(1),
    }
}

/// Intermediate sizes for a multi-step downscale from `from` to `to`.
///
/// Each step shrinks by `step` (floored, never below `to`) while either side is
/// more than 10% larger than the target; the last element is always `to`.
/// An empty schedule means `from == to`. A `step` outside `(0, 1)` yields a
/// single direct step.
pub fn progressive_steps(from: Size, to: Size, step: f64) -> Vec<Size> {
    if from == to {
        return Vec::new();
    }
    let mut steps = Vec::new();
    if step > 0.0 && step < 1.0 {
        let mut cur = from;
        while f64::from(cur.w) > f64::from(to.w) * 1.1 || f64::from(cur.h) > f64::from(to.h) * 1.1 {
            cur = Size {
                w: ((f64::from(cur.w) * step) as u32).max(to.w),
                h: ((f64::from(cur.h) * step) as u32).max(to.h),
            };
            steps.push(cur);
        }
    }
    if steps.last() != Some(&to) {
        steps.push(to);
    }
    steps
}
