//! # Sharpness Scorer
//!
//! Edge-energy proxy: variance of a 3x3 Laplacian response over the grayscale
//! projection of the image.
//!
//! - Grayscale uses BT.601 weights (`0.299 R + 0.587 G + 0.114 B`) rounded to 8 bits
//! - Kernel `[0 1 0; 1 -4 1; 0 1 0]`, reflect-101 borders (`dcb|abcd|cba`)
//! - Population variance over every pixel, accumulated in integers so the
//!   result is bit-for-bit deterministic for identical buffers
//!
//! Scores are only meaningful relative to other scores from this function.

use image::RgbImage;

/// Sharpness score of `image`. `0.0` for empty or edge-free buffers.
pub fn sharpness_score(image: &RgbImage) -> f64 {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return 0.0;
    }
    let gray = luma_bt601(image);
    laplacian_variance(&gray, w as usize, h as usize)
}

fn luma_bt601(image: &RgbImage) -> Vec<u8> {
    image
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)).round() as u8
        })
        .collect()
}

#[inline]
fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let r = if i < 0 {
        -i
    } else if i >= n {
        2 * n - 2 - i
    } else {
        i
    };
    r as usize
}

fn laplacian_variance(gray: &[u8], w: usize, h: usize) -> f64 {
    let mut sum: i64 = 0;
    let mut sum_sq: i64 = 0;

    for y in 0..h {
        let row = &gray[y * w..(y + 1) * w];
        let up = reflect101(y as isize - 1, h);
        let down = reflect101(y as isize + 1, h);
        let row_up = &gray[up * w..(up + 1) * w];
        let row_down = &gray[down * w..(down + 1) * w];

        for x in 0..w {
            let left = reflect101(x as isize - 1, w);
            let right = reflect101(x as isize + 1, w);
            let v = i64::from(row_up[x]) + i64::from(row_down[x]) + i64::from(row[left]) + i64::from(row[right])
                - 4 * i64::from(row[x]);
            sum += v;
            sum_sq += v * v;
        }
    }

    let n = (w * h) as f64;
    let mean = sum as f64 / n;
    (sum_sq as f64 / n - mean * mean).max(0.0)
}
