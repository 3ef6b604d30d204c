//! Shared fixtures for the integration tests: synthetic images and broken files.

#![allow(dead_code)]

use std::path::Path;

use image::{Rgb, RgbImage};

/// Hard-edged stripes and blocks with plenty of high-frequency detail.
pub fn textured(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| {
        let v: u8 = if (x / 4 + y / 7) % 2 == 0 { 30 } else { 220 };
        Rgb([v, (v / 2).wrapping_add((x % 50) as u8), 255 - v])
    })
}

/// A textured image run through a gaussian blur, so shrinking it raises its sharpness.
pub fn blurred(w: u32, h: u32, sigma: f32) -> RgbImage {
    image::imageops::blur(&textured(w, h), sigma)
}

/// Writes bytes that carry an image extension but no valid image.
pub fn write_corrupt(path: &Path) {
    std::fs::write(path, b"\xFF\xD8\xFF\xE0 truncated").unwrap();
}

/// Reads the JFIF density unit and X/Y density from a JPEG file.
pub fn jfif_density(path: &Path) -> (u8, u16, u16) {
    let bytes = std::fs::read(path).unwrap();
    let at = bytes
        .windows(5)
        .position(|w| w == b"JFIF\0")
        .expect("JFIF header");
    (
        bytes[at + 7],
        u16::from_be_bytes([bytes[at + 8], bytes[at + 9]]),
        u16::from_be_bytes([bytes[at + 10], bytes[at + 11]]),
    )
}
