//! Decoding and encoding wrappers around the `image` crate.
//!
//! Decoding runs under the crate's default allocation limits first. A file that
//! trips them (a decompression bomb, or simply a huge scan) is decoded again
//! without limits and flagged `oversized` so the pipeline halves it before any
//! other work.

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::error::{EncodingError, ImageFormatHint};
use image::{DynamicImage, ExtendedColorType, ImageError, ImageFormat, ImageReader, Limits, RgbImage};
use tiff::encoder::{colortype, Rational, TiffEncoder};
use tiff::tags::ResolutionUnit;
use tracing::warn;

use crate::config::SaveOptions;
use crate::error::PipelineError;

const METERS_PER_INCH: f64 = 0.0254;

/// Offset of `biXPelsPerMeter` (14-byte file header + 24 bytes into the DIB header).
const BMP_DENSITY_OFFSET: usize = 38;

/// A decoded source image.
#[derive(Debug)]
pub struct Decoded {
    pub image: DynamicImage,
    /// Decoding only succeeded after lifting the default limits.
    pub oversized: bool,
}

pub fn decode(path: &Path) -> Result<Decoded, PipelineError> {
    match read_with_limits(path, Limits::default()) {
        Ok(image) => Ok(Decoded { image, oversized: false }),
        Err(ImageError::Limits(limit)) => {
            warn!(path = %path.display(), %limit, "decode limits exceeded, retrying without limits");
            let image = read_with_limits(path, Limits::no_limits()).map_err(|e| PipelineError::decode(path, e))?;
            Ok(Decoded { image, oversized: true })
        }
        Err(e) => Err(PipelineError::decode(path, e)),
    }
}

fn read_with_limits(path: &Path, limits: Limits) -> Result<DynamicImage, ImageError> {
    let mut reader = ImageReader::open(path)?.with_guessed_format()?;
    reader.limits(limits);
    reader.decode()
}

/// Write `image` to `path`, picking the format from the extension.
///
/// `options.dpi` is recorded wherever the container has a density field:
/// JFIF for JPEG, `pHYs` for PNG, `XResolution`/`YResolution` for TIFF and the
/// pixels-per-meter header fields for BMP. JPEG also uses `options.jpeg_quality`.
/// Other formats use the encoder defaults. A failed write removes the partial file.
pub fn encode(image: &RgbImage, path: &Path, options: &SaveOptions) -> Result<(), PipelineError> {
    let format = ImageFormat::from_path(path).map_err(|e| PipelineError::encode(path, e))?;
    let file = File::create(path).map_err(|e| PipelineError::encode(path, ImageError::IoError(e)))?;

    let written = write_format(image, format, options, BufWriter::new(file));
    if written.is_err() {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to remove partial output");
        }
    }
    written.map_err(|e| PipelineError::encode(path, e))
}

fn write_format(
    image: &RgbImage,
    format: ImageFormat,
    options: &SaveOptions,
    mut writer: BufWriter<File>,
) -> Result<(), ImageError> {
    match format {
        ImageFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, options.jpeg_quality);
            encoder.set_pixel_density(PixelDensity::dpi(options.dpi));
            encoder.encode_image(image)?;
        }
        ImageFormat::Png => write_png(image, options.dpi, &mut writer)?,
        ImageFormat::Tiff => write_tiff(image, options.dpi, &mut writer)?,
        ImageFormat::Bmp => write_bmp(image, options.dpi, &mut writer)?,
        other => image.write_to(&mut writer, other)?,
    }
    writer.flush()?;
    Ok(())
}

fn pixels_per_meter(dpi: u16) -> u32 {
    (f64::from(dpi) / METERS_PER_INCH).round() as u32
}

fn encoding_error(format: ImageFormat, err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> ImageError {
    ImageError::Encoding(EncodingError::new(ImageFormatHint::Exact(format), err))
}

fn write_png<W: Write>(image: &RgbImage, dpi: u16, writer: W) -> Result<(), ImageError> {
    let to_err = |e: png::EncodingError| encoding_error(ImageFormat::Png, e);
    let ppm = pixels_per_meter(dpi);
    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));
    let mut stream = encoder.write_header().map_err(to_err)?;
    stream.write_image_data(image.as_raw()).map_err(to_err)?;
    stream.finish().map_err(to_err)
}

fn write_tiff<W: Write + Seek>(image: &RgbImage, dpi: u16, writer: W) -> Result<(), ImageError> {
    let to_err = |e: tiff::TiffError| encoding_error(ImageFormat::Tiff, e);
    let mut encoder = TiffEncoder::new(writer).map_err(to_err)?;
    let mut page = encoder
        .new_image::<colortype::RGB8>(image.width(), image.height())
        .map_err(to_err)?;
    page.resolution(
        ResolutionUnit::Inch,
        Rational {
            n: u32::from(dpi),
            d: 1,
        },
    );
    page.write_data(image.as_raw()).map_err(to_err)
}

/// `BmpEncoder` leaves the density fields zeroed; they sit at fixed offsets in
/// every DIB header it writes.
fn write_bmp<W: Write>(image: &RgbImage, dpi: u16, mut writer: W) -> Result<(), ImageError> {
    let mut buf = Vec::new();
    BmpEncoder::new(&mut buf).encode(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgb8)?;
    let ppm = pixels_per_meter(dpi).to_le_bytes();
    if buf.len() < BMP_DENSITY_OFFSET + 8 {
        return Err(encoding_error(ImageFormat::Bmp, "BMP header shorter than expected"));
    }
    buf[BMP_DENSITY_OFFSET..BMP_DENSITY_OFFSET + 4].copy_from_slice(&ppm);
    buf[BMP_DENSITY_OFFSET + 4..BMP_DENSITY_OFFSET + 8].copy_from_slice(&ppm);
    writer.write_all(&buf)?;
    Ok(())
}
