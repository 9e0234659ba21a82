//! Sources, resampling and the codec seam the searches drive.

use std::borrow::Cow;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageEncoder as _};

use crate::dimensions::Dimensions;
use crate::error::CompressError;
use crate::format::{OutputFormat, RasterFormat};

/// Filter used for every resample, both for explicit resizes and scale trials.
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Something a request can start from.
///
/// Only rasters can be compressed. A PDF is recognised so it can be refused
/// with [`CompressError::UnsupportedConversion`] instead of producing nothing.
#[derive(Debug, Clone)]
pub enum SourceImage {
    Raster(DynamicImage),
    Document { len: usize },
}

impl SourceImage {
    pub fn from_bytes(data: &[u8]) -> Result<Self, CompressError> {
        if data.starts_with(PDF_MAGIC) {
            return Ok(SourceImage::Document { len: data.len() });
        }
        Ok(SourceImage::Raster(image::load_from_memory(data)?))
    }

    pub fn open(path: &Path) -> Result<Self, CompressError> {
        let data = std::fs::read(path).map_err(image::ImageError::IoError)?;
        Self::from_bytes(&data)
    }

    /// Natural size of a raster; documents have none until rasterised.
    pub fn natural_size(&self) -> Option<Dimensions> {
        match self {
            SourceImage::Raster(img) => {
                let (width, height) = img.dimensions();
                Some(Dimensions::new(width, height))
            }
            SourceImage::Document { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SourceImage::Raster(_) => "raster",
            SourceImage::Document { .. } => "PDF",
        }
    }
}

impl From<DynamicImage> for SourceImage {
    fn from(img: DynamicImage) -> Self {
        SourceImage::Raster(img)
    }
}

/// Resample `img` to exactly `size`, borrowing when it already matches.
pub fn resample(img: &DynamicImage, size: Dimensions) -> Cow<'_, DynamicImage> {
    if img.dimensions() == (size.width, size.height) {
        Cow::Borrowed(img)
    } else {
        Cow::Owned(img.resize_exact(size.width, size.height, RESIZE_FILTER))
    }
}

/// A codec the quality search can call repeatedly.
///
/// `quality` is in `0.0..=1.0`. Implementations must be deterministic: the
/// same pixels, format and quality give the same bytes.
pub trait RasterEncoder: Sync {
    fn encode(
        &self,
        img: &DynamicImage,
        format: RasterFormat,
        quality: f32,
    ) -> Result<Vec<u8>, CompressError>;
}

/// The production encoder: `image` for JPEG and PNG, `webp` for lossy WebP.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageEncoder;

impl RasterEncoder for ImageEncoder {
    fn encode(
        &self,
        img: &DynamicImage,
        format: RasterFormat,
        quality: f32,
    ) -> Result<Vec<u8>, CompressError> {
        match format {
            RasterFormat::Jpeg => encode_jpeg(img, quality),
            RasterFormat::Png => encode_png(img, quality),
            RasterFormat::Webp => encode_webp(img, quality),
        }
    }
}

/// Map `0.0..=1.0` onto the 1-100 scale the JPEG encoder takes.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

fn encode_jpeg(img: &DynamicImage, quality: f32) -> Result<Vec<u8>, CompressError> {
    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| CompressError::encode(OutputFormat::Jpeg, e))?;
    Ok(buffer)
}

/// PNG is lossless; quality only picks how hard deflate works.
pub fn png_compression(quality: f32) -> CompressionType {
    if quality >= 2.0 / 3.0 {
        CompressionType::Fast
    } else if quality >= 1.0 / 3.0 {
        CompressionType::Default
    } else {
        CompressionType::Best
    }
}

fn encode_png(img: &DynamicImage, quality: f32) -> Result<Vec<u8>, CompressError> {
    let mut buffer = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buffer, png_compression(quality), PngFilter::Adaptive);
    encoder
        .write_image(
            img.as_bytes(),
            img.width(),
            img.height(),
            img.color().into(),
        )
        .map_err(|e| CompressError::encode(OutputFormat::Png, e))?;
    Ok(buffer)
}

fn encode_webp(img: &DynamicImage, quality: f32) -> Result<Vec<u8>, CompressError> {
    let (w, h) = img.dimensions();
    let memory = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(&rgba, w, h).encode_simple(false, webp_quality(quality))
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(&rgb, w, h).encode_simple(false, webp_quality(quality))
    };
    let memory =
        memory.map_err(|e| CompressError::encode(OutputFormat::Webp, format!("{:?}", e)))?;
    Ok(memory.to_vec())
}

fn webp_quality(quality: f32) -> f32 {
    (quality * 100.0).clamp(0.0, 100.0)
}
