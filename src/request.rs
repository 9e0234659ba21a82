use log::{info, warn};

use crate::dimensions::Dimensions;
use crate::encode::{RasterEncoder, SourceImage};
use crate::error::CompressError;
use crate::format::OutputFormat;
use crate::search::{
    search_quality, search_scale, QualitySearchConfig, ScaleSearchConfig, Termination, Trial,
};

/// One "process" action: a source, an encoding, a byte budget and a size.
#[derive(Debug, Clone)]
pub struct CompressionRequest {
    pub image: SourceImage,
    pub output_format: OutputFormat,
    pub target_bytes: u64,
    /// Ignored for PDF output, where the scale search picks the size.
    pub output_size: Dimensions,
}

impl CompressionRequest {
    /// A request at the source's natural size, or 0x0 for sources without
    /// one.
    pub fn new(image: SourceImage, output_format: OutputFormat, target_bytes: u64) -> Self {
        let output_size = image.natural_size().unwrap_or(Dimensions::new(0, 0));
        Self {
            image,
            output_format,
            target_bytes,
            output_size,
        }
    }

    pub fn with_output_size(mut self, size: Dimensions) -> Self {
        self.output_size = size;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompressOptions {
    pub quality: QualitySearchConfig,
    pub scale: ScaleSearchConfig,
}

/// The encoded file plus what it took to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionOutput {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub size: Dimensions,
    pub quality: f32,
    /// Set only for PDF output.
    pub scale: Option<f32>,
    /// Outer attempts for PDF output, quality attempts otherwise.
    pub attempts: u32,
    pub target_bytes: u64,
    pub delta: u64,
    pub exceeds_target: bool,
    pub termination: Termination,
}

impl CompressionOutput {
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Run one request to completion.
///
/// Validation happens before any encode: a zero target, a PDF source and a
/// zero output size never reach the codec.
pub fn compress<E: RasterEncoder + ?Sized>(
    encoder: &E,
    request: &CompressionRequest,
    options: &CompressOptions,
) -> Result<CompressionOutput, CompressError> {
    if request.target_bytes == 0 {
        return Err(CompressError::InvalidTarget);
    }

    let img = match &request.image {
        SourceImage::Raster(img) => img,
        other @ SourceImage::Document { .. } => {
            return Err(CompressError::UnsupportedConversion {
                source_kind: other.kind(),
                target: request.output_format,
            });
        }
    };

    let target = request.target_bytes;
    let output = match request.output_format.raster() {
        None => {
            let natural = request
                .image
                .natural_size()
                .unwrap_or(Dimensions::new(0, 0));
            check_size(natural)?;
            let outcome = search_scale(encoder, img, natural, target, &options.scale)?;
            let size_bytes = outcome.best.size_bytes();
            info!(
                "PDF {}x{} at scale {:.3}: {} bytes for a {} byte target",
                outcome.best.size.width,
                outcome.best.size.height,
                outcome.best.scale,
                size_bytes,
                target
            );
            CompressionOutput {
                format: OutputFormat::Pdf,
                size: outcome.best.size,
                quality: outcome.best.quality,
                scale: Some(outcome.best.scale),
                bytes: outcome.best.document,
                attempts: outcome.attempts,
                target_bytes: target,
                delta: outcome.delta,
                exceeds_target: outcome.exceeds_target,
                termination: outcome.termination,
            }
        }
        Some(format) => {
            check_size(request.output_size)?;
            let outcome =
                search_quality(encoder, img, request.output_size, format, target, &options.quality)?;
            CompressionOutput {
                format: request.output_format,
                size: request.output_size,
                quality: outcome.best.quality,
                scale: None,
                bytes: outcome.best.bytes,
                attempts: outcome.attempts,
                target_bytes: target,
                delta: outcome.delta,
                exceeds_target: outcome.exceeds_target,
                termination: outcome.termination,
            }
        }
    };

    if output.termination == Termination::Exhausted {
        warn!(
            "{} target of {} bytes not reached within {} attempts, closest is {} bytes",
            output.format,
            target,
            output.attempts,
            output.size_bytes()
        );
    }
    Ok(output)
}

fn check_size(size: Dimensions) -> Result<(), CompressError> {
    if size.width == 0 || size.height == 0 {
        return Err(CompressError::InvalidDimensions {
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}
