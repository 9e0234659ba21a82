use thiserror::Error;

use crate::format::OutputFormat;

/// Everything that can stop a compression request.
///
/// Running out of attempts is deliberately absent: an exhausted search still
/// returns its best trial, see [`crate::search::Termination`].
#[derive(Debug, Error)]
pub enum CompressError {
    #[error("target size must be greater than zero bytes")]
    InvalidTarget,

    #[error("output dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("cannot convert a {source_kind} source into {target}")]
    UnsupportedConversion {
        source_kind: &'static str,
        target: OutputFormat,
    },

    #[error("{format} encoder failed: {reason}")]
    EncodeFailure { format: OutputFormat, reason: String },

    #[error("failed to decode source image: {0}")]
    Decode(#[from] image::ImageError),
}

impl CompressError {
    pub(crate) fn encode(format: OutputFormat, reason: impl ToString) -> Self {
        CompressError::EncodeFailure {
            format,
            reason: reason.to_string(),
        }
    }
}
