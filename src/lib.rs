//! Re-encode images to hit a byte budget.
//!
//! [`compress`] takes a decoded source, an output format and a target size
//! and binary-searches the encoder quality (JPEG, PNG, WebP) or, for a
//! single-page PDF, the image scale, returning the closest file it found.

pub mod dimensions;
pub mod document;
pub mod encode;
pub mod error;
pub mod format;
pub mod request;
pub mod search;
pub mod wasm;

pub use dimensions::{resolve, Dimensions, Edit, Field, ResizeTarget};
pub use encode::{ImageEncoder, RasterEncoder, SourceImage};
pub use error::CompressError;
pub use format::{default_output_name, OutputFormat, RasterFormat};
pub use request::{compress, CompressOptions, CompressionOutput, CompressionRequest};
pub use search::{
    search_quality, search_scale, CompressionTrial, DocumentTrial, QualitySearchConfig,
    ScaleSearchConfig, SearchOutcome, SearchState, Termination,
};

/// Bytes in one of the kilobytes users type into the target box.
pub const KIB: u64 = 1024;
