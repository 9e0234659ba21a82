//! Binary searches that steer re-encoding toward a byte budget.
//!
//! Both searches share [`SearchState`]: an interval `[low, high]` over a
//! parameter in `0..=1` (encoder quality or image scale), an attempt counter
//! and the best trial seen so far. Each iteration encodes at the midpoint,
//! measures, and hands the trial to [`SearchState::advance`], which keeps the
//! trial if it is the closest yet and halves the interval: too big lowers the
//! ceiling, otherwise the floor rises.
//!
//! A state only exists once a first trial has been made, so a finished search
//! always has a result. The encoded size is not strictly monotonic in quality
//! near quantisation steps, which is why the best trial is tracked rather than
//! taking the last one.

use image::DynamicImage;
use log::{debug, info, warn};

use crate::dimensions::Dimensions;
use crate::document;
use crate::encode::{resample, RasterEncoder};
use crate::error::CompressError;
use crate::format::RasterFormat;

/// One measured attempt.
pub trait Trial {
    /// The quality or scale the trial was made at.
    fn value(&self) -> f32;
    fn size_bytes(&self) -> u64;
}

/// A raster encoded at one quality.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionTrial {
    pub quality: f32,
    pub bytes: Vec<u8>,
}

impl Trial for CompressionTrial {
    fn value(&self) -> f32 {
        self.quality
    }

    fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A single-page document assembled at one scale.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTrial {
    pub scale: f32,
    pub size: Dimensions,
    /// Quality the embedded JPEG ended up with.
    pub quality: f32,
    pub document: Vec<u8>,
}

impl Trial for DocumentTrial {
    fn value(&self) -> f32 {
        self.scale
    }

    fn size_bytes(&self) -> u64 {
        self.document.len() as u64
    }
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The interval narrowed below the tolerance.
    Converged,
    /// The attempt budget ran out first.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState<T> {
    pub low: f32,
    pub high: f32,
    pub attempts: u32,
    best: T,
    best_delta: u64,
    target: u64,
}

impl<T: Trial> SearchState<T> {
    /// Start a search over `[low, high]` from its zeroth trial, which the
    /// caller made at [`midpoint`]`(low, high)`.
    pub fn seeded(low: f32, high: f32, target: u64, first: T) -> Self {
        let best_delta = first.size_bytes().abs_diff(target);
        let mut state = SearchState {
            low,
            high,
            attempts: 0,
            best: first,
            best_delta,
            target,
        };
        let (value, size) = (state.best.value(), state.best.size_bytes());
        state.narrow(value, size);
        state
    }

    /// Next parameter to try.
    pub fn midpoint(&self) -> f32 {
        midpoint(self.low, self.high)
    }

    pub fn should_continue(&self, tolerance: f32, max_attempts: u32) -> bool {
        self.high - self.low > tolerance && self.attempts < max_attempts
    }

    /// Fold one trial into the state.
    pub fn advance(mut self, trial: T) -> Self {
        let (value, size) = (trial.value(), trial.size_bytes());
        let delta = size.abs_diff(self.target);
        if delta < self.best_delta {
            self.best = trial;
            self.best_delta = delta;
        }
        self.narrow(value, size);
        self
    }

    pub fn best(&self) -> &T {
        &self.best
    }

    pub fn best_delta(&self) -> u64 {
        self.best_delta
    }

    pub fn finish(self, tolerance: f32) -> SearchOutcome<T> {
        let termination = if self.high - self.low > tolerance {
            Termination::Exhausted
        } else {
            Termination::Converged
        };
        SearchOutcome {
            exceeds_target: self.best.size_bytes() > self.target,
            best: self.best,
            attempts: self.attempts,
            delta: self.best_delta,
            termination,
        }
    }

    fn narrow(&mut self, value: f32, size: u64) {
        self.attempts += 1;
        if size > self.target {
            self.high = value;
        } else {
            self.low = value;
        }
    }
}

pub fn midpoint(low: f32, high: f32) -> f32 {
    (low + high) / 2.0
}

/// Result of a finished search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<T> {
    pub best: T,
    pub attempts: u32,
    /// `|best size - target|` in bytes.
    pub delta: u64,
    pub exceeds_target: bool,
    pub termination: Termination,
}

/// Bounds for the quality search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualitySearchConfig {
    pub min_quality: f32,
    pub max_quality: f32,
    pub tolerance: f32,
    pub max_attempts: u32,
}

impl Default for QualitySearchConfig {
    fn default() -> Self {
        Self {
            min_quality: 0.01,
            max_quality: 1.0,
            tolerance: 0.01,
            max_attempts: 20,
        }
    }
}

/// Bounds for the scale search, including the quality search it nests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSearchConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    pub tolerance: f32,
    pub max_attempts: u32,
    pub inner: QualitySearchConfig,
}

impl Default for ScaleSearchConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 1.0,
            tolerance: 0.05,
            max_attempts: 10,
            inner: QualitySearchConfig {
                min_quality: 0.1,
                ..QualitySearchConfig::default()
            },
        }
    }
}

/// Find the quality whose encoding of `img` at `size` lands closest to
/// `target` bytes.
///
/// The image is resampled once; every trial re-encodes the same pixels.
/// `target` must be positive, which [`crate::compress`] checks.
pub fn search_quality<E: RasterEncoder + ?Sized>(
    encoder: &E,
    img: &DynamicImage,
    size: Dimensions,
    format: RasterFormat,
    target: u64,
    config: &QualitySearchConfig,
) -> Result<SearchOutcome<CompressionTrial>, CompressError> {
    let raster = resample(img, size);
    let encode_at = |quality: f32| -> Result<CompressionTrial, CompressError> {
        let bytes = encoder.encode(&raster, format, quality)?;
        debug!(
            "{:?} {}x{} q={:.4}: {} bytes (target {})",
            format,
            size.width,
            size.height,
            quality,
            bytes.len(),
            target
        );
        Ok(CompressionTrial { quality, bytes })
    };

    let (low, high) = (config.min_quality, config.max_quality);
    let mut state = SearchState::seeded(low, high, target, encode_at(midpoint(low, high))?);
    while state.should_continue(config.tolerance, config.max_attempts) {
        let trial = encode_at(state.midpoint())?;
        state = state.advance(trial);
    }

    let outcome = state.finish(config.tolerance);
    info!(
        "quality search: q={:.4} -> {} bytes after {} attempts ({:?}, off by {})",
        outcome.best.quality,
        outcome.best.size_bytes(),
        outcome.attempts,
        outcome.termination,
        outcome.delta
    );
    Ok(outcome)
}

/// Find the scale at which a one-page PDF of `img` lands closest to `target`
/// bytes.
///
/// Every outer trial resamples the source, runs a full JPEG quality search at
/// that size and measures the assembled document, container overhead
/// included.
pub fn search_scale<E: RasterEncoder + ?Sized>(
    encoder: &E,
    img: &DynamicImage,
    natural: Dimensions,
    target: u64,
    config: &ScaleSearchConfig,
) -> Result<SearchOutcome<DocumentTrial>, CompressError> {
    let document_at = |scale: f32| -> Result<DocumentTrial, CompressError> {
        let size = natural.scaled(scale);
        let raster = search_quality(encoder, img, size, RasterFormat::Jpeg, target, &config.inner)?;
        let document = document::assemble(&raster.best.bytes, size)?;
        debug!(
            "scale {:.4} ({}x{}): document {} bytes (target {})",
            scale,
            size.width,
            size.height,
            document.len(),
            target
        );
        Ok(DocumentTrial {
            scale,
            size,
            quality: raster.best.quality,
            document,
        })
    };

    let (low, high) = (config.min_scale, config.max_scale);
    let mut state = SearchState::seeded(low, high, target, document_at(midpoint(low, high))?);
    while state.should_continue(config.tolerance, config.max_attempts) {
        let trial = document_at(state.midpoint())?;
        state = state.advance(trial);
    }

    let outcome = state.finish(config.tolerance);
    if outcome.termination == Termination::Exhausted {
        warn!(
            "scale search stopped after {} attempts without converging",
            outcome.attempts
        );
    }
    info!(
        "scale search: scale={:.4} ({}x{}, q={:.4}) -> {} bytes, off by {}",
        outcome.best.scale,
        outcome.best.size.width,
        outcome.best.size.height,
        outcome.best.quality,
        outcome.best.size_bytes(),
        outcome.delta
    );
    Ok(outcome)
}
