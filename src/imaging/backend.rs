//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the pipeline needs
//! from a transcoding engine: decode source bytes, resize + encode a variant,
//! and take a square cover-fit RGBA sample for the placeholder.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! recording `MockBackend` in this module's test submodule.

use super::params::{ResizeParams, SampleParams};
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Raw RGBA8 pixels of a placeholder sample, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaSample {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Trait for image processing backends.
///
/// Must be `Sync`: the pipeline calls one backend from every worker thread.
pub trait ImageBackend: Sync {
    /// Decode an in-memory source file.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError>;

    /// Resize to exactly `params.width` x `params.height` and encode.
    fn resize(
        &self,
        image: &DynamicImage,
        params: &ResizeParams,
    ) -> Result<Vec<u8>, BackendError>;

    /// Cover-fit (center crop) to a `size` x `size` square with alpha.
    fn cover_sample(
        &self,
        image: &DynamicImage,
        params: &SampleParams,
    ) -> Result<RgbaSample, BackendError>;
}
