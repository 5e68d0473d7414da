//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides which variants to create) and the [`backend`](super::backend)
//! (which does the pixel work and the encoding). This separation allows
//! swapping backends (e.g. for testing with a mock) without changing
//! operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100). Clamped on construction.
//! - [`OutputFormat`]: Encoded output format and its file extension.
//! - [`EncodingTarget`]: A format paired with its quality.
//! - [`ResizeParams`]: Target dimensions plus encoding target for one variant.
//! - [`SampleParams`]: Edge length of the square placeholder sample.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// AV1 still image, lossy (rav1e).
    Avif,
    /// WebP. The `image` crate only ships a lossless encoder, so quality is unused.
    Webp,
    /// Baseline JPEG, lossy. Alpha is dropped.
    Jpeg,
}

impl OutputFormat {
    /// File extension and manifest tag.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Avif => "avif",
            OutputFormat::Webp => "webp",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

/// One output format at a given quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingTarget {
    pub format: OutputFormat,
    pub quality: Quality,
}

/// Parameters for one resize + encode operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub target: EncodingTarget,
}

/// Parameters for the square cover-fit placeholder sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleParams {
    pub size: u32,
}
