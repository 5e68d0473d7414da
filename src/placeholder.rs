//! ThumbHash placeholders.
//!
//! Each source gets a tiny blurred preview the frontend can paint before any
//! variant has loaded:
//!
//! ```text
//! source ──cover-fit──▶ 64x64 RGBA ──ThumbHash──▶ ~25 bytes
//!                                                   │
//!                    data:image/png;base64,… ◀──decode + PNG
//! ```
//!
//! The square sample normalizes cost regardless of source resolution. The
//! preview is self-contained (a data URL), so the manifest needs no extra
//! request to show it.
//!
//! ## Aspect ratio
//!
//! [`AspectRatioMode::Sample`] reports the ratio of the cropped sample, which
//! for a square sample is always `1.0`. [`AspectRatioMode::Source`] reports
//! the ratio of the decoded source instead.

use crate::config::AspectRatioMode;
use crate::imaging::{RgbaSample, aspect_ratio};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

/// ThumbHash refuses inputs larger than this on either edge.
const MAX_SAMPLE_EDGE: u32 = 100;

#[derive(Error, Debug)]
pub enum PlaceholderError {
    #[error("Invalid placeholder sample: {0}")]
    InvalidSample(String),
    #[error("ThumbHash could not be decoded")]
    Decode,
    #[error("PNG encode failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Placeholder data for one source.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// `data:image/png;base64,...` preview reconstructed from the ThumbHash.
    pub data_url: String,
    pub aspect_ratio: f64,
}

/// Encode an RGBA sample as a ThumbHash.
pub fn thumbhash(sample: &RgbaSample) -> Result<Vec<u8>, PlaceholderError> {
    let RgbaSample {
        width,
        height,
        pixels,
    } = sample;
    if *width == 0 || *height == 0 || *width > MAX_SAMPLE_EDGE || *height > MAX_SAMPLE_EDGE {
        return Err(PlaceholderError::InvalidSample(format!(
            "{}x{} outside 1-{}",
            width, height, MAX_SAMPLE_EDGE
        )));
    }
    let expected = (*width as usize) * (*height as usize) * 4;
    if pixels.len() != expected {
        return Err(PlaceholderError::InvalidSample(format!(
            "expected {} bytes of RGBA, got {}",
            expected,
            pixels.len()
        )));
    }
    Ok(thumbhash::rgba_to_thumb_hash(
        *width as usize,
        *height as usize,
        pixels,
    ))
}

/// Render a ThumbHash back to a PNG data URL.
pub fn thumbhash_to_data_url(hash: &[u8]) -> Result<String, PlaceholderError> {
    let (w, h, rgba) =
        thumbhash::thumb_hash_to_rgba(hash).map_err(|_| PlaceholderError::Decode)?;
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(&rgba, w as u32, h as u32, ExtendedColorType::Rgba8)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(&png)))
}

/// Build the placeholder for a source from its cover-fit sample.
///
/// `source_dimensions` is only consulted in [`AspectRatioMode::Source`].
pub fn generate_placeholder(
    sample: &RgbaSample,
    source_dimensions: (u32, u32),
    mode: AspectRatioMode,
) -> Result<Placeholder, PlaceholderError> {
    let hash = thumbhash(sample)?;
    let data_url = thumbhash_to_data_url(&hash)?;
    let aspect_ratio = match mode {
        AspectRatioMode::Sample => aspect_ratio(sample.width, sample.height),
        AspectRatioMode::Source => aspect_ratio(source_dimensions.0, source_dimensions.1),
    };
    Ok(Placeholder {
        data_url,
        aspect_ratio,
    })
}
