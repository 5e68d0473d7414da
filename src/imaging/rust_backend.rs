//! Pure Rust image processing backend built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::load_from_memory` (pure Rust decoders) |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless only) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Placeholder sample | `image::DynamicImage::resize_to_fill` + `to_rgba8` |

use super::backend::{BackendError, ImageBackend, RgbaSample};
use super::params::{EncodingTarget, OutputFormat, ResizeParams, SampleParams};
use image::DynamicImage;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use std::borrow::Cow;

/// Default rav1e speed: reasonable throughput without bloating files.
pub const DEFAULT_AVIF_SPEED: u8 = 6;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    avif_speed: u8,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::with_speed(DEFAULT_AVIF_SPEED)
    }

    /// Backend with a specific AVIF encoder speed (1 = slowest, 10 = fastest).
    pub fn with_speed(avif_speed: u8) -> Self {
        Self {
            avif_speed: avif_speed.clamp(1, 10),
        }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize to 8-bit RGB(A), the layouts every encoder here accepts.
fn to_8bit(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Cow::Borrowed(img),
        _ if img.color().has_alpha() => Cow::Owned(DynamicImage::ImageRgba8(img.to_rgba8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8())),
    }
}

/// Encode a raster into the target format.
fn encode(
    img: &DynamicImage,
    target: &EncodingTarget,
    avif_speed: u8,
) -> Result<Vec<u8>, BackendError> {
    let quality = target.quality.value() as u8;
    let mut buf = Vec::new();
    let result = match target.format {
        OutputFormat::Avif => {
            let encoder = AvifEncoder::new_with_speed_quality(&mut buf, avif_speed, quality);
            to_8bit(img).write_with_encoder(encoder)
        }
        OutputFormat::Webp => {
            let encoder = WebPEncoder::new_lossless(&mut buf);
            to_8bit(img).write_with_encoder(encoder)
        }
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
    };
    result.map_err(|e| {
        BackendError::ProcessingFailed(format!(
            "{} encode failed: {}",
            target.format.extension(),
            e
        ))
    })?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn resize(
        &self,
        image: &DynamicImage,
        params: &ResizeParams,
    ) -> Result<Vec<u8>, BackendError> {
        let resized = if (image.width(), image.height()) == (params.width, params.height) {
            Cow::Borrowed(image)
        } else {
            Cow::Owned(image.resize_exact(params.width, params.height, FilterType::Lanczos3))
        };
        encode(&resized, &params.target, self.avif_speed)
    }

    fn cover_sample(
        &self,
        image: &DynamicImage,
        params: &SampleParams,
    ) -> Result<RgbaSample, BackendError> {
        // Fill-resize then center-crop to the exact square
        let filled = image.resize_to_fill(params.size, params.size, FilterType::Lanczos3);
        let rgba = filled.to_rgba8();
        Ok(RgbaSample {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }
}
