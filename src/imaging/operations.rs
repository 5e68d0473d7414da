//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend, RgbaSample};
use super::calculations::calculate_variant_dimensions;
use super::params::{EncodingTarget, ResizeParams, SampleParams};
use image::DynamicImage;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// One planned (width, format) work item for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPlan {
    /// Configured target width, used in file names and `srcset` descriptors.
    pub target_width: u32,
    /// Actual output dimensions and encoding target.
    pub params: ResizeParams,
}

/// An encoded variant, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedVariant {
    pub plan: VariantPlan,
    pub bytes: Vec<u8>,
}

/// Plan every variant of a source, width-major: all formats of the first
/// width, then all formats of the next, in configured order.
///
/// Every configured width gets an entry, even when the source is narrower;
/// such variants keep the native dimensions.
pub fn plan_variants(
    original: (u32, u32),
    widths: &[u32],
    targets: &[EncodingTarget],
) -> Vec<VariantPlan> {
    widths
        .iter()
        .flat_map(|&target_width| {
            let (width, height) = calculate_variant_dimensions(original, target_width);
            targets.iter().map(move |&target| VariantPlan {
                target_width,
                params: ResizeParams {
                    width,
                    height,
                    target,
                },
            })
        })
        .collect()
}

/// Resize and encode one planned variant.
pub fn encode_variant(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    plan: &VariantPlan,
) -> Result<EncodedVariant> {
    let bytes = backend.resize(image, &plan.params)?;
    Ok(EncodedVariant { plan: *plan, bytes })
}

/// Take the square cover-fit sample used for the placeholder.
pub fn create_placeholder_sample(
    backend: &impl ImageBackend,
    image: &DynamicImage,
    size: u32,
) -> Result<RgbaSample> {
    backend.cover_sample(image, &SampleParams { size })
}
