//! Image processing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` |
//! | **Resize → AVIF/WebP/JPEG** | Lanczos3 + `image` codecs (rav1e for AVIF) |
//! | **Placeholder sample** | `resize_to_fill` + `to_rgba8` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, RgbaSample};
pub use calculations::{aspect_ratio, calculate_variant_dimensions};
pub use operations::{
    EncodedVariant, VariantPlan, create_placeholder_sample, encode_variant, plan_variants,
};
pub use params::{EncodingTarget, OutputFormat, Quality, ResizeParams, SampleParams};
pub use rust_backend::RustBackend;
