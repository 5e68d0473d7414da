//! Shared test utilities for the srcsetter test suite.
//!
//! Synthetic source images, encoded in memory with the `image` crate so no
//! binary fixtures need to live in the repo.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = raw_dir_with(&[("a.jpg", encode_test_jpeg(200, 150))]);
//! let sources = discover(&tmp.path().join("raw"), &extensions).unwrap();
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Synthetic images
// =========================================================================

/// A JPEG with a diagonal gradient, so resizes and samples are non-trivial.
pub fn encode_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A PNG with an alpha gradient.
pub fn encode_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            200,
            (x * 255 / width.max(1)) as u8,
            60,
            (y * 255 / height.max(1)) as u8,
        ])
    });
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `(name, bytes)` files into `dir`, creating it first.
pub fn write_files(dir: &Path, files: &[(&str, Vec<u8>)]) {
    std::fs::create_dir_all(dir).unwrap();
    for (name, bytes) in files {
        std::fs::write(dir.join(name), bytes).unwrap();
    }
}

/// A temp directory holding a `raw/` directory with the given files.
pub fn raw_dir_with(files: &[(&str, Vec<u8>)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_files(&tmp.path().join("raw"), files);
    tmp
}
