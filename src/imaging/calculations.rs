//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the output dimensions of a width-targeted variant.
///
/// Scales to `target_width` preserving aspect ratio. Never upscales: a source
/// narrower than (or equal to) the target keeps its native dimensions. The
/// height never rounds down to zero.
///
/// # Examples
/// ```
/// # use srcsetter::imaging::calculate_variant_dimensions;
/// // 1000x750 → 320 wide
/// assert_eq!(calculate_variant_dimensions((1000, 750), 320), (320, 240));
///
/// // 200x100 source is narrower than 320 → unchanged
/// assert_eq!(calculate_variant_dimensions((200, 100), 320), (200, 100));
/// ```
pub fn calculate_variant_dimensions(original: (u32, u32), target_width: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    if orig_w <= target_width {
        return (orig_w, orig_h);
    }
    let ratio = target_width as f64 / orig_w as f64;
    let height = ((orig_h as f64 * ratio).round() as u32).max(1);
    (target_width, height)
}

/// Width divided by height. Zero height yields 0.0 rather than infinity.
pub fn aspect_ratio(width: u32, height: u32) -> f64 {
    if height == 0 {
        return 0.0;
    }
    width as f64 / height as f64
}
