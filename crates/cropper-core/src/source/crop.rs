//! Cropping decoded images with normalized coordinates.
//!
//! # Coordinate System
//!
//! - (0.0, 0.0) = top-left corner
//! - (1.0, 1.0) = bottom-right corner
//! - width/height are relative to the oriented image dimensions

use image::DynamicImage;

use crate::geometry::NormalizedRect;

/// Pixel region `(x, y, width, height)` covered by `rect` in a `width x height` image.
///
/// - Coordinates beyond the image are clamped
/// - The region is at least 1x1
pub fn pixel_region(width: u32, height: u32, rect: &NormalizedRect) -> (u32, u32, u32, u32) {
    let src_w = f64::from(width);
    let src_h = f64::from(height);

    let px_left = (rect.left.clamp(0.0, 1.0) * src_w).round() as u32;
    let px_top = (rect.top.clamp(0.0, 1.0) * src_h).round() as u32;
    let px_width = (rect.width.clamp(0.0, 1.0) * src_w).round() as u32;
    let px_height = (rect.height.clamp(0.0, 1.0) * src_h).round() as u32;

    let px_left = px_left.min(width.saturating_sub(1));
    let px_top = px_top.min(height.saturating_sub(1));
    let px_right = (px_left + px_width).min(width);
    let px_bottom = (px_top + px_height).min(height);

    (
        px_left,
        px_top,
        px_right.saturating_sub(px_left).max(1),
        px_bottom.saturating_sub(px_top).max(1),
    )
}

/// Cut `rect` out of `image`.
pub fn crop_normalized(image: &DynamicImage, rect: &NormalizedRect) -> DynamicImage {
    if *rect == NormalizedRect::FULL {
        return image.clone();
    }
    let (x, y, width, height) = pixel_region(image.width(), image.height(), rect);
    image.crop_imm(x, y, width, height)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
