//! Value types shared by every stage of the cropper.
//!
//! # Coordinate System
//!
//! - View transform values are in layout points, applied as
//!   `scale` first and then `translate` (the translation is expressed in
//!   un-scaled image points)
//! - Frame rectangles are relative to the frame-container, origin top-left
//! - Crop rectangles are in source-image pixels

use serde::{Deserialize, Serialize};

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True if either side is zero, negative or not a number.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Width over height, or `None` for an empty size.
    pub fn ratio(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.width / self.height)
        }
    }
}

/// A point in layout or pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Affine view parameters of the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            scale,
            translate_x,
            translate_y,
        }
    }

    /// Component-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &ViewTransform, tolerance: f64) -> bool {
        (self.scale - other.scale).abs() <= tolerance
            && (self.translate_x - other.translate_x).abs() <= tolerance
            && (self.translate_y - other.translate_y).abs() <= tolerance
    }
}

/// Crop frame position and size inside the frame-container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl FrameRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Width over height; falls back to 1.0 for a degenerate frame.
    pub fn aspect_ratio(&self) -> f64 {
        self.size().ratio().unwrap_or(1.0)
    }

    /// True if the frame lies inside `[0, container.width] x [0, container.height]`
    /// within `tolerance`.
    pub fn is_within(&self, container: Size, tolerance: f64) -> bool {
        self.left >= -tolerance
            && self.top >= -tolerance
            && self.right() <= container.width + tolerance
            && self.bottom() <= container.height + tolerance
    }
}

/// Crop region in source-image pixels, in the shape the crop primitive expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRectangle {
    pub offset: Point,
    pub size: Size,
}

impl CropRectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            offset: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// True when every component is finite and the size is positive.
    pub fn is_usable(&self) -> bool {
        self.offset.x.is_finite()
            && self.offset.y.is_finite()
            && self.size.width.is_finite()
            && self.size.height.is_finite()
            && !self.size.is_empty()
    }

    /// Intersect with `[0, source.width] x [0, source.height]`.
    ///
    /// Returns `None` when nothing of the rectangle is left.
    pub fn clamp_to(&self, source: Size) -> Option<CropRectangle> {
        let left = self.offset.x.clamp(0.0, source.width);
        let top = self.offset.y.clamp(0.0, source.height);
        let right = (self.offset.x + self.size.width).min(source.width);
        let bottom = (self.offset.y + self.size.height).min(source.height);

        let rect = CropRectangle::new(left, top, right - left, bottom - top);
        rect.is_usable().then_some(rect)
    }

    /// Express the rectangle as fractions of `source` (0.0 to 1.0).
    pub fn normalized(&self, source: Size) -> NormalizedRect {
        NormalizedRect {
            left: self.offset.x / source.width,
            top: self.offset.y / source.height,
            width: self.size.width / source.width,
            height: self.size.height / source.height,
        }
    }
}

/// Crop region relative to the image dimensions (0.0 to 1.0 on each axis).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedRect {
    pub const FULL: NormalizedRect = NormalizedRect {
        left: 0.0,
        top: 0.0,
        width: 1.0,
        height: 1.0,
    };
}

/// Restrict `value` to `[-limit, limit]`; a non-positive limit pins it to 0.
pub fn clamp_symmetric(value: f64, limit: f64) -> f64 {
    if limit > 0.0 {
        value.clamp(-limit, limit)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_empty() {
        assert!(Size::new(0.0, 10.0).is_empty());
        assert!(Size::new(10.0, -1.0).is_empty());
        assert!(Size::new(f64::NAN, 10.0).is_empty());
        assert!(!Size::new(10.0, 10.0).is_empty());
    }

    #[test]
    fn test_size_ratio() {
        assert_eq!(Size::new(1000.0, 500.0).ratio(), Some(2.0));
        assert_eq!(Size::new(0.0, 500.0).ratio(), None);
    }

    #[test]
    fn test_frame_within() {
        let frame = FrameRect::new(10.0, 10.0, 100.0, 50.0);
        assert!(frame.is_within(Size::new(110.0, 60.0), 1e-9));
        assert!(!frame.is_within(Size::new(100.0, 60.0), 1e-9));
    }

    #[test]
    fn test_crop_clamp_to_source() {
        let rect = CropRectangle::new(-10.0, 5.0, 120.0, 50.0);
        let clamped = rect.clamp_to(Size::new(100.0, 40.0)).unwrap();
        assert_eq!(clamped, CropRectangle::new(0.0, 5.0, 100.0, 35.0));
    }

    #[test]
    fn test_crop_clamp_outside_source() {
        let rect = CropRectangle::new(200.0, 0.0, 50.0, 50.0);
        assert!(rect.clamp_to(Size::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn test_crop_normalized() {
        let rect = CropRectangle::new(250.0, 100.0, 500.0, 200.0);
        let n = rect.normalized(Size::new(1000.0, 400.0));
        assert_eq!(n.left, 0.25);
        assert_eq!(n.top, 0.25);
        assert_eq!(n.width, 0.5);
        assert_eq!(n.height, 0.5);
    }

    #[test]
    fn test_clamp_symmetric() {
        assert_eq!(clamp_symmetric(30.0, 10.0), 10.0);
        assert_eq!(clamp_symmetric(-30.0, 10.0), -10.0);
        assert_eq!(clamp_symmetric(5.0, 10.0), 5.0);
        assert_eq!(clamp_symmetric(5.0, -3.0), 0.0);
    }
}
