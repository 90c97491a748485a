//! Scale and translation bounds that keep the image covering the viewport.
//!
//! For a clamped scale `s` in `[min, max]` the largest translate magnitude on
//! the horizontal axis is
//!
//! ```text
//! offset_x = cw * (s - min) / (2 * s) - (cw - iw) / 2
//! ```
//!
//! and symmetrically on the vertical axis. A negative offset means the
//! scaled image is narrower than the container and cannot move on that axis.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::clamp_symmetric;
use crate::layout::Rect;

pub const DEFAULT_MIN_SCALE: f64 = 1.0;
pub const DEFAULT_MAX_SCALE: f64 = 4.0;

/// Allowed zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_SCALE,
            max: DEFAULT_MAX_SCALE,
        }
    }
}

impl ScaleBounds {
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min > 0.0 && self.min.is_finite()) {
            return Err(ConfigError::InvalidScale(self.min));
        }
        if !(self.max.is_finite() && self.max >= self.min) {
            return Err(ConfigError::ScaleRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }
}

/// Result of a limit computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// Scale clamped into the bounds.
    pub scale: f64,
    /// Largest horizontal translate magnitude at `scale`.
    pub offset_x: f64,
    /// Largest vertical translate magnitude at `scale`.
    pub offset_y: f64,
}

impl Limits {
    pub fn clamp_translate_x(&self, translate_x: f64) -> f64 {
        clamp_symmetric(translate_x, self.offset_x)
    }

    pub fn clamp_translate_y(&self, translate_y: f64) -> f64 {
        clamp_symmetric(translate_y, self.offset_y)
    }
}

/// Compute the bounds for a candidate `scale`.
///
/// Callers must pass current rectangles; stale ones give wrong but finite
/// bounds.
pub fn compute_limits(scale: f64, container: &Rect, image: &Rect, bounds: ScaleBounds) -> Limits {
    let limit_scale = bounds.clamp(scale);
    let offset = |container_extent: f64, image_extent: f64| {
        container_extent * (limit_scale - bounds.min) / 2.0 / limit_scale
            - (container_extent - image_extent) / 2.0
    };

    Limits {
        scale: limit_scale,
        offset_x: offset(container.width, image.width),
        offset_y: offset(container.height, image.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(width: f64, height: f64) -> Rect {
        Rect::new(0.0, 0.0, width, height)
    }

    #[test]
    fn test_identity_scale_same_size() {
        let limits = compute_limits(1.0, &rect(500.0, 250.0), &rect(500.0, 250.0), ScaleBounds::default());
        assert_eq!(limits.scale, 1.0);
        assert_eq!(limits.offset_x, 0.0);
        assert_eq!(limits.offset_y, 0.0);
    }

    #[test]
    fn test_double_scale_offsets() {
        let limits = compute_limits(2.0, &rect(500.0, 250.0), &rect(500.0, 250.0), ScaleBounds::default());
        // 500 * 1 / 4 = 125
        assert_eq!(limits.offset_x, 125.0);
        assert_eq!(limits.offset_y, 62.5);
    }

    #[test]
    fn test_scale_is_clamped() {
        let bounds = ScaleBounds::default();
        let c = rect(500.0, 500.0);
        assert_eq!(compute_limits(0.2, &c, &c, bounds).scale, 1.0);
        assert_eq!(compute_limits(9.0, &c, &c, bounds).scale, 4.0);
    }

    #[test]
    fn test_letterboxed_axis_is_pinned() {
        // Image narrower than the container: no horizontal movement at scale 1
        let limits = compute_limits(1.0, &rect(500.0, 500.0), &rect(250.0, 500.0), ScaleBounds::default());
        assert!(limits.offset_x < 0.0);
        assert_eq!(limits.clamp_translate_x(40.0), 0.0);
    }

    #[test]
    fn test_cover_overflow_can_move_at_rest() {
        // Image wider than the container can pan by half the overflow
        let limits = compute_limits(1.0, &rect(500.0, 500.0), &rect(800.0, 500.0), ScaleBounds::default());
        assert_eq!(limits.offset_x, 150.0);
        assert_eq!(limits.clamp_translate_x(-400.0), -150.0);
    }

    #[test]
    fn test_bounds_validation() {
        assert!(ScaleBounds::new(1.0, 4.0).is_ok());
        assert!(ScaleBounds::new(0.0, 4.0).is_err());
        assert!(ScaleBounds::new(2.0, 1.0).is_err());
        assert!(ScaleBounds::new(1.0, f64::INFINITY).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
