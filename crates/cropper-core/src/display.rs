//! Fit strategies for sizing the image inside the viewport.
//!
//! `Center` letterboxes so the whole image is visible; `Cover` fills the
//! viewport and lets the overflow be panned. Both are closed variants whose
//! geometry lives in the pure functions below.

use serde::{Deserialize, Serialize};

use crate::geometry::{Size, ViewTransform};

/// How the image is fitted into the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Contain the whole image, letterboxing the remaining space.
    #[default]
    Center,
    /// Fill the viewport, cropping the overflow.
    Cover,
}

impl FitMode {
    /// Displayed image size for `image_ratio` (width / height) in `container`.
    ///
    /// Returns `None` until both the ratio and the container are known.
    pub fn display_size(self, image_ratio: f64, container: Size) -> Option<Size> {
        if image_ratio.is_nan() || image_ratio <= 0.0 || container.is_empty() {
            return None;
        }
        let container_ratio = container.width / container.height;
        let wider = image_ratio > container_ratio;

        let width_bound = Size::new(container.width, container.width / image_ratio);
        let height_bound = Size::new(container.height * image_ratio, container.height);

        Some(match (self, wider) {
            (FitMode::Center, true) | (FitMode::Cover, false) => width_bound,
            (FitMode::Center, false) | (FitMode::Cover, true) => height_bound,
        })
    }

    /// Size of the box the crop frame may move in.
    ///
    /// Cover mode always uses the whole viewport; center mode uses the
    /// committed frame-container size.
    pub fn frame_container_size(self, container: Size, committed: Size) -> Size {
        match self {
            FitMode::Cover => container,
            FitMode::Center => committed,
        }
    }

    /// True if an axis must be pinned at zero translation.
    ///
    /// Center mode pins an axis whose scaled image fits in the container;
    /// cover mode leaves it to the limits.
    pub fn pins_axis(self, scaled_image_extent: f64, container_extent: f64) -> bool {
        match self {
            FitMode::Center => scaled_image_extent <= container_extent,
            FitMode::Cover => false,
        }
    }
}

/// Everything a renderer needs to draw the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStyle {
    /// Untransformed display size, `None` until ratio and container are known.
    pub size: Option<Size>,
    pub aspect_ratio: Option<f64>,
    pub transform: ViewTransform,
}
