//! Measured rectangles of the viewport container and the displayed image.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// A measured element rectangle.
///
/// `x`/`y` are relative to the parent, `page_x`/`page_y` are screen-absolute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub page_x: f64,
    #[serde(default)]
    pub page_y: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            page_x: x,
            page_y: y,
        }
    }

    /// Builder for the screen-absolute origin.
    pub fn at_page(mut self, page_x: f64, page_y: f64) -> Self {
        self.page_x = page_x;
        self.page_y = page_y;
        self
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }
}

/// Latest container and image rectangles.
///
/// Pure state holder: every measurement replaces the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutTracker {
    container: Rect,
    image: Rect,
}

impl LayoutTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(&self) -> &Rect {
        &self.container
    }

    pub fn image(&self) -> &Rect {
        &self.image
    }

    pub fn on_container_layout(&mut self, rect: Rect) {
        self.container = rect;
    }

    /// Store the image rectangle measured while `current_scale` was applied.
    ///
    /// The stored size is the un-transformed one.
    pub fn on_image_layout(&mut self, measured: Rect, current_scale: f64) {
        let scale = if current_scale > 0.0 { current_scale } else { 1.0 };
        self.image = Rect {
            width: measured.width / scale,
            height: measured.height / scale,
            ..measured
        };
    }

    /// True once both rectangles have a positive size.
    pub fn is_measured(&self) -> bool {
        !self.container.is_empty() && !self.image.is_empty()
    }
}
