//! Collaborators the cropper talks to but does not implement.
//!
//! Every call may suspend. The futures are not required to be `Send`, so
//! single-threaded hosts (the browser) can implement them with promises.

#![allow(async_fn_in_trait)]

use crate::error::SourceError;
use crate::geometry::{CropRectangle, Size};
use crate::layout::Rect;

/// Element whose on-screen rectangle can be measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// The viewport the image is shown in.
    Container,
    /// The transformed image view.
    Image,
}

/// Screen-absolute measurement of rendered elements.
pub trait LayoutMeasurer {
    async fn measure(&self, element: Element) -> Rect;
}

/// Natural pixel dimensions of a source image.
pub trait ImageSizeSource {
    async fn natural_size(&self, uri: &str) -> Result<Size, SourceError>;
}

/// Native crop: cuts `rect` (source pixels) out of `uri` and returns the new URI.
///
/// The error string is surfaced to the caller unchanged.
pub trait CropPrimitive {
    async fn crop(&self, uri: &str, rect: CropRectangle) -> Result<String, String>;
}

/// Last chance to adjust the crop rectangle before the primitive runs.
pub trait CropDataHandler {
    async fn handle(&self, rect: CropRectangle) -> CropRectangle;
}

/// Handler that leaves the rectangle untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl CropDataHandler for PassThrough {
    async fn handle(&self, rect: CropRectangle) -> CropRectangle {
        rect
    }
}

impl<T: LayoutMeasurer + ?Sized> LayoutMeasurer for &T {
    async fn measure(&self, element: Element) -> Rect {
        (**self).measure(element).await
    }
}

impl<T: ImageSizeSource + ?Sized> ImageSizeSource for &T {
    async fn natural_size(&self, uri: &str) -> Result<Size, SourceError> {
        (**self).natural_size(uri).await
    }
}

impl<T: CropPrimitive + ?Sized> CropPrimitive for &T {
    async fn crop(&self, uri: &str, rect: CropRectangle) -> Result<String, String> {
        (**self).crop(uri, rect).await
    }
}

impl<T: CropDataHandler + ?Sized> CropDataHandler for &T {
    async fn handle(&self, rect: CropRectangle) -> CropRectangle {
        (**self).handle(rect).await
    }
}
