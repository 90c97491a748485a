//! Projection of the on-screen view into a source-pixel crop rectangle.
//!
//! # Algorithm
//!
//! With the natural source size `S` and the measured (transformed) image
//! rectangle `I`, the pixel ratios are `h = S.w / I.w` and `v = S.h / I.h`.
//! The visible part of the image starts where the container starts, so
//!
//! ```text
//! offset = (h * max(C.page_x - I.page_x, 0), v * max(C.page_y - I.page_y, 0))
//! size   = (h * C.w, v * C.h)
//! ```
//!
//! and a crop frame narrows that to `offset += (h * left, v * top)`,
//! `size = (h * width, v * height)`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cell::SharedValue;
use crate::error::CropError;
use crate::geometry::{CropRectangle, FrameRect, Size};
use crate::layout::Rect;
use crate::services::{CropDataHandler, CropPrimitive, Element, ImageSizeSource, LayoutMeasurer, PassThrough};

/// Successful crop result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CroppedImage {
    pub uri: String,
}

/// Compute the crop rectangle for the current measurements.
///
/// The result is clamped into the source bounds.
pub fn compute_crop_rectangle(
    source: Size,
    container: &Rect,
    image: &Rect,
    frame: Option<&FrameRect>,
) -> Result<CropRectangle, CropError> {
    let h = source.width / image.width;
    let v = source.height / image.height;

    let mut rect = CropRectangle::new(
        h * (container.page_x - image.page_x).max(0.0),
        v * (container.page_y - image.page_y).max(0.0),
        h * container.width,
        v * container.height,
    );

    if let Some(frame) = frame {
        rect.offset.x += h * frame.left;
        rect.offset.y += v * frame.top;
        rect.size = Size::new(h * frame.width, v * frame.height);
    }

    if !rect.is_usable() {
        return Err(CropError::UncroppableArea);
    }
    rect.clamp_to(source).ok_or(CropError::UncroppableArea)
}

/// Values a crop request reads from the live cropper.
#[derive(Debug, Clone, Default)]
pub struct CropState {
    /// Current source URI.
    pub uri: SharedValue<String>,
    /// Current crop frame; `None` when no frame is configured or placed.
    pub frame: SharedValue<Option<FrameRect>>,
    in_flight: Arc<AtomicBool>,
}

impl CropState {
    pub fn new(uri: SharedValue<String>, frame: SharedValue<Option<FrameRect>>) -> Self {
        Self {
            uri,
            frame,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_cropping(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the single crop slot.
    fn begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_flight))
    }
}

/// Releases the crop slot when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs crop requests against the host's collaborators.
#[derive(Debug, Clone)]
pub struct CropProjector<M, S, C, H = PassThrough> {
    state: CropState,
    measurer: M,
    sizes: S,
    primitive: C,
    handler: H,
}

impl<M, S, C> CropProjector<M, S, C, PassThrough>
where
    M: LayoutMeasurer,
    S: ImageSizeSource,
    C: CropPrimitive,
{
    pub fn new(state: CropState, measurer: M, sizes: S, primitive: C) -> Self {
        Self {
            state,
            measurer,
            sizes,
            primitive,
            handler: PassThrough,
        }
    }
}

impl<M, S, C, H> CropProjector<M, S, C, H>
where
    M: LayoutMeasurer,
    S: ImageSizeSource,
    C: CropPrimitive,
    H: CropDataHandler,
{
    /// Replace the crop-data handler.
    pub fn with_handler<H2: CropDataHandler>(self, handler: H2) -> CropProjector<M, S, C, H2> {
        CropProjector {
            state: self.state,
            measurer: self.measurer,
            sizes: self.sizes,
            primitive: self.primitive,
            handler,
        }
    }

    pub fn state(&self) -> &CropState {
        &self.state
    }

    /// Crop the source to what is currently visible (or framed).
    ///
    /// Only one request runs at a time; a concurrent call fails with
    /// [`CropError::CropInProgress`].
    pub async fn crop_image(&self) -> Result<CroppedImage, CropError> {
        let _slot = self.state.begin().ok_or(CropError::CropInProgress)?;

        let uri = self.state.uri.get();
        let source = self.sizes.natural_size(&uri).await?;
        if source.is_empty() {
            return Err(CropError::Dimension);
        }

        let container = self.measurer.measure(Element::Container).await;
        let image = self.measurer.measure(Element::Image).await;
        let frame = self.state.frame.get();

        let rect = compute_crop_rectangle(source, &container, &image, frame.as_ref())?;
        let rect = self.handler.handle(rect).await;
        log::debug!(
            "cropping {} at ({:.1}, {:.1}) size {:.1}x{:.1}",
            uri,
            rect.offset.x,
            rect.offset.y,
            rect.size.width,
            rect.size.height
        );

        let uri = self
            .primitive
            .crop(&uri, rect)
            .await
            .map_err(CropError::NativeCrop)?;
        Ok(CroppedImage { uri })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use std::cell::RefCell;

    struct FakeMeasurer {
        container: Rect,
        image: Rect,
    }

    impl LayoutMeasurer for FakeMeasurer {
        async fn measure(&self, element: Element) -> Rect {
            match element {
                Element::Container => self.container,
                Element::Image => self.image,
            }
        }
    }

    struct FakeSizes(Result<Size, SourceError>);

    impl ImageSizeSource for FakeSizes {
        async fn natural_size(&self, _uri: &str) -> Result<Size, SourceError> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct FakePrimitive {
        fail_with: Option<String>,
        calls: RefCell<Vec<(String, CropRectangle)>>,
    }

    impl CropPrimitive for FakePrimitive {
        async fn crop(&self, uri: &str, rect: CropRectangle) -> Result<String, String> {
            self.calls.borrow_mut().push((uri.to_string(), rect));
            match &self.fail_with {
                Some(message) => Err(message.clone()),
                None => Ok(format!("{uri}.cropped")),
            }
        }
    }

    struct Inset(f64);

    impl CropDataHandler for Inset {
        async fn handle(&self, rect: CropRectangle) -> CropRectangle {
            CropRectangle::new(
                rect.offset.x + self.0,
                rect.offset.y + self.0,
                rect.size.width - 2.0 * self.0,
                rect.size.height - 2.0 * self.0,
            )
        }
    }

    fn state(frame: Option<FrameRect>) -> CropState {
        CropState::new(
            SharedValue::new("file:///photo.jpg".to_string()),
            SharedValue::new(frame),
        )
    }

    fn half_size_view() -> FakeMeasurer {
        FakeMeasurer {
            container: Rect::new(0.0, 0.0, 500.0, 250.0),
            image: Rect::new(0.0, 0.0, 500.0, 250.0),
        }
    }

    #[test]
    fn test_whole_view_maps_to_whole_source() {
        let rect = compute_crop_rectangle(
            Size::new(1000.0, 500.0),
            &Rect::new(0.0, 0.0, 500.0, 250.0),
            &Rect::new(0.0, 0.0, 500.0, 250.0),
            None,
        )
        .unwrap();
        assert_eq!(rect, CropRectangle::new(0.0, 0.0, 1000.0, 500.0));
    }

    #[test]
    fn test_frame_maps_to_source_pixels() {
        let frame = FrameRect::new(100.0, 50.0, 200.0, 100.0);
        let rect = compute_crop_rectangle(
            Size::new(1000.0, 500.0),
            &Rect::new(0.0, 0.0, 500.0, 250.0),
            &Rect::new(0.0, 0.0, 500.0, 250.0),
            Some(&frame),
        )
        .unwrap();
        assert_eq!(rect, CropRectangle::new(200.0, 100.0, 400.0, 200.0));
    }

    #[test]
    fn test_zoomed_view_offsets_by_overflow() {
        // Image at 2x, shifted so the container starts 250 points into it
        let container = Rect::new(0.0, 0.0, 500.0, 250.0).at_page(0.0, 100.0);
        let image = Rect::new(0.0, 0.0, 1000.0, 500.0).at_page(-250.0, -25.0);
        let rect = compute_crop_rectangle(Size::new(1000.0, 500.0), &container, &image, None).unwrap();
        assert_eq!(rect, CropRectangle::new(250.0, 125.0, 500.0, 250.0));
    }

    #[test]
    fn test_unmeasured_image_is_uncroppable() {
        let result = compute_crop_rectangle(
            Size::new(1000.0, 500.0),
            &Rect::new(0.0, 0.0, 500.0, 250.0),
            &Rect::default(),
            None,
        );
        assert_eq!(result, Err(CropError::UncroppableArea));
    }

    #[test]
    fn test_crop_image_delegates_to_primitive() {
        let primitive = FakePrimitive::default();
        let projector = CropProjector::new(
            state(None),
            half_size_view(),
            FakeSizes(Ok(Size::new(1000.0, 500.0))),
            &primitive,
        );

        let cropped = pollster::block_on(projector.crop_image()).unwrap();
        assert_eq!(cropped.uri, "file:///photo.jpg.cropped");

        let calls = primitive.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, CropRectangle::new(0.0, 0.0, 1000.0, 500.0));
        assert!(!projector.state().is_cropping());
    }

    #[test]
    fn test_crop_image_reads_live_frame() {
        let primitive = FakePrimitive::default();
        let crop_state = state(None);
        let projector = CropProjector::new(
            crop_state.clone(),
            half_size_view(),
            FakeSizes(Ok(Size::new(1000.0, 500.0))),
            &primitive,
        );

        crop_state.frame.set(Some(FrameRect::new(100.0, 50.0, 200.0, 100.0)));
        pollster::block_on(projector.crop_image()).unwrap();
        assert_eq!(
            primitive.calls.borrow()[0].1,
            CropRectangle::new(200.0, 100.0, 400.0, 200.0)
        );
    }

    #[test]
    fn test_fetch_failure() {
        let projector = CropProjector::new(
            state(None),
            half_size_view(),
            FakeSizes(Err(SourceError::Io("gone".to_string()))),
            FakePrimitive::default(),
        );
        let err = pollster::block_on(projector.crop_image()).unwrap_err();
        assert!(matches!(err, CropError::SourceFetch(_)));
    }

    #[test]
    fn test_zero_dimension() {
        let projector = CropProjector::new(
            state(None),
            half_size_view(),
            FakeSizes(Ok(Size::new(0.0, 500.0))),
            FakePrimitive::default(),
        );
        let err = pollster::block_on(projector.crop_image()).unwrap_err();
        assert_eq!(err, CropError::Dimension);
    }

    #[test]
    fn test_native_error_verbatim() {
        let primitive = FakePrimitive {
            fail_with: Some("E_NO_SPACE".to_string()),
            ..FakePrimitive::default()
        };
        let projector = CropProjector::new(
            state(None),
            half_size_view(),
            FakeSizes(Ok(Size::new(1000.0, 500.0))),
            primitive,
        );
        let err = pollster::block_on(projector.crop_image()).unwrap_err();
        assert_eq!(err.to_string(), "E_NO_SPACE");
        assert!(!projector.state().is_cropping());
    }

    #[test]
    fn test_handler_adjusts_rectangle() {
        let primitive = FakePrimitive::default();
        let projector = CropProjector::new(
            state(None),
            half_size_view(),
            FakeSizes(Ok(Size::new(1000.0, 500.0))),
            &primitive,
        )
        .with_handler(Inset(10.0));

        pollster::block_on(projector.crop_image()).unwrap();
        assert_eq!(
            primitive.calls.borrow()[0].1,
            CropRectangle::new(10.0, 10.0, 980.0, 480.0)
        );
    }

    #[test]
    fn test_concurrent_crop_rejected() {
        let projector = CropProjector::new(
            state(None),
            half_size_view(),
            FakeSizes(Ok(Size::new(1000.0, 500.0))),
            FakePrimitive::default(),
        );

        let slot = projector.state().begin();
        assert!(slot.is_some());
        let err = pollster::block_on(projector.crop_image()).unwrap_err();
        assert_eq!(err, CropError::CropInProgress);

        drop(slot);
        assert!(pollster::block_on(projector.crop_image()).is_ok());
    }
}
