//! The cropper component.
//!
//! [`ImageCropper`] wires layout, gestures, the crop frame and the status
//! record together. It performs no I/O: the host feeds it measurements and
//! recogniser events, resolves the [`SourceRequest`]s it hands out, drives
//! time through [`ImageCropper::advance`] and renders from the read side.
//!
//! # Example
//!
//! ```ignore
//! let mut cropper = ImageCropper::new(CropperConfig::new("file:///a.jpg"))?;
//! if let Some(request) = cropper.take_source_request() {
//!     let size = source.natural_size(&request.uri).await;
//!     cropper.on_source_resolved(&request, size);
//! }
//! cropper.on_container_layout(container);
//! cropper.on_image_layout(image);
//! cropper.on_double_tap(&TapEvent { x: 120.0, y: 80.0 });
//! cropper.advance(16.0);
//! ```

use std::fmt;

use crate::animation::{Generation, Token};
use crate::cell::SharedValue;
use crate::config::CropperConfig;
use crate::display::{FitMode, ImageStyle};
use crate::error::{ConfigError, SourceError};
use crate::frame::{frame_container_for, FrameEdit, FrameReconciler};
use crate::geometry::{FrameRect, Size, ViewTransform};
use crate::gesture::{GestureReconciler, GestureState, PanEvent, PinchEvent, TapEvent, Viewport};
use crate::layout::{LayoutTracker, Rect};
use crate::limits::ScaleBounds;
use crate::projector::CropState;
use crate::statements::{ImageError, ImageStatus, StateChange, Statements, StatementsPatch, StatementsTracker};

/// Natural-size lookup the host must perform for a new source URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
    pub uri: String,
    token: Token,
}

type ChangeListener = Box<dyn FnMut(&StateChange)>;

fn viewport(layout: &LayoutTracker, bounds: ScaleBounds, mode: FitMode) -> Viewport<'_> {
    Viewport {
        container: layout.container(),
        image: layout.image(),
        bounds,
        mode,
    }
}

/// Interactive image cropper state.
pub struct ImageCropper {
    mode: FitMode,
    bounds: ScaleBounds,
    layout: LayoutTracker,
    gestures: GestureReconciler,
    frame: Option<FrameReconciler>,
    statements: StatementsTracker,
    image_ratio: f64,
    sources: Generation,
    pending_source: Option<Token>,
    initial_request: Option<SourceRequest>,
    crop_state: CropState,
    listener: Option<ChangeListener>,
}

impl ImageCropper {
    /// Build a cropper; the configured URI becomes the first source request.
    pub fn new(config: CropperConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = config.scale_bounds()?;

        let frame = config
            .frame
            .clone()
            .map(|frame| FrameReconciler::new(frame, config.animation));
        let frame_cell = frame
            .as_ref()
            .map(FrameReconciler::shared_rect)
            .unwrap_or_default();

        let mut cropper = Self {
            mode: config.mode,
            bounds,
            layout: LayoutTracker::new(),
            gestures: GestureReconciler::new(config.animation),
            frame,
            statements: StatementsTracker::new(),
            image_ratio: 0.0,
            sources: Generation::new(),
            pending_source: None,
            initial_request: None,
            crop_state: CropState::new(SharedValue::default(), frame_cell),
            listener: None,
        };
        cropper.initial_request = cropper.set_uri(config.uri);
        Ok(cropper)
    }

    /// Register the sink notified on every status change.
    pub fn on_change_state(&mut self, listener: impl FnMut(&StateChange) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    // ------------------------------------------------------------------
    // Source
    // ------------------------------------------------------------------

    pub fn uri(&self) -> String {
        self.crop_state.uri.get()
    }

    /// Request issued for the configured URI, if it has not been taken yet.
    pub fn take_source_request(&mut self) -> Option<SourceRequest> {
        self.initial_request.take()
    }

    /// Switch to a new source.
    ///
    /// Returns the one size lookup the host must perform, or `None` when the
    /// URI did not change.
    pub fn set_uri(&mut self, uri: impl Into<String>) -> Option<SourceRequest> {
        let uri = uri.into();
        if uri.is_empty() || self.crop_state.uri.with(|current| *current == uri) {
            return None;
        }
        self.crop_state.uri.set(uri.clone());
        self.image_ratio = 0.0;
        self.initial_request = None;
        self.emit(StatementsPatch::image(ImageStatus::UNLOADED));

        let token = self.sources.bump();
        self.pending_source = Some(token);
        log::debug!("fetching natural size of {}", uri);
        Some(SourceRequest { uri, token })
    }

    /// Feed the outcome of a [`SourceRequest`]; stale requests are ignored.
    pub fn on_source_resolved(&mut self, request: &SourceRequest, result: Result<Size, SourceError>) -> bool {
        if self.pending_source != Some(request.token) || !self.sources.is_current(request.token) {
            log::trace!("ignoring stale size of {}", request.uri);
            return false;
        }
        self.pending_source = None;

        match result.map(|size| size.ratio()) {
            Ok(Some(ratio)) => self.image_ratio = ratio,
            Ok(None) => self.on_image_error(format!("{} has no usable dimensions", request.uri)),
            Err(err) => self.on_image_error(err.to_string()),
        }
        true
    }

    // ------------------------------------------------------------------
    // Layout and image lifecycle
    // ------------------------------------------------------------------

    pub fn on_container_layout(&mut self, rect: Rect) {
        self.layout.on_container_layout(rect);
    }

    /// New image measurement: the view starts over at rest.
    pub fn on_image_layout(&mut self, measured: Rect) {
        let scale = self.gestures.transform().scale;
        self.layout.on_image_layout(measured, scale);

        if self.gestures.reset() {
            self.emit(StatementsPatch::double_zooming(false));
        }
        let scale = self.gestures.transform().scale;
        if let Some(frame) = self.frame.as_mut() {
            let container = frame_container_for(scale, self.layout.container(), self.layout.image());
            frame.reset(container);
        }
    }

    pub fn on_image_load(&mut self) {
        self.emit(StatementsPatch::image(ImageStatus::loaded()));
    }

    pub fn on_image_error(&mut self, message: impl Into<String>) {
        let error = ImageError::new(message);
        log::warn!("image {} failed to load: {}", self.uri(), error.message);
        self.emit(StatementsPatch::image(ImageStatus::failed(error)));
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    pub fn on_pinch_state(&mut self, state: GestureState) {
        let vp = viewport(&self.layout, self.bounds, self.mode);
        match state {
            GestureState::Began | GestureState::Active => {
                if self.gestures.pinch_session().is_none() && self.gestures.begin_pinch(&vp) {
                    self.emit(StatementsPatch::zooming(true));
                }
            }
            _ if state.is_terminal() => {
                let settled = self.gestures.end_pinch(&vp);
                self.emit(StatementsPatch::zooming(false));
                if let Some(target) = settled {
                    self.reconcile_frame(target.scale);
                }
            }
            _ => {}
        }
    }

    pub fn on_pinch_event(&mut self, event: &PinchEvent) {
        let vp = viewport(&self.layout, self.bounds, self.mode);
        if self.gestures.update_pinch(&vp, event) {
            self.emit(StatementsPatch::zooming(true));
        }
    }

    pub fn on_pan_state(&mut self, state: GestureState) {
        let vp = viewport(&self.layout, self.bounds, self.mode);
        match state {
            GestureState::Began | GestureState::Active => {
                if self.gestures.pan_session().is_none() && self.gestures.begin_pan(&vp) {
                    self.emit(StatementsPatch::dragging(true));
                }
            }
            _ if state.is_terminal() => {
                let settled = self.gestures.end_pan(&vp);
                self.emit(StatementsPatch::dragging(false));
                if let Some(target) = settled {
                    self.reconcile_frame(target.scale);
                }
            }
            _ => {}
        }
    }

    pub fn on_pan_event(&mut self, event: &PanEvent) {
        let vp = viewport(&self.layout, self.bounds, self.mode);
        if self.gestures.update_pan(&vp, event) {
            self.emit(StatementsPatch::dragging(true));
        }
    }

    pub fn on_double_tap(&mut self, event: &TapEvent) {
        let vp = viewport(&self.layout, self.bounds, self.mode);
        if let Some(target) = self.gestures.double_tap(&vp, event) {
            self.emit(StatementsPatch::double_zooming(true));
            self.reconcile_frame(target.scale);
        }
    }

    // ------------------------------------------------------------------
    // Frame editing
    // ------------------------------------------------------------------

    pub fn begin_frame_edit(&mut self, edit: FrameEdit) -> bool {
        self.frame.as_mut().is_some_and(|frame| frame.begin_edit(edit))
    }

    pub fn update_frame_edit(&mut self, dx: f64, dy: f64) -> Option<FrameRect> {
        self.frame.as_mut()?.update_edit(dx, dy)
    }

    pub fn end_frame_edit(&mut self) -> Option<FrameRect> {
        self.frame.as_mut()?.end_edit()
    }

    fn reconcile_frame(&mut self, scale: f64) {
        if let Some(frame) = self.frame.as_mut() {
            frame.reconcile(scale, self.layout.container(), self.layout.image());
        }
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Step every animation by `dt_ms` and dispatch the finished ones.
    pub fn advance(&mut self, dt_ms: f64) {
        self.gestures.advance(dt_ms);
        if let Some(frame) = self.frame.as_mut() {
            frame.advance(dt_ms);
        }
        self.dispatch_completions();
    }

    pub fn is_animating(&self) -> bool {
        self.gestures.is_animating() || self.frame.as_ref().is_some_and(FrameReconciler::is_animating)
    }

    fn dispatch_completions(&mut self) {
        let finished: Vec<_> = self.gestures.take_completions().collect();
        for completion in finished {
            if self.gestures.complete(completion) {
                self.emit(StatementsPatch::double_zooming(false));
            }
        }

        if let Some(frame) = self.frame.as_mut() {
            let finished: Vec<_> = frame.take_completions().collect();
            for completion in finished {
                frame.complete(completion);
            }
        }
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    pub fn transform(&self) -> ViewTransform {
        self.gestures.transform()
    }

    pub fn image_style(&self) -> ImageStyle {
        let ratio = (self.image_ratio > 0.0).then_some(self.image_ratio);
        ImageStyle {
            size: ratio.and_then(|r| self.mode.display_size(r, self.layout.container().size())),
            aspect_ratio: ratio,
            transform: self.gestures.transform(),
        }
    }

    pub fn image_ratio(&self) -> Option<f64> {
        (self.image_ratio > 0.0).then_some(self.image_ratio)
    }

    pub fn frame_rect(&self) -> Option<FrameRect> {
        self.frame.as_ref()?.rect()
    }

    /// Box the crop frame lives in.
    pub fn frame_container_size(&self) -> Size {
        let committed = match &self.frame {
            Some(frame) => frame.container_size(),
            None => frame_container_for(self.transform().scale, self.layout.container(), self.layout.image()),
        };
        self.mode.frame_container_size(self.layout.container().size(), committed)
    }

    /// Grid line offsets `(vertical, horizontal)` inside the frame.
    pub fn frame_lines(&self) -> Option<(Vec<f64>, Vec<f64>)> {
        let frame = self.frame.as_ref()?;
        let lines = frame.config().lines?;
        let rect = frame.rect()?;
        Some((lines.vertical_offsets(rect.width), lines.horizontal_offsets(rect.height)))
    }

    pub fn statements(&self) -> &Statements {
        self.statements.current()
    }

    /// Image loaded and laid out: gestures and crops can run.
    pub fn is_ready(&self) -> bool {
        self.statements.current().image.is_loaded && self.layout.is_measured()
    }

    /// Shared cells a [`crate::projector::CropProjector`] reads from.
    pub fn crop_state(&self) -> CropState {
        self.crop_state.clone()
    }

    fn emit(&mut self, patch: StatementsPatch) {
        let Some(change) = self.statements.apply(patch) else {
            return;
        };
        if let Some(listener) = self.listener.as_mut() {
            listener(&change);
        }
    }
}

impl fmt::Debug for ImageCropper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageCropper")
            .field("uri", &self.crop_state.uri)
            .field("mode", &self.mode)
            .field("transform", &self.gestures.transform())
            .field("frame", &self.frame_rect())
            .field("statements", self.statements.current())
            .finish_non_exhaustive()
    }
}
