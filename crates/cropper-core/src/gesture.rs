//! Gesture reconciliation: pinch, pan and double-tap to a bounded view transform.
//!
//! # Gesture Lifecycles
//!
//! Pinch and pan go `idle -> active -> settling -> idle`. A session value is
//! created when the gesture starts, updated on every event and dropped when
//! it ends. While active, values are written directly; ending a gesture
//! settles the transform into the limits with a spring.
//!
//! Double-tap is a discrete transition animated with a tween. While it runs
//! the reconciler rejects every other gesture.
//!
//! # Focal Anchoring
//!
//! Translation is expressed in un-scaled image points, so moving the scale by
//! `d` around a focal point that sits `f` points from the image centre needs a
//! translate change of `-d * f` to keep that point still.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::animation::{AnimatedValue, AnimationConfig, Easing, Finished, Generation, Token};
use crate::display::FitMode;
use crate::geometry::ViewTransform;
use crate::layout::Rect;
use crate::limits::{compute_limits, ScaleBounds};

/// Scales closer than this to the minimum count as "not zoomed".
const SCALE_EPSILON: f64 = 1e-3;

/// Recogniser state reported by the host's gesture plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureState {
    Undetermined,
    Began,
    Active,
    End,
    Failed,
    Cancelled,
}

impl GestureState {
    /// True for the states that finish a gesture.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GestureState::End | GestureState::Failed | GestureState::Cancelled
        )
    }
}

/// Continuous pinch update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinchEvent {
    /// Scale factor relative to the start of the gesture.
    pub scale: f64,
    /// Focal point relative to the image view.
    pub focal_x: f64,
    pub focal_y: f64,
}

/// Continuous pan update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanEvent {
    /// Accumulated translation since the start of the gesture.
    pub translation_x: f64,
    pub translation_y: f64,
    pub number_of_pointers: u32,
}

/// Double-tap location relative to the image view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapEvent {
    pub x: f64,
    pub y: f64,
}

/// Values captured when a pinch starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchSession {
    pub start_scale: f64,
    pub last_scale: f64,
}

/// Values captured when a pan starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSession {
    pub start_translate_x: f64,
    pub start_translate_y: f64,
    pub start_scale: f64,
}

/// Layout and policy a reconciliation runs against.
#[derive(Debug, Clone, Copy)]
pub struct Viewport<'a> {
    pub container: &'a Rect,
    pub image: &'a Rect,
    pub bounds: ScaleBounds,
    pub mode: FitMode,
}

impl Viewport<'_> {
    pub fn is_measured(&self) -> bool {
        !self.container.is_empty() && !self.image.is_empty()
    }
}

/// Completion payloads of gesture animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureCompletion {
    DoubleZoomFinished(Token),
}

/// Owner of the view transform.
#[derive(Debug)]
pub struct GestureReconciler {
    scale: AnimatedValue<GestureCompletion>,
    translate_x: AnimatedValue<GestureCompletion>,
    translate_y: AnimatedValue<GestureCompletion>,
    pinch: Option<PinchSession>,
    pan: Option<PanSession>,
    double_zooming: bool,
    generation: Generation,
    animation: AnimationConfig,
    completions: VecDeque<Finished<GestureCompletion>>,
}

impl GestureReconciler {
    pub fn new(animation: AnimationConfig) -> Self {
        Self {
            scale: AnimatedValue::new(1.0),
            translate_x: AnimatedValue::new(0.0),
            translate_y: AnimatedValue::new(0.0),
            pinch: None,
            pan: None,
            double_zooming: false,
            generation: Generation::new(),
            animation,
            completions: VecDeque::new(),
        }
    }

    /// Current, possibly mid-animation, transform.
    pub fn transform(&self) -> ViewTransform {
        ViewTransform::new(
            self.scale.value(),
            self.translate_x.value(),
            self.translate_y.value(),
        )
    }

    pub fn is_double_zooming(&self) -> bool {
        self.double_zooming
    }

    pub fn is_animating(&self) -> bool {
        self.scale.is_animating() || self.translate_x.is_animating() || self.translate_y.is_animating()
    }

    pub fn pinch_session(&self) -> Option<&PinchSession> {
        self.pinch.as_ref()
    }

    pub fn pan_session(&self) -> Option<&PanSession> {
        self.pan.as_ref()
    }

    fn accepts_input(&self, viewport: &Viewport<'_>) -> bool {
        !self.double_zooming && viewport.is_measured()
    }

    /// Jump to the identity transform, dropping sessions and animations.
    ///
    /// Returns true if a double-zoom was in flight (its flag is cleared).
    pub fn reset(&mut self) -> bool {
        self.generation.bump();
        self.write(ViewTransform::IDENTITY);
        self.pinch = None;
        self.pan = None;
        std::mem::replace(&mut self.double_zooming, false)
    }

    pub fn begin_pinch(&mut self, viewport: &Viewport<'_>) -> bool {
        if !self.accepts_input(viewport) {
            return false;
        }
        self.generation.bump();
        self.pinch = Some(PinchSession {
            start_scale: self.scale.value(),
            last_scale: 1.0,
        });
        true
    }

    pub fn update_pinch(&mut self, viewport: &Viewport<'_>, event: &PinchEvent) -> bool {
        if !self.accepts_input(viewport) {
            return false;
        }
        if self.pinch.is_none() && !self.begin_pinch(viewport) {
            return false;
        }
        let Some(session) = self.pinch.as_mut() else {
            return false;
        };

        let offset_x = event.focal_x - viewport.image.width / 2.0;
        let offset_y = event.focal_y - viewport.image.height / 2.0;
        let offset_scale = session.last_scale - event.scale;

        let next = ViewTransform::new(
            session.start_scale * event.scale,
            self.translate_x.value() + offset_scale * offset_x,
            self.translate_y.value() + offset_scale * offset_y,
        );
        session.last_scale = event.scale;

        self.write(next);
        true
    }

    /// Finish the pinch and settle; returns the settled transform.
    pub fn end_pinch(&mut self, viewport: &Viewport<'_>) -> Option<ViewTransform> {
        self.pinch = None;
        self.settle(viewport)
    }

    pub fn begin_pan(&mut self, viewport: &Viewport<'_>) -> bool {
        if !self.accepts_input(viewport) {
            return false;
        }
        self.generation.bump();
        self.pan = Some(PanSession {
            start_translate_x: self.translate_x.value(),
            start_translate_y: self.translate_y.value(),
            start_scale: self.scale.value(),
        });
        true
    }

    /// Apply a pan update; only single-pointer pans are accepted.
    pub fn update_pan(&mut self, viewport: &Viewport<'_>, event: &PanEvent) -> bool {
        if event.number_of_pointers != 1 || !self.accepts_input(viewport) {
            return false;
        }
        if self.pan.is_none() && !self.begin_pan(viewport) {
            return false;
        }
        let Some(session) = self.pan else {
            return false;
        };

        let next = ViewTransform::new(
            self.scale.value(),
            session.start_translate_x + event.translation_x / session.start_scale,
            session.start_translate_y + event.translation_y / session.start_scale,
        );
        self.write(next);
        true
    }

    /// Finish the pan and settle; returns the settled transform.
    pub fn end_pan(&mut self, viewport: &Viewport<'_>) -> Option<ViewTransform> {
        self.pan = None;
        self.settle(viewport)
    }

    /// Spring the transform into the limits for its current scale.
    pub fn settle(&mut self, viewport: &Viewport<'_>) -> Option<ViewTransform> {
        if !self.accepts_input(viewport) {
            return None;
        }
        let current = self.transform();
        let target = settle_target(&current, viewport);
        log::debug!(
            "settling scale {:.3} -> {:.3}, translate ({:.1}, {:.1}) -> ({:.1}, {:.1})",
            current.scale,
            target.scale,
            current.translate_x,
            current.translate_y,
            target.translate_x,
            target.translate_y
        );

        self.generation.bump();
        let spring = Easing::Spring(self.animation.spring);
        self.animate(target, spring, None);
        Some(target)
    }

    /// Toggle zoom around the tap point; returns the target transform.
    ///
    /// Sets the double-zoom flag until the animation completes.
    pub fn double_tap(&mut self, viewport: &Viewport<'_>, event: &TapEvent) -> Option<ViewTransform> {
        if !self.accepts_input(viewport) {
            return None;
        }
        let current = self.transform();
        let target = double_tap_target(&current, viewport, event);
        log::debug!(
            "double tap at ({:.1}, {:.1}): scale {:.3} -> {:.3}",
            event.x,
            event.y,
            current.scale,
            target.scale
        );

        let token = self.generation.bump();
        self.double_zooming = true;
        let timing = Easing::Timing(self.animation.timing);
        self.animate(target, timing, Some(GestureCompletion::DoubleZoomFinished(token)));
        Some(target)
    }

    /// Step the running animations by `dt_ms`.
    pub fn advance(&mut self, dt_ms: f64) {
        let finished = [
            self.scale.advance(dt_ms),
            self.translate_x.advance(dt_ms),
            self.translate_y.advance(dt_ms),
        ];
        self.completions.extend(finished.into_iter().flatten());
    }

    /// Completions waiting to be dispatched, oldest first.
    pub fn take_completions(&mut self) -> impl Iterator<Item = Finished<GestureCompletion>> + '_ {
        self.completions.drain(..)
    }

    /// Handle a dispatched completion; returns true if the double-zoom ended.
    pub fn complete(&mut self, finished: Finished<GestureCompletion>) -> bool {
        match finished.payload {
            GestureCompletion::DoubleZoomFinished(token) => {
                if finished.interrupted || !self.generation.is_current(token) {
                    log::trace!("discarding stale double-zoom completion");
                    return false;
                }
                std::mem::replace(&mut self.double_zooming, false)
            }
        }
    }

    fn write(&mut self, transform: ViewTransform) {
        let superseded = [
            self.scale.set(transform.scale),
            self.translate_x.set(transform.translate_x),
            self.translate_y.set(transform.translate_y),
        ];
        self.completions.extend(superseded.into_iter().flatten());
    }

    fn animate(&mut self, target: ViewTransform, easing: Easing, on_finish: Option<GestureCompletion>) {
        let superseded = [
            self.scale.animate_to(target.scale, easing, None),
            self.translate_x.animate_to(target.translate_x, easing, None),
            self.translate_y.animate_to(target.translate_y, easing, on_finish),
        ];
        self.completions.extend(superseded.into_iter().flatten());
    }
}

/// Transform a settle lands on: clamped scale, translate inside the limits.
pub fn settle_target(current: &ViewTransform, viewport: &Viewport<'_>) -> ViewTransform {
    let limits = compute_limits(current.scale, viewport.container, viewport.image, viewport.bounds);

    let translate_x = if viewport
        .mode
        .pins_axis(viewport.image.width * limits.scale, viewport.container.width)
    {
        0.0
    } else {
        limits.clamp_translate_x(current.translate_x)
    };
    let translate_y = if viewport
        .mode
        .pins_axis(viewport.image.height * limits.scale, viewport.container.height)
    {
        0.0
    } else {
        limits.clamp_translate_y(current.translate_y)
    };

    ViewTransform::new(limits.scale, translate_x, translate_y)
}

/// Transform a double-tap lands on.
///
/// A zoomed-in view returns to the minimum scale and zero translation;
/// otherwise the scale doubles (clamped) and the tapped point stays put.
pub fn double_tap_target(current: &ViewTransform, viewport: &Viewport<'_>, event: &TapEvent) -> ViewTransform {
    let bounds = viewport.bounds;
    if current.scale - bounds.min > SCALE_EPSILON {
        return ViewTransform::new(bounds.min, 0.0, 0.0);
    }

    let limits = compute_limits(current.scale * 2.0, viewport.container, viewport.image, bounds);
    let scale = current.scale;
    let new_scale = limits.scale;

    // Tap location in un-scaled image coordinates
    let anchor = |extent: f64, translate: f64, tap: f64| {
        ((extent / 2.0) * (scale - bounds.min) - translate * scale + tap) / scale
    };
    let image_x = anchor(viewport.image.width, current.translate_x, event.x);
    let image_y = anchor(viewport.image.height, current.translate_y, event.y);

    let anchored = |extent: f64, image_point: f64, tap: f64| {
        ((new_scale - bounds.min) / new_scale) * (extent / 2.0 - image_point)
            + (tap - image_point) / new_scale
    };
    let translate_x = anchored(viewport.image.width, image_x, event.x);
    let translate_y = anchored(viewport.image.height, image_y, event.y);

    let translate_x = if new_scale * viewport.image.width < viewport.container.width {
        0.0
    } else {
        limits.clamp_translate_x(translate_x)
    };
    let translate_y = if new_scale * viewport.image.height < viewport.container.height {
        0.0
    } else {
        limits.clamp_translate_y(translate_y)
    };

    ViewTransform::new(new_scale, translate_x, translate_y)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
