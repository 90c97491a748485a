//! Crop frame placement inside the frame-container.
//!
//! The frame-container is the part of the viewport covered by the scaled
//! image: `min(container, image * scale)` on each axis. Whenever the scale
//! settles, the frame is re-centred by half the container change, clamped
//! back inside and shrunk (keeping its aspect ratio) if it no longer fits.
//!
//! # Animated Commit
//!
//! While the frame animates, its left/top travel to the settled position
//! expressed against the *old* container (which stays centred in the
//! viewport). Only when the tween completes are the new container size and
//! the settled left/top committed, so concurrent readers never see a frame
//! positioned against a container that has not been committed yet.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::animation::{AnimatedValue, AnimationConfig, Easing, Finished, Generation, Token};
use crate::cell::SharedValue;
use crate::error::ConfigError;
use crate::geometry::{FrameRect, Point, Size};
use crate::layout::Rect;

/// Resize behaviour of a frame handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointType {
    /// Edges follow the pointer independently.
    #[default]
    Scale,
    /// The aspect ratio captured at drag start is kept.
    ScaleLock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointConfig {
    #[serde(rename = "type")]
    pub kind: PointType,
}

/// One of the eight resize handles around the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl FrameHandle {
    /// Which edges the handle drags: -1 = left/top, 1 = right/bottom, 0 = none.
    fn directions(self) -> (i8, i8) {
        match self {
            FrameHandle::TopLeft => (-1, -1),
            FrameHandle::Top => (0, -1),
            FrameHandle::TopRight => (1, -1),
            FrameHandle::Right => (1, 0),
            FrameHandle::BottomRight => (1, 1),
            FrameHandle::Bottom => (0, 1),
            FrameHandle::BottomLeft => (-1, 1),
            FrameHandle::Left => (-1, 0),
        }
    }
}

/// Per-handle behaviour; a missing entry means [`PointType::Scale`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FramePoints {
    pub top_left: Option<PointConfig>,
    pub top: Option<PointConfig>,
    pub top_right: Option<PointConfig>,
    pub right: Option<PointConfig>,
    pub bottom_right: Option<PointConfig>,
    pub bottom: Option<PointConfig>,
    pub bottom_left: Option<PointConfig>,
    pub left: Option<PointConfig>,
}

impl FramePoints {
    pub fn point_type(&self, handle: FrameHandle) -> PointType {
        let config = match handle {
            FrameHandle::TopLeft => self.top_left,
            FrameHandle::Top => self.top,
            FrameHandle::TopRight => self.top_right,
            FrameHandle::Right => self.right,
            FrameHandle::BottomRight => self.bottom_right,
            FrameHandle::Bottom => self.bottom,
            FrameHandle::BottomLeft => self.bottom_left,
            FrameHandle::Left => self.left,
        };
        config.map(|c| c.kind).unwrap_or_default()
    }
}

/// Evenly spaced guide lines drawn inside the frame or viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLines {
    /// Number of vertical lines (spread along the x axis).
    pub x: u32,
    /// Number of horizontal lines (spread along the y axis).
    pub y: u32,
}

impl GridLines {
    /// X offsets of the vertical lines for a box `width` wide.
    pub fn vertical_offsets(&self, width: f64) -> Vec<f64> {
        spread(self.x, width)
    }

    /// Y offsets of the horizontal lines for a box `height` tall.
    pub fn horizontal_offsets(&self, height: f64) -> Vec<f64> {
        spread(self.y, height)
    }
}

fn spread(count: u32, extent: f64) -> Vec<f64> {
    let slots = f64::from(count + 1);
    (1..=count).map(|i| extent * f64::from(i) / slots).collect()
}

/// Crop frame options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameConfig {
    pub lines: Option<GridLines>,
    pub points: FramePoints,
    pub min_width: f64,
    pub min_height: f64,
}

impl FrameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_width < 0.0 || self.min_height < 0.0 || self.min_width.is_nan() || self.min_height.is_nan() {
            return Err(ConfigError::FrameMinimum {
                width: self.min_width,
                height: self.min_height,
            });
        }
        Ok(())
    }

    fn min_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }
}

/// Result of re-fitting the frame to a new frame-container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReconcile {
    /// Where the frame travels while the old container is still committed.
    pub transit: FrameRect,
    /// Frame relative to the new container, committed after the animation.
    pub settled: FrameRect,
    /// New frame-container size.
    pub container: Size,
}

/// Re-centre and shrink `frame` for a container change from `old` to `new`.
pub fn reconcile_frame(frame: &FrameRect, old: Size, new: Size) -> FrameReconcile {
    let left = (frame.left + (new.width - old.width) / 2.0)
        .min(new.width - frame.width)
        .max(0.0);
    let top = (frame.top + (new.height - old.height) / 2.0)
        .min(new.height - frame.height)
        .max(0.0);

    let limit_width = new.width.min(frame.width);
    let limit_height = new.height.min(frame.height);
    let ratio = frame.aspect_ratio();

    let width = limit_width.min(limit_height * ratio);
    let height = limit_height.min(limit_width / ratio);

    let settled = FrameRect::new(left, top, width, height);
    let transit = FrameRect::new(
        left + (old.width - new.width) / 2.0,
        top + (old.height - new.height) / 2.0,
        width,
        height,
    );

    FrameReconcile {
        transit,
        settled,
        container: new,
    }
}

/// Frame-container size for a scaled image inside the viewport.
pub fn frame_container_for(scale: f64, container: &Rect, image: &Rect) -> Size {
    Size::new(
        container.width.min(image.width * scale),
        container.height.min(image.height * scale),
    )
}

/// Move one axis edge: returns the new (start, extent).
fn resize_axis(start: f64, extent: f64, direction: i8, delta: f64, min: f64, bound: f64) -> (f64, f64) {
    match direction {
        -1 => {
            let end = start + extent;
            let new_start = (start + delta).clamp(0.0, (end - min).max(0.0));
            (new_start, end - new_start)
        }
        1 => {
            let new_end = (start + extent + delta).clamp((start + min).min(bound), bound);
            (start, new_end - start)
        }
        _ => (start, extent),
    }
}

/// Apply a handle drag of `(dx, dy)` to the frame it started from.
pub fn resize_frame(
    start: &FrameRect,
    handle: FrameHandle,
    kind: PointType,
    dx: f64,
    dy: f64,
    container: Size,
    min: Size,
) -> FrameRect {
    let (hx, hy) = handle.directions();

    match kind {
        PointType::Scale => {
            let (left, width) = resize_axis(start.left, start.width, hx, dx, min.width, container.width);
            let (top, height) = resize_axis(start.top, start.height, hy, dy, min.height, container.height);
            FrameRect::new(left, top, width, height)
        }
        PointType::ScaleLock => {
            let ratio = start.aspect_ratio();
            let proposed_width = start.width + f64::from(hx) * dx;
            let proposed_height = start.height + f64::from(hy) * dy;

            let wanted = if hx == 0 {
                proposed_height * ratio
            } else if hy == 0 || proposed_width / ratio >= proposed_height {
                proposed_width
            } else {
                proposed_height * ratio
            };

            let max_width = match hx {
                -1 => start.right(),
                1 => container.width - start.left,
                _ => container.width,
            };
            let max_height = match hy {
                -1 => start.bottom(),
                1 => container.height - start.top,
                _ => container.height,
            };
            let upper = max_width.min(max_height * ratio).max(0.0);
            let lower = min.width.max(min.height * ratio).min(upper);

            let width = wanted.clamp(lower, upper);
            let height = width / ratio;

            let centred = |origin: f64, extent: f64, new_extent: f64, bound: f64| {
                (origin + extent / 2.0 - new_extent / 2.0).clamp(0.0, (bound - new_extent).max(0.0))
            };
            let left = match hx {
                -1 => start.right() - width,
                1 => start.left,
                _ => centred(start.left, start.width, width, container.width),
            };
            let top = match hy {
                -1 => start.bottom() - height,
                1 => start.top,
                _ => centred(start.top, start.height, height, container.height),
            };
            FrameRect::new(left, top, width, height)
        }
    }
}

/// Move `start` by `(dx, dy)` without leaving the container.
pub fn move_frame(start: &FrameRect, dx: f64, dy: f64, container: Size) -> FrameRect {
    FrameRect::new(
        (start.left + dx).clamp(0.0, (container.width - start.width).max(0.0)),
        (start.top + dy).clamp(0.0, (container.height - start.height).max(0.0)),
        start.width,
        start.height,
    )
}

/// Completion payloads of frame animations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameCompletion {
    CommitHorizontal {
        token: Token,
        container_width: f64,
        left: f64,
    },
    CommitVertical {
        token: Token,
        container_height: f64,
        top: f64,
    },
}

/// What a frame edit session is doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEdit {
    Move,
    Resize(FrameHandle),
}

/// Frame captured when a drag or resize starts.
///
/// A reconcile landing mid-edit moves `start` to the reconciled frame and
/// `origin` to the pointer translation seen at that moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDragSession {
    pub edit: FrameEdit,
    pub start: FrameRect,
    pub origin: Point,
    last: Point,
}

/// Owner of the crop frame.
#[derive(Debug)]
pub struct FrameReconciler {
    config: FrameConfig,
    left: AnimatedValue<FrameCompletion>,
    top: AnimatedValue<FrameCompletion>,
    width: AnimatedValue<FrameCompletion>,
    height: AnimatedValue<FrameCompletion>,
    container: Size,
    initialized: bool,
    generation: Generation,
    animation: AnimationConfig,
    session: Option<FrameDragSession>,
    completions: VecDeque<Finished<FrameCompletion>>,
    published: SharedValue<Option<FrameRect>>,
}

impl FrameReconciler {
    pub fn new(config: FrameConfig, animation: AnimationConfig) -> Self {
        Self {
            config,
            left: AnimatedValue::new(0.0),
            top: AnimatedValue::new(0.0),
            width: AnimatedValue::new(0.0),
            height: AnimatedValue::new(0.0),
            container: Size::default(),
            initialized: false,
            generation: Generation::new(),
            animation,
            session: None,
            completions: VecDeque::new(),
            published: SharedValue::new(None),
        }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Current frame, `None` before the first reset.
    pub fn rect(&self) -> Option<FrameRect> {
        self.initialized.then(|| {
            FrameRect::new(
                self.left.value(),
                self.top.value(),
                self.width.value(),
                self.height.value(),
            )
        })
    }

    /// Committed frame-container size.
    pub fn container_size(&self) -> Size {
        self.container
    }

    pub fn shared_rect(&self) -> SharedValue<Option<FrameRect>> {
        self.published.clone()
    }

    pub fn is_animating(&self) -> bool {
        self.left.is_animating()
            || self.top.is_animating()
            || self.width.is_animating()
            || self.height.is_animating()
    }

    pub fn session(&self) -> Option<&FrameDragSession> {
        self.session.as_ref()
    }

    /// Fill a freshly sized frame-container.
    pub fn reset(&mut self, container: Size) {
        self.generation.bump();
        self.container = container;
        self.initialized = true;
        self.session = None;
        self.write(FrameRect::new(0.0, 0.0, container.width, container.height));
    }

    /// Place the frame directly, clamped into the committed container.
    pub fn set_rect(&mut self, rect: FrameRect) -> bool {
        if !self.initialized {
            return false;
        }
        self.flush();
        self.generation.bump();
        let width = rect.width.clamp(0.0, self.container.width.max(0.0));
        let height = rect.height.clamp(0.0, self.container.height.max(0.0));
        let placed = move_frame(&FrameRect::new(rect.left, rect.top, width, height), 0.0, 0.0, self.container);
        self.write(placed);
        true
    }

    /// Re-fit the frame after the image footprint changed to `scale`.
    pub fn reconcile(&mut self, scale: f64, container: &Rect, image: &Rect) -> Option<FrameReconcile> {
        let current = self.rect()?;

        let old = if self.container.is_empty() {
            image.size()
        } else {
            self.container
        };
        let new = frame_container_for(scale, container, image);
        let result = reconcile_frame(&current, old, new);

        let token = self.generation.bump();
        let timing = Easing::Timing(self.animation.timing);
        let superseded = [
            self.width.animate_to(result.settled.width, timing, None),
            self.height.animate_to(result.settled.height, timing, None),
            self.top.animate_to(
                result.transit.top,
                timing,
                Some(FrameCompletion::CommitVertical {
                    token,
                    container_height: new.height,
                    top: result.settled.top,
                }),
            ),
            self.left.animate_to(
                result.transit.left,
                timing,
                Some(FrameCompletion::CommitHorizontal {
                    token,
                    container_width: new.width,
                    left: result.settled.left,
                }),
            ),
        ];
        self.completions.extend(superseded.into_iter().flatten());
        self.publish();
        Some(result)
    }

    /// Start moving or resizing the frame.
    pub fn begin_edit(&mut self, edit: FrameEdit) -> bool {
        if !self.initialized {
            return false;
        }
        self.flush();
        let Some(start) = self.rect() else {
            return false;
        };
        self.generation.bump();
        self.session = Some(FrameDragSession {
            edit,
            start,
            origin: Point::default(),
            last: Point::default(),
        });
        true
    }

    /// Apply the accumulated pointer translation of the running edit.
    pub fn update_edit(&mut self, dx: f64, dy: f64) -> Option<FrameRect> {
        self.session.as_ref()?;
        if self.is_animating() {
            self.flush();
            self.rebase_session();
        }
        let session = self.session.as_mut()?;
        session.last = Point::new(dx, dy);
        let session = *session;
        let (dx, dy) = (dx - session.origin.x, dy - session.origin.y);

        let rect = match session.edit {
            FrameEdit::Move => move_frame(&session.start, dx, dy, self.container),
            FrameEdit::Resize(handle) => resize_frame(
                &session.start,
                handle,
                self.config.points.point_type(handle),
                dx,
                dy,
                self.container,
                self.config.min_size(),
            ),
        };
        self.write(rect);
        Some(rect)
    }

    pub fn end_edit(&mut self) -> Option<FrameRect> {
        self.session.take()?;
        self.rect()
    }

    pub fn advance(&mut self, dt_ms: f64) {
        let finished = [
            self.width.advance(dt_ms),
            self.height.advance(dt_ms),
            self.top.advance(dt_ms),
            self.left.advance(dt_ms),
        ];
        self.completions.extend(finished.into_iter().flatten());
        self.publish();
    }

    /// Completions waiting to be dispatched, oldest first.
    pub fn take_completions(&mut self) -> impl Iterator<Item = Finished<FrameCompletion>> + '_ {
        self.completions.drain(..)
    }

    /// Handle a dispatched completion; returns true if it committed.
    pub fn complete(&mut self, finished: Finished<FrameCompletion>) -> bool {
        if finished.interrupted {
            log::trace!("discarding interrupted frame commit");
            return false;
        }
        match finished.payload {
            FrameCompletion::CommitHorizontal {
                token,
                container_width,
                left,
            } => {
                if !self.generation.is_current(token) {
                    log::trace!("discarding stale horizontal frame commit");
                    return false;
                }
                self.container.width = container_width;
                let width = self.width.value().min(container_width.max(0.0));
                self.width.set(width);
                self.left.set(left.clamp(0.0, (container_width - width).max(0.0)));
            }
            FrameCompletion::CommitVertical {
                token,
                container_height,
                top,
            } => {
                if !self.generation.is_current(token) {
                    log::trace!("discarding stale vertical frame commit");
                    return false;
                }
                self.container.height = container_height;
                let height = self.height.value().min(container_height.max(0.0));
                self.height.set(height);
                self.top.set(top.clamp(0.0, (container_height - height).max(0.0)));
            }
        }
        self.publish();
        true
    }

    /// Run a pending reconcile to completion and commit it.
    fn flush(&mut self) {
        if !self.is_animating() {
            return;
        }
        self.advance(f64::MAX);
        let pending: Vec<_> = self.completions.drain(..).collect();
        for finished in pending {
            self.complete(finished);
        }
    }

    /// Continue the open edit from the current frame.
    fn rebase_session(&mut self) {
        let Some(rect) = self.rect() else {
            return;
        };
        if let Some(session) = self.session.as_mut() {
            session.start = rect;
            session.origin = session.last;
        }
    }

    fn write(&mut self, rect: FrameRect) {
        let superseded = [
            self.left.set(rect.left),
            self.top.set(rect.top),
            self.width.set(rect.width),
            self.height.set(rect.height),
        ];
        self.completions.extend(superseded.into_iter().flatten());
        self.publish();
    }

    fn publish(&self) {
        self.published.set(self.rect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn run(reconciler: &mut FrameReconciler) {
        for _ in 0..1000 {
            reconciler.advance(16.0);
            let done: Vec<_> = reconciler.take_completions().collect();
            for finished in done {
                reconciler.complete(finished);
            }
            if !reconciler.is_animating() {
                return;
            }
        }
        panic!("frame animation did not settle");
    }

    #[test]
    fn test_reconcile_same_container_is_identity() {
        let frame = FrameRect::new(100.0, 50.0, 200.0, 100.0);
        let size = Size::new(500.0, 250.0);
        let result = reconcile_frame(&frame, size, size);
        assert_eq!(result.settled, frame);
        assert_eq!(result.transit, frame);
    }

    #[test]
    fn test_reconcile_growing_container_recentres() {
        let frame = FrameRect::new(0.0, 0.0, 100.0, 100.0);
        let result = reconcile_frame(&frame, Size::new(200.0, 200.0), Size::new(400.0, 400.0));
        assert_eq!(result.settled, FrameRect::new(100.0, 100.0, 100.0, 100.0));
        // Against the old container the frame sits at its old place
        assert_eq!(result.transit.left, 0.0);
        assert_eq!(result.transit.top, 0.0);
    }

    #[test]
    fn test_reconcile_shrinking_keeps_ratio() {
        let frame = FrameRect::new(0.0, 0.0, 400.0, 200.0);
        let result = reconcile_frame(&frame, Size::new(400.0, 400.0), Size::new(200.0, 400.0));
        let settled = result.settled;
        assert_eq!(settled.width, 200.0);
        assert_eq!(settled.height, 100.0);
        assert!(settled.is_within(result.container, EPS));
    }

    #[test]
    fn test_reconcile_degenerate_frame_is_contained() {
        let frame = FrameRect::new(50.0, 50.0, 300.0, 0.0);
        let result = reconcile_frame(&frame, Size::new(400.0, 400.0), Size::new(100.0, 100.0));
        assert!(result.settled.is_within(result.container, EPS));
    }

    #[test]
    fn test_reconcile_noop_before_reset() {
        let mut reconciler = FrameReconciler::new(FrameConfig::default(), AnimationConfig::default());
        let rect = Rect::new(0.0, 0.0, 400.0, 400.0);
        assert!(reconciler.reconcile(2.0, &rect, &rect).is_none());
        assert!(reconciler.rect().is_none());
    }

    #[test]
    fn test_commit_after_animation() {
        let mut reconciler = FrameReconciler::new(FrameConfig::default(), AnimationConfig::default());
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let image = Rect::new(0.0, 100.0, 400.0, 200.0);
        reconciler.reset(Size::new(400.0, 200.0));
        reconciler.set_rect(FrameRect::new(100.0, 50.0, 200.0, 100.0));

        let result = reconciler.reconcile(2.0, &container, &image).unwrap();
        assert_eq!(result.container, Size::new(400.0, 400.0));
        // Not committed while animating
        assert_eq!(reconciler.container_size(), Size::new(400.0, 200.0));

        run(&mut reconciler);
        assert_eq!(reconciler.container_size(), Size::new(400.0, 400.0));
        assert_eq!(reconciler.rect().unwrap(), result.settled);
        assert_eq!(result.settled, FrameRect::new(100.0, 150.0, 200.0, 100.0));
    }

    #[test]
    fn test_superseded_commit_discarded() {
        let mut reconciler = FrameReconciler::new(FrameConfig::default(), AnimationConfig::default());
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let image = Rect::new(0.0, 100.0, 400.0, 200.0);
        reconciler.reset(Size::new(400.0, 200.0));

        reconciler.reconcile(2.0, &container, &image);
        reconciler.advance(50.0);
        let second = reconciler.reconcile(1.0, &container, &image).unwrap();

        run(&mut reconciler);
        // Only the latest reconcile committed
        assert_eq!(reconciler.container_size(), second.container);
        assert_eq!(reconciler.container_size(), Size::new(400.0, 200.0));
        assert!(reconciler.rect().unwrap().is_within(reconciler.container_size(), EPS));
    }

    #[test]
    fn test_shared_rect_published() {
        let mut reconciler = FrameReconciler::new(FrameConfig::default(), AnimationConfig::default());
        let shared = reconciler.shared_rect();
        assert!(shared.get().is_none());
        reconciler.reset(Size::new(300.0, 200.0));
        assert_eq!(shared.get(), Some(FrameRect::new(0.0, 0.0, 300.0, 200.0)));
    }

    #[test]
    fn test_move_stays_inside() {
        let start = FrameRect::new(50.0, 50.0, 100.0, 100.0);
        let moved = move_frame(&start, 500.0, -500.0, Size::new(300.0, 300.0));
        assert_eq!(moved, FrameRect::new(200.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_free_resize_bottom_right() {
        let start = FrameRect::new(50.0, 50.0, 100.0, 100.0);
        let rect = resize_frame(
            &start,
            FrameHandle::BottomRight,
            PointType::Scale,
            30.0,
            -20.0,
            Size::new(300.0, 300.0),
            Size::default(),
        );
        assert_eq!(rect, FrameRect::new(50.0, 50.0, 130.0, 80.0));
    }

    #[test]
    fn test_free_resize_respects_minimum() {
        let start = FrameRect::new(50.0, 50.0, 100.0, 100.0);
        let rect = resize_frame(
            &start,
            FrameHandle::Left,
            PointType::Scale,
            90.0,
            0.0,
            Size::new(300.0, 300.0),
            Size::new(40.0, 40.0),
        );
        assert_eq!(rect, FrameRect::new(110.0, 50.0, 40.0, 100.0));
    }

    #[test]
    fn test_locked_resize_keeps_ratio() {
        let start = FrameRect::new(0.0, 0.0, 200.0, 100.0);
        let rect = resize_frame(
            &start,
            FrameHandle::BottomRight,
            PointType::ScaleLock,
            100.0,
            10.0,
            Size::new(500.0, 500.0),
            Size::default(),
        );
        assert_eq!(rect, FrameRect::new(0.0, 0.0, 300.0, 150.0));
    }

    #[test]
    fn test_locked_resize_top_left_anchors_opposite_corner() {
        let start = FrameRect::new(100.0, 100.0, 200.0, 100.0);
        let rect = resize_frame(
            &start,
            FrameHandle::TopLeft,
            PointType::ScaleLock,
            -500.0,
            0.0,
            Size::new(500.0, 500.0),
            Size::default(),
        );
        // Width limited by the left edge (300) and top edge (200 * 2 = 400)
        assert_eq!(rect.right(), 300.0);
        assert_eq!(rect.bottom(), 200.0);
        assert_eq!(rect.width, 300.0);
        assert_eq!(rect.height, 150.0);
    }

    #[test]
    fn test_point_type_lookup() {
        let points = FramePoints {
            top_left: Some(PointConfig { kind: PointType::ScaleLock }),
            ..FramePoints::default()
        };
        assert_eq!(points.point_type(FrameHandle::TopLeft), PointType::ScaleLock);
        assert_eq!(points.point_type(FrameHandle::Bottom), PointType::Scale);
    }

    #[test]
    fn test_edit_session() {
        let mut reconciler = FrameReconciler::new(FrameConfig::default(), AnimationConfig::default());
        reconciler.reset(Size::new(300.0, 300.0));
        reconciler.set_rect(FrameRect::new(0.0, 0.0, 100.0, 100.0));

        assert!(reconciler.begin_edit(FrameEdit::Move));
        reconciler.update_edit(20.0, 10.0);
        reconciler.update_edit(40.0, 30.0);
        let rect = reconciler.end_edit().unwrap();
        assert_eq!(rect, FrameRect::new(40.0, 30.0, 100.0, 100.0));
        assert!(reconciler.session().is_none());
    }

    #[test]
    fn test_reconcile_during_edit_rebases_session() {
        let mut reconciler = FrameReconciler::new(FrameConfig::default(), AnimationConfig::default());
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let image = Rect::new(0.0, 100.0, 400.0, 200.0);
        reconciler.reset(Size::new(400.0, 200.0));
        reconciler.set_rect(FrameRect::new(0.0, 0.0, 200.0, 100.0));

        assert!(reconciler.begin_edit(FrameEdit::Move));
        reconciler.update_edit(50.0, 0.0);
        reconciler.reconcile(2.0, &container, &image);

        // The reconcile lands before the edit continues from the new frame
        let rect = reconciler.update_edit(80.0, 0.0).unwrap();
        assert_eq!(reconciler.container_size(), Size::new(400.0, 400.0));
        assert_eq!(rect, FrameRect::new(80.0, 100.0, 200.0, 100.0));
        assert!(!reconciler.is_animating());
    }

    #[test]
    fn test_interrupted_commit_discarded() {
        let mut reconciler = FrameReconciler::new(FrameConfig::default(), AnimationConfig::default());
        let container = Rect::new(0.0, 0.0, 400.0, 400.0);
        let image = Rect::new(0.0, 100.0, 400.0, 200.0);
        reconciler.reset(Size::new(400.0, 200.0));
        reconciler.reconcile(2.0, &container, &image);

        // A direct write supersedes the commit without a new generation
        let finished = reconciler.left.set(0.0).unwrap();
        assert!(finished.interrupted);
        assert!(!reconciler.complete(finished));
        assert_eq!(reconciler.container_size(), Size::new(400.0, 200.0));
    }

    #[test]
    fn test_grid_offsets() {
        let lines = GridLines { x: 2, y: 0 };
        assert_eq!(lines.vertical_offsets(300.0), vec![100.0, 200.0]);
        assert!(lines.horizontal_offsets(300.0).is_empty());
    }

    #[test]
    fn test_config_validation() {
        let mut config = FrameConfig::default();
        assert!(config.validate().is_ok());
        config.min_width = -1.0;
        assert!(config.validate().is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
