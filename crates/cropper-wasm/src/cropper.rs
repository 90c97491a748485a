//! `JsImageCropper`: the cropper component exposed to JavaScript.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const cropper = new JsImageCropper(
//!   { uri, mode: 'cover', frame: { lines: { x: 2, y: 2 } } },
//!   (element) => measure(element),        // 'container' | 'image' => Rect
//!   (uri) => Image.getSize(uri),          // => Promise<{ width, height }>
//!   (uri, rect) => NativeCrop.crop(uri, rect),
//! );
//! cropper.onChangeState((change) => render(change.state));
//! cropper.onContainerLayout(containerRect);
//! cropper.onImageLayout(imageRect);
//!
//! let last = performance.now();
//! requestAnimationFrame(function tick(now) {
//!   cropper.advance(now - last);
//!   last = now;
//!   requestAnimationFrame(tick);
//! });
//!
//! const result = await cropper.cropImage(); // { uri } | { error }
//! ```
//!
//! State changes are collected while the cropper is borrowed and delivered to
//! the listener afterwards, so a listener may call back into the cropper.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use cropper_core::{
    CropProjector, CropperConfig, FrameEdit, FrameHandle, GestureState, ImageCropper, PanEvent, PinchEvent,
    Rect, SourceRequest, StateChange, TapEvent,
};
use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::services::{JsCropDataHandler, JsCropPrimitive, JsMeasurer, JsSizeSource};
use crate::types::{from_js, js_message, to_js, CropOutcome, FrameLines};

#[derive(Debug, Clone)]
struct Services {
    measurer: JsMeasurer,
    sizes: JsSizeSource,
    primitive: JsCropPrimitive,
    handler: JsCropDataHandler,
}

type ChangeQueue = Rc<RefCell<VecDeque<StateChange>>>;

/// Shared between the binding object and its spawned fetches.
struct Shared {
    cropper: RefCell<ImageCropper>,
    changes: ChangeQueue,
    listener: RefCell<Option<Function>>,
}

impl Shared {
    fn with<R>(&self, f: impl FnOnce(&mut ImageCropper) -> R) -> R {
        let result = f(&mut self.cropper.borrow_mut());
        self.deliver();
        result
    }

    /// Hand queued changes to the JavaScript listener.
    fn deliver(&self) {
        loop {
            let Some(change) = self.changes.borrow_mut().pop_front() else {
                return;
            };
            let Some(listener) = self.listener.borrow().clone() else {
                continue;
            };
            match to_js(&change) {
                Ok(value) => {
                    if let Err(err) = listener.call1(&JsValue::NULL, &value) {
                        log::error!("state change listener threw: {}", js_message(&err));
                    }
                }
                Err(err) => log::error!("could not serialize state change: {}", js_message(&err)),
            }
        }
    }
}

/// Look up the natural size for `request` and feed it back.
fn fetch(shared: &Rc<Shared>, sizes: &JsSizeSource, request: SourceRequest) {
    use cropper_core::ImageSizeSource;

    let shared = Rc::clone(shared);
    let sizes = sizes.clone();
    spawn_local(async move {
        let result = sizes.natural_size(&request.uri).await;
        shared.with(|cropper| cropper.on_source_resolved(&request, result));
    });
}

#[wasm_bindgen]
pub struct JsImageCropper {
    shared: Rc<Shared>,
    services: Services,
}

#[wasm_bindgen]
impl JsImageCropper {
    /// Create a cropper from a configuration object and the host callbacks.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        measure: Function,
        get_size: Function,
        crop: Function,
    ) -> Result<JsImageCropper, JsValue> {
        let config: CropperConfig = from_js(config)?;
        let mut cropper = ImageCropper::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let changes: ChangeQueue = Rc::default();
        let sink = Rc::clone(&changes);
        cropper.on_change_state(move |change| sink.borrow_mut().push_back(change.clone()));
        let initial = cropper.take_source_request();

        let this = JsImageCropper {
            shared: Rc::new(Shared {
                cropper: RefCell::new(cropper),
                changes,
                listener: RefCell::new(None),
            }),
            services: Services {
                measurer: JsMeasurer { measure },
                sizes: JsSizeSource { get_size },
                primitive: JsCropPrimitive { crop },
                handler: JsCropDataHandler::default(),
            },
        };
        if let Some(request) = initial {
            fetch(&this.shared, &this.services.sizes, request);
        }
        Ok(this)
    }

    #[wasm_bindgen(js_name = onChangeState)]
    pub fn on_change_state(&self, listener: Function) {
        *self.shared.listener.borrow_mut() = Some(listener);
        self.shared.deliver();
    }

    #[wasm_bindgen(js_name = setCropDataHandler)]
    pub fn set_crop_data_handler(&mut self, handler: Option<Function>) {
        self.services.handler = JsCropDataHandler { handle: handler };
    }

    #[wasm_bindgen(js_name = setUri)]
    pub fn set_uri(&self, uri: String) {
        if let Some(request) = self.shared.with(|cropper| cropper.set_uri(uri)) {
            fetch(&self.shared, &self.services.sizes, request);
        }
    }

    #[wasm_bindgen(js_name = onContainerLayout)]
    pub fn on_container_layout(&self, rect: JsValue) -> Result<(), JsValue> {
        let rect: Rect = from_js(rect)?;
        self.shared.with(|cropper| cropper.on_container_layout(rect));
        Ok(())
    }

    #[wasm_bindgen(js_name = onImageLayout)]
    pub fn on_image_layout(&self, rect: JsValue) -> Result<(), JsValue> {
        let rect: Rect = from_js(rect)?;
        self.shared.with(|cropper| cropper.on_image_layout(rect));
        Ok(())
    }

    #[wasm_bindgen(js_name = onImageLoad)]
    pub fn on_image_load(&self) {
        self.shared.with(ImageCropper::on_image_load);
    }

    #[wasm_bindgen(js_name = onImageError)]
    pub fn on_image_error(&self, message: String) {
        self.shared.with(|cropper| cropper.on_image_error(message));
    }

    /// `state`: "undetermined" | "began" | "active" | "end" | "failed" | "cancelled"
    #[wasm_bindgen(js_name = onPinchState)]
    pub fn on_pinch_state(&self, state: JsValue) -> Result<(), JsValue> {
        let state: GestureState = from_js(state)?;
        self.shared.with(|cropper| cropper.on_pinch_state(state));
        Ok(())
    }

    #[wasm_bindgen(js_name = onPinchEvent)]
    pub fn on_pinch_event(&self, event: JsValue) -> Result<(), JsValue> {
        let event: PinchEvent = from_js(event)?;
        self.shared.with(|cropper| cropper.on_pinch_event(&event));
        Ok(())
    }

    #[wasm_bindgen(js_name = onPanState)]
    pub fn on_pan_state(&self, state: JsValue) -> Result<(), JsValue> {
        let state: GestureState = from_js(state)?;
        self.shared.with(|cropper| cropper.on_pan_state(state));
        Ok(())
    }

    #[wasm_bindgen(js_name = onPanEvent)]
    pub fn on_pan_event(&self, event: JsValue) -> Result<(), JsValue> {
        let event: PanEvent = from_js(event)?;
        self.shared.with(|cropper| cropper.on_pan_event(&event));
        Ok(())
    }

    #[wasm_bindgen(js_name = onDoubleTap)]
    pub fn on_double_tap(&self, event: JsValue) -> Result<(), JsValue> {
        let event: TapEvent = from_js(event)?;
        self.shared.with(|cropper| cropper.on_double_tap(&event));
        Ok(())
    }

    #[wasm_bindgen(js_name = beginFrameMove)]
    pub fn begin_frame_move(&self) -> bool {
        self.shared.with(|cropper| cropper.begin_frame_edit(FrameEdit::Move))
    }

    /// `handle`: "top-left" | "top" | ... | "left"
    #[wasm_bindgen(js_name = beginFrameResize)]
    pub fn begin_frame_resize(&self, handle: JsValue) -> Result<bool, JsValue> {
        let handle: FrameHandle = from_js(handle)?;
        Ok(self
            .shared
            .with(|cropper| cropper.begin_frame_edit(FrameEdit::Resize(handle))))
    }

    /// Apply the accumulated translation of the running frame edit.
    #[wasm_bindgen(js_name = updateFrameEdit)]
    pub fn update_frame_edit(&self, dx: f64, dy: f64) -> Result<JsValue, JsValue> {
        let rect = self.shared.with(|cropper| cropper.update_frame_edit(dx, dy));
        to_js(&rect)
    }

    #[wasm_bindgen(js_name = endFrameEdit)]
    pub fn end_frame_edit(&self) -> Result<JsValue, JsValue> {
        let rect = self.shared.with(ImageCropper::end_frame_edit);
        to_js(&rect)
    }

    /// Step animations by `dt_ms` milliseconds.
    pub fn advance(&self, dt_ms: f64) {
        self.shared.with(|cropper| cropper.advance(dt_ms));
    }

    #[wasm_bindgen(js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.shared.cropper.borrow().is_animating()
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.shared.cropper.borrow().is_ready()
    }

    pub fn transform(&self) -> Result<JsValue, JsValue> {
        to_js(&self.shared.cropper.borrow().transform())
    }

    #[wasm_bindgen(js_name = imageStyle)]
    pub fn image_style(&self) -> Result<JsValue, JsValue> {
        to_js(&self.shared.cropper.borrow().image_style())
    }

    #[wasm_bindgen(js_name = frameRect)]
    pub fn frame_rect(&self) -> Result<JsValue, JsValue> {
        to_js(&self.shared.cropper.borrow().frame_rect())
    }

    #[wasm_bindgen(js_name = frameContainerSize)]
    pub fn frame_container_size(&self) -> Result<JsValue, JsValue> {
        to_js(&self.shared.cropper.borrow().frame_container_size())
    }

    #[wasm_bindgen(js_name = frameLines)]
    pub fn frame_lines(&self) -> Result<JsValue, JsValue> {
        let lines = self
            .shared
            .cropper
            .borrow()
            .frame_lines()
            .map(|(x, y)| FrameLines { x, y });
        to_js(&lines)
    }

    pub fn statements(&self) -> Result<JsValue, JsValue> {
        to_js(self.shared.cropper.borrow().statements())
    }

    /// Crop to the current view; resolves to `{ uri }` or `{ error }`.
    #[wasm_bindgen(js_name = cropImage)]
    pub fn crop_image(&self) -> js_sys::Promise {
        let state = self.shared.cropper.borrow().crop_state();
        let services = self.services.clone();
        future_to_promise(async move {
            let projector = CropProjector::new(state, services.measurer, services.sizes, services.primitive)
                .with_handler(services.handler);
            let outcome = CropOutcome::from(projector.crop_image().await);
            if let CropOutcome::Failed { error } = &outcome {
                log::warn!("crop failed: {}", error);
            }
            to_js(&outcome)
        })
    }
}
