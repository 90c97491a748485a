//! Conversions between JavaScript values and core types.
//!
//! Structured values cross the boundary through `serde-wasm-bindgen`, so the
//! JavaScript side sees the same camelCase field names as the core's serde
//! representation.

use cropper_core::{CropError, CroppedImage};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Deserialize a JavaScript value, reporting failures as a JS error string.
pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Serialize for JavaScript; maps serialize as plain objects.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Best-effort human readable message of a thrown/rejected value.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

/// Value a `cropImage()` promise resolves to: `{ uri }` or `{ error }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub(crate) enum CropOutcome {
    Cropped { uri: String },
    Failed { error: String },
}

impl From<Result<CroppedImage, CropError>> for CropOutcome {
    fn from(result: Result<CroppedImage, CropError>) -> Self {
        match result {
            Ok(image) => CropOutcome::Cropped { uri: image.uri },
            Err(err) => CropOutcome::Failed {
                error: err.to_string(),
            },
        }
    }
}

/// Grid line offsets inside the frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct FrameLines {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use cropper_core::{Rect, StateChange, StatementsPatch};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_rect_round_trip_uses_camel_case() {
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0).at_page(5.0, 6.0);
        let value = to_js(&rect).unwrap();
        let page_x = js_sys::Reflect::get(&value, &JsValue::from_str("pageX")).unwrap();
        assert_eq!(page_x.as_f64(), Some(5.0));
        let back: Rect = from_js(value).unwrap();
        assert_eq!(back, rect);
    }

    #[wasm_bindgen_test]
    fn test_state_change_flattens_patch() {
        let change = StateChange {
            changed: StatementsPatch::zooming(true),
            state: Default::default(),
        };
        let value = to_js(&change).unwrap();
        let zooming = js_sys::Reflect::get(&value, &JsValue::from_str("isZooming")).unwrap();
        assert_eq!(zooming.as_bool(), Some(true));
        let dragging = js_sys::Reflect::get(&value, &JsValue::from_str("isDragging")).unwrap();
        assert!(dragging.is_undefined());
    }

    #[wasm_bindgen_test]
    fn test_js_message_from_error() {
        let error = js_sys::Error::new("boom");
        assert_eq!(js_message(&error.into()), "boom");
        assert_eq!(js_message(&JsValue::from_str("plain")), "plain");
    }
}
