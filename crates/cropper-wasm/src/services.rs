//! Collaborators backed by JavaScript callbacks.
//!
//! Each callback may return a plain value or a Promise; both are awaited the
//! same way.

use cropper_core::{
    CropDataHandler, CropPrimitive, CropRectangle, Element, ImageSizeSource, LayoutMeasurer, Rect, Size,
    SourceError,
};
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::types::{from_js, js_message, to_js};

/// Call `f` and wait for its (possibly asynchronous) result.
async fn invoke(f: &Function, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let this = JsValue::NULL;
    let value = match args {
        [] => f.call0(&this)?,
        [a] => f.call1(&this, a)?,
        [a, b, ..] => f.call2(&this, a, b)?,
    };
    JsFuture::from(Promise::resolve(&value)).await
}

fn element_name(element: Element) -> &'static str {
    match element {
        Element::Container => "container",
        Element::Image => "image",
    }
}

/// `measure(element: "container" | "image") => Rect`
#[derive(Debug, Clone)]
pub struct JsMeasurer {
    pub(crate) measure: Function,
}

impl LayoutMeasurer for JsMeasurer {
    async fn measure(&self, element: Element) -> Rect {
        let arg = JsValue::from_str(element_name(element));
        match invoke(&self.measure, &[arg]).await.and_then(from_js) {
            Ok(rect) => rect,
            Err(err) => {
                log::warn!("measuring {} failed: {}", element_name(element), js_message(&err));
                Rect::default()
            }
        }
    }
}

/// `getSize(uri) => { width, height }`
#[derive(Debug, Clone)]
pub struct JsSizeSource {
    pub(crate) get_size: Function,
}

impl ImageSizeSource for JsSizeSource {
    async fn natural_size(&self, uri: &str) -> Result<Size, SourceError> {
        let value = invoke(&self.get_size, &[JsValue::from_str(uri)])
            .await
            .map_err(|e| SourceError::Service(js_message(&e)))?;
        from_js(value).map_err(|e| SourceError::Service(js_message(&e)))
    }
}

/// `crop(uri, { offset, size }) => uri`
#[derive(Debug, Clone)]
pub struct JsCropPrimitive {
    pub(crate) crop: Function,
}

impl CropPrimitive for JsCropPrimitive {
    async fn crop(&self, uri: &str, rect: CropRectangle) -> Result<String, String> {
        let rect = to_js(&rect).map_err(|e| js_message(&e))?;
        let value = invoke(&self.crop, &[JsValue::from_str(uri), rect])
            .await
            .map_err(|e| js_message(&e))?;
        value
            .as_string()
            .ok_or_else(|| format!("crop returned a non-string uri: {value:?}"))
    }
}

/// Optional `onCropData(rect) => rect`; without a callback the rectangle passes through.
#[derive(Debug, Clone, Default)]
pub struct JsCropDataHandler {
    pub(crate) handle: Option<Function>,
}

impl CropDataHandler for JsCropDataHandler {
    async fn handle(&self, rect: CropRectangle) -> CropRectangle {
        let Some(handle) = &self.handle else {
            return rect;
        };
        let adjusted = match to_js(&rect) {
            Ok(arg) => invoke(handle, &[arg]).await.and_then(from_js),
            Err(err) => Err(err),
        };
        adjusted.unwrap_or_else(|err| {
            log::warn!("crop data handler failed, using the computed rectangle: {}", js_message(&err));
            rect
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_names() {
        assert_eq!(element_name(Element::Container), "container");
        assert_eq!(element_name(Element::Image), "image");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn test_size_source_awaits_promise() {
        let get_size = Function::new_with_args("uri", "return Promise.resolve({ width: 40, height: 20 })");
        let source = JsSizeSource { get_size };
        let size = source.natural_size("a.jpg").await.unwrap();
        assert_eq!(size, Size::new(40.0, 20.0));
    }

    #[wasm_bindgen_test]
    async fn test_size_source_rejection_is_service_error() {
        let get_size = Function::new_with_args("uri", "return Promise.reject(new Error('404'))");
        let source = JsSizeSource { get_size };
        let err = source.natural_size("a.jpg").await.unwrap_err();
        assert_eq!(err, SourceError::Service("404".to_string()));
    }

    #[wasm_bindgen_test]
    async fn test_crop_primitive_error_verbatim() {
        let crop = Function::new_with_args("uri, rect", "throw 'E_CROP'");
        let primitive = JsCropPrimitive { crop };
        let err = primitive
            .crop("a.jpg", CropRectangle::new(0.0, 0.0, 1.0, 1.0))
            .await
            .unwrap_err();
        assert_eq!(err, "E_CROP");
    }

    #[wasm_bindgen_test]
    async fn test_missing_handler_passes_through() {
        let rect = CropRectangle::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(JsCropDataHandler::default().handle(rect).await, rect);
    }
}
