//! Cropper WASM - WebAssembly bindings for the image cropper engine
//!
//! This crate exposes `cropper-core` to JavaScript/TypeScript hosts. The host
//! renders the image and frame, recognizes gestures and performs the native
//! crop; the engine keeps the view transform, frame and status in sync.
//!
//! # Module Structure
//!
//! - `cropper` - `JsImageCropper`, the component object
//! - `services` - collaborators backed by JavaScript callbacks
//! - `types` - value conversion across the boundary
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsImageCropper } from '@cropper/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const cropper = new JsImageCropper({ uri }, measure, getSize, crop);
//! cropper.onChangeState(({ state }) => console.log(state.image.status));
//! ```

use wasm_bindgen::prelude::*;

mod cropper;
mod services;
mod types;

pub use cropper::JsImageCropper;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (e.g. module re-instantiated) keeps the first logger.
    _ = console_log::init_with_level(log::Level::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
