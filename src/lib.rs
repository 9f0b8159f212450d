//! lightbox - An embeddable pan/zoom image lightbox using Rust and WASM
//!
//! This library provides the interaction engine for a full-screen image
//! lightbox that can be embedded in web pages. The host page supplies the
//! container, image, and indicator elements plus the styling; this crate owns
//! the pan/zoom transform math, the touch gesture state machine, and the
//! open/close lifecycle, and writes its output back as a CSS transform.
//!
//! ## Architecture
//!
//! - `transform::ViewTransform`: pure pan/zoom math, unit tested natively
//! - `gesture::GesturePhase`: touch state machine (drag / pinch)
//! - `viewer::LightboxViewer`: the session object owning the live state
//! - `LightboxHandle`: WASM interface for JavaScript to control the viewer

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::{HtmlElement, HtmlImageElement};

#[cfg(target_arch = "wasm32")]
mod dom;
pub mod gesture;
pub mod transform;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
use dom::DomBinding;
#[cfg(target_arch = "wasm32")]
use viewer::LightboxViewer;

/// Callbacks that can be registered from JavaScript
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct LightboxCallbacks {
    /// Called with the JSON transform state whenever pan/zoom changes
    pub on_transform_change: Option<js_sys::Function>,
    /// Called once the close transition has finished
    pub on_close: Option<js_sys::Function>,
}

/// Callbacks that can be registered from JavaScript
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
pub struct LightboxCallbacks {}

/// A handle to a lightbox instance bound to one container/image pair.
///
/// This struct is exposed to JavaScript and provides methods to control the
/// viewer. It shares the viewer state with the DOM binding that feeds input
/// events into it.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct LightboxHandle {
    /// The session state (shared with the DOM binding)
    viewer: Rc<RefCell<LightboxViewer>>,
    /// Callbacks registered from JavaScript
    callbacks: Rc<RefCell<LightboxCallbacks>>,
    /// Listener / timer wiring (kept alive for the handle's lifetime)
    binding: Rc<DomBinding>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl LightboxHandle {
    /// Create a lightbox bound to the given elements.
    ///
    /// `container` is the full-screen viewer content element the gesture
    /// listeners attach to; `image` is the element that receives the CSS
    /// transform; `indicator` (optional) is a small element that shows the
    /// zoom percentage and auto-hides after two seconds of inactivity.
    #[wasm_bindgen]
    pub fn create(
        container: HtmlElement,
        image: HtmlImageElement,
        indicator: Option<HtmlElement>,
    ) -> Result<LightboxHandle, JsValue> {
        #[cfg(debug_assertions)]
        console_log::init_with_level(log::Level::Debug).ok();
        #[cfg(not(debug_assertions))]
        console_log::init_with_level(log::Level::Warn).ok();

        let viewer = Rc::new(RefCell::new(LightboxViewer::new()));
        let callbacks = Rc::new(RefCell::new(LightboxCallbacks::default()));
        let binding = DomBinding::new(
            viewer.clone(),
            callbacks.clone(),
            container,
            image,
            indicator,
        );

        Ok(LightboxHandle {
            viewer,
            callbacks,
            binding,
        })
    }

    /// Open the viewer: runs the glitch transition, measures image and
    /// viewport metrics (waiting for the image load event if necessary),
    /// fits the image, and attaches gesture listeners.
    #[wasm_bindgen]
    pub fn open(&self) {
        self.binding.request_open();
    }

    /// Close the viewer. Gesture listeners are detached and the transform
    /// state reset synchronously; the visual dismissal follows the
    /// transition delay.
    #[wasm_bindgen]
    pub fn close(&self) {
        self.binding.request_close();
    }

    /// Whether a viewing session is currently open
    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.viewer.borrow().is_open()
    }

    /// Current zoom level formatted for the indicator, e.g. "135%"
    #[wasm_bindgen(js_name = zoomPercent)]
    pub fn zoom_percent(&self) -> String {
        self.viewer.borrow().transform().zoom_percent()
    }

    /// Current transform as a CSS `transform` property value
    #[wasm_bindgen(js_name = transformCss)]
    pub fn transform_css(&self) -> String {
        self.viewer.borrow().transform().css_transform()
    }

    /// Current transform state as JSON:
    /// `{ scale, translate_x, translate_y, natural_width, ... }`
    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.viewer.borrow().transform())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Build timestamp of this binary
    #[wasm_bindgen(js_name = buildInfo)]
    pub fn build_info(&self) -> String {
        env!("BUILD_TIMESTAMP").to_string()
    }

    /// Detach all listeners and timers and release the viewer state
    #[wasm_bindgen]
    pub fn destroy(&self) {
        self.binding.destroy();
    }

    // =========================================================================
    // Callback registration
    // =========================================================================

    /// Register a callback invoked with the JSON transform state whenever
    /// pan or zoom changes
    #[wasm_bindgen(js_name = onTransformChange)]
    pub fn on_transform_change(&self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_transform_change = Some(callback);
    }

    /// Register a callback invoked when the close transition completes
    #[wasm_bindgen(js_name = onClose)]
    pub fn on_close(&self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_close = Some(callback);
    }

    /// Clear all registered callbacks
    #[wasm_bindgen(js_name = clearCallbacks)]
    pub fn clear_callbacks(&self) {
        let mut callbacks = self.callbacks.borrow_mut();
        callbacks.on_transform_change = None;
        callbacks.on_close = None;
    }
}
