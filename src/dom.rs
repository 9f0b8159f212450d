//! DOM wiring for the lightbox viewer
//!
//! Attaches gesture listeners to the viewer's content element, applies the
//! engine's CSS transform to the image element, and sequences the open/close
//! glitch transition with fixed-delay timers. Listener teardown happens
//! synchronously inside `request_close` (and before the viewer state reset),
//! so no stale callback can mutate a closed session; the timers only pace the
//! cosmetic transition.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::timers::callback::Timeout;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, HtmlElement, HtmlImageElement, KeyboardEvent, MouseEvent, TouchEvent, WheelEvent};

use crate::viewer::{
    LightboxViewer, CLOSE_DELAY_MS, GLITCH_DURATION_MS, INDICATOR_HIDE_SECS, OPEN_DELAY_MS,
};
use crate::LightboxCallbacks;

/// Class toggled on the container while a session is live
const ACTIVE_CLASS: &str = "active";
/// Class toggled on the container during the glitch transition
const GLITCH_CLASS: &str = "glitch-transition";
/// Class toggled on the indicator element while it is shown
const INDICATOR_VISIBLE_CLASS: &str = "visible";

fn prevent_default_options() -> EventListenerOptions {
    EventListenerOptions {
        phase: EventListenerPhase::Bubble,
        passive: false,
    }
}

/// Seconds since the epoch; the indicator clock fed into the viewer
fn now_secs() -> f64 {
    js_sys::Date::now() / 1000.0
}

/// Binds one `LightboxViewer` to its container, image, and (optional) zoom
/// indicator elements. Dropping the binding detaches everything.
pub struct DomBinding {
    viewer: Rc<RefCell<LightboxViewer>>,
    callbacks: Rc<RefCell<LightboxCallbacks>>,
    container: HtmlElement,
    image: HtmlImageElement,
    indicator: Option<HtmlElement>,
    /// Gesture and escape-key listeners for the live session (RAII detach)
    listeners: RefCell<Vec<EventListener>>,
    /// One-shot image load listener when open is requested before the image
    /// has finished loading
    load_listener: RefCell<Option<EventListener>>,
    open_timer: RefCell<Option<Timeout>>,
    close_timer: RefCell<Option<Timeout>>,
    glitch_timer: RefCell<Option<Timeout>>,
    indicator_timer: RefCell<Option<Timeout>>,
}

impl DomBinding {
    pub fn new(
        viewer: Rc<RefCell<LightboxViewer>>,
        callbacks: Rc<RefCell<LightboxCallbacks>>,
        container: HtmlElement,
        image: HtmlImageElement,
        indicator: Option<HtmlElement>,
    ) -> Rc<Self> {
        Rc::new(Self {
            viewer,
            callbacks,
            container,
            image,
            indicator,
            listeners: RefCell::new(Vec::new()),
            load_listener: RefCell::new(None),
            open_timer: RefCell::new(None),
            close_timer: RefCell::new(None),
            glitch_timer: RefCell::new(None),
            indicator_timer: RefCell::new(None),
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Begin the open transition. The session goes live after
    /// [`OPEN_DELAY_MS`], once image metrics are available.
    pub fn request_open(self: &Rc<Self>) {
        if self.viewer.borrow().is_open()
            || self.open_timer.borrow().is_some()
            || self.load_listener.borrow().is_some()
        {
            return;
        }
        self.close_timer.borrow_mut().take();
        self.start_glitch();

        if self.image.complete() && self.image.natural_width() > 0 {
            self.schedule_activate();
        } else {
            // Wait for the load event, then run the same open path
            let binding = Rc::clone(self);
            let listener = EventListener::once(&self.image, "load", move |_| {
                binding.load_listener.borrow_mut().take();
                binding.schedule_activate();
            });
            *self.load_listener.borrow_mut() = Some(listener);
        }
    }

    fn schedule_activate(self: &Rc<Self>) {
        let binding = Rc::clone(self);
        *self.open_timer.borrow_mut() = Some(Timeout::new(OPEN_DELAY_MS, move || {
            binding.open_timer.borrow_mut().take();
            binding.activate();
        }));
    }

    /// Measure metrics and bring the session live. Viewport dimensions are
    /// captured here, once; they are not re-measured on resize while open.
    fn activate(self: &Rc<Self>) {
        let natural = (self.image.natural_width(), self.image.natural_height());
        let viewport = (
            self.container.client_width().max(0) as u32,
            self.container.client_height().max(0) as u32,
        );
        if !self.viewer.borrow_mut().open(natural, viewport) {
            log::warn!("lightbox open aborted: missing image or viewport metrics");
            return;
        }
        let _ = self.container.class_list().add_1(ACTIVE_CLASS);
        self.apply_transform();
        self.attach_listeners();
    }

    /// Close the session. Listener detach and state reset happen
    /// synchronously; only the visual dismissal is delayed.
    pub fn request_close(self: &Rc<Self>) {
        self.listeners.borrow_mut().clear();
        self.load_listener.borrow_mut().take();
        self.open_timer.borrow_mut().take();
        let was_open = self.viewer.borrow().is_open();
        self.viewer.borrow_mut().close();
        self.hide_indicator();
        if !was_open {
            return;
        }

        self.start_glitch();
        let binding = Rc::clone(self);
        *self.close_timer.borrow_mut() = Some(Timeout::new(CLOSE_DELAY_MS, move || {
            binding.close_timer.borrow_mut().take();
            let _ = binding.container.class_list().remove_1(ACTIVE_CLASS);
            let _ = binding.image.style().remove_property("transform");
            let on_close = binding.callbacks.borrow().on_close.clone();
            if let Some(on_close) = on_close {
                let _ = on_close.call0(&JsValue::NULL);
            }
        }));
    }

    /// Tear everything down immediately (handle destroyed)
    pub fn destroy(&self) {
        self.listeners.borrow_mut().clear();
        self.load_listener.borrow_mut().take();
        self.open_timer.borrow_mut().take();
        self.close_timer.borrow_mut().take();
        self.glitch_timer.borrow_mut().take();
        self.indicator_timer.borrow_mut().take();
        self.viewer.borrow_mut().close();
        self.hide_indicator();
        let _ = self.container.class_list().remove_1(ACTIVE_CLASS);
        let _ = self.container.class_list().remove_1(GLITCH_CLASS);
        let _ = self.image.style().remove_property("transform");
    }

    /// Put the glitch class on the container for [`GLITCH_DURATION_MS`]
    fn start_glitch(self: &Rc<Self>) {
        let _ = self.container.class_list().add_1(GLITCH_CLASS);
        let binding = Rc::clone(self);
        *self.glitch_timer.borrow_mut() = Some(Timeout::new(GLITCH_DURATION_MS, move || {
            binding.glitch_timer.borrow_mut().take();
            let _ = binding.container.class_list().remove_1(GLITCH_CLASS);
        }));
    }

    // =========================================================================
    // Gesture listeners
    // =========================================================================

    fn attach_listeners(self: &Rc<Self>) {
        let mut listeners = self.listeners.borrow_mut();

        let binding = Rc::clone(self);
        listeners.push(EventListener::new(
            &self.container,
            "mousemove",
            move |event: &Event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let rect = binding.container.get_bounding_client_rect();
                let pointer = (
                    event.client_x() as f32 - rect.left() as f32,
                    event.client_y() as f32 - rect.top() as f32,
                );
                let extent = (rect.width() as f32, rect.height() as f32);
                let now = now_secs();
                if binding.viewer.borrow_mut().pointer_moved(pointer, extent, now) {
                    binding.apply_transform();
                    binding.show_indicator(now);
                }
            },
        ));

        let binding = Rc::clone(self);
        listeners.push(EventListener::new_with_options(
            &self.container,
            "wheel",
            prevent_default_options(),
            move |event: &Event| {
                let Some(event) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                event.prevent_default();
                let now = now_secs();
                if binding.viewer.borrow_mut().wheel(event.delta_y() as f32, now) {
                    binding.apply_transform();
                    binding.show_indicator(now);
                }
            },
        ));

        let binding = Rc::clone(self);
        listeners.push(EventListener::new_with_options(
            &self.container,
            "touchstart",
            prevent_default_options(),
            move |event: &Event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                binding.viewer.borrow_mut().touch_start(&contacts_from(event));
            },
        ));

        let binding = Rc::clone(self);
        listeners.push(EventListener::new_with_options(
            &self.container,
            "touchmove",
            prevent_default_options(),
            move |event: &Event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                let now = now_secs();
                if binding.viewer.borrow_mut().touch_move(&contacts_from(event), now) {
                    binding.apply_transform();
                    binding.show_indicator(now);
                }
            },
        ));

        // touchend and touchcancel both report the contacts that remain
        for end_event in ["touchend", "touchcancel"] {
            let binding = Rc::clone(self);
            listeners.push(EventListener::new(&self.container, end_event, move |event: &Event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                binding.viewer.borrow_mut().touch_end(&contacts_from(event));
            }));
        }

        if let Some(document) = self.container.owner_document() {
            let binding = Rc::clone(self);
            listeners.push(EventListener::new(&document, "keydown", move |event: &Event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if event.key() == "Escape" {
                    binding.request_close();
                }
            }));
        }
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Push the current transform onto the image element and notify the
    /// registered state-change callback
    pub fn apply_transform(&self) {
        let css = self.viewer.borrow().transform().css_transform();
        let _ = self.image.style().set_property("transform", &css);

        let on_change = self.callbacks.borrow().on_transform_change.clone();
        if let Some(on_change) = on_change {
            let json =
                serde_json::to_string(self.viewer.borrow().transform()).unwrap_or_default();
            let _ = on_change.call1(&JsValue::NULL, &JsValue::from_str(&json));
        }
    }

    /// Show the zoom indicator and re-arm its auto-hide timer
    fn show_indicator(self: &Rc<Self>, now: f64) {
        let Some(element) = &self.indicator else {
            return;
        };
        let Some(text) = self.viewer.borrow().indicator(now) else {
            return;
        };
        element.set_text_content(Some(&text));
        let _ = element.class_list().add_1(INDICATOR_VISIBLE_CLASS);

        let binding = Rc::clone(self);
        let hide_ms = (INDICATOR_HIDE_SECS * 1000.0) as u32;
        *self.indicator_timer.borrow_mut() = Some(Timeout::new(hide_ms, move || {
            binding.indicator_timer.borrow_mut().take();
            binding.hide_indicator();
        }));
    }

    fn hide_indicator(&self) {
        if let Some(element) = &self.indicator {
            let _ = element.class_list().remove_1(INDICATOR_VISIBLE_CLASS);
        }
    }
}

/// Viewport-coordinate snapshot of the active contacts on a touch event.
/// For end events the touch list already excludes the lifted contacts.
fn contacts_from(event: &TouchEvent) -> Vec<(f32, f32)> {
    let touches = event.touches();
    (0..touches.length())
        .filter_map(|i| touches.item(i))
        .map(|touch| (touch.client_x() as f32, touch.client_y() as f32))
        .collect()
}
