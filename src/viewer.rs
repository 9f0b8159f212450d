//! Lightbox viewer session
//!
//! `LightboxViewer` owns the single live [`ViewTransform`] and
//! [`GesturePhase`] for the currently-open viewer. Raw input events are fed
//! in through the methods below; each one fully applies its transform before
//! returning, and every entry point no-ops while the viewer is closed so a
//! stale callback can never mutate a closed session. All state mutation is
//! synchronous on the caller's (UI) thread.

use crate::gesture::{Contact, GestureEffect, GesturePhase};
use crate::transform::ViewTransform;

/// How long the zoom indicator stays visible after the last pan/zoom activity
pub const INDICATOR_HIDE_SECS: f64 = 2.0;

/// Delay between the start of the open transition and the session going live
pub const OPEN_DELAY_MS: u32 = 100;

/// Delay between a close request and the viewer visually dismissing
pub const CLOSE_DELAY_MS: u32 = 200;

/// Total duration of the open/close glitch transition effect
pub const GLITCH_DURATION_MS: u32 = 600;

/// A self-contained pan/zoom viewer session.
///
/// Timestamps are injected as `f64` seconds so indicator visibility stays
/// testable without a wall clock.
pub struct LightboxViewer {
    transform: ViewTransform,
    gesture: GesturePhase,
    open: bool,
    /// Time of the last transform-changing input, for indicator auto-hide
    last_activity: Option<f64>,
}

impl Default for LightboxViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl LightboxViewer {
    pub fn new() -> Self {
        Self {
            transform: ViewTransform::new(),
            gesture: GesturePhase::new(),
            open: false,
            last_activity: None,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open a viewing session with the given image and viewport metrics.
    ///
    /// Fails (stays closed, returns false) if any dimension is zero — the
    /// image has not finished loading or layout has not settled. Only one
    /// session exists at a time; reopening re-fits from scratch.
    pub fn open(&mut self, natural: (u32, u32), viewport: (u32, u32)) -> bool {
        if !self.transform.fit_to_viewport(natural, viewport) {
            log::debug!("open rejected: natural {natural:?}, viewport {viewport:?}");
            return false;
        }
        self.gesture.reset();
        self.last_activity = None;
        self.open = true;
        log::debug!(
            "viewer open: {}x{} in {}x{}, fit scale {:.3}",
            natural.0,
            natural.1,
            viewport.0,
            viewport.1,
            self.transform.scale
        );
        true
    }

    /// Close the session: transform and gesture state reset to defaults.
    /// The caller must have detached its input listeners first.
    pub fn close(&mut self) {
        self.transform.reset();
        self.gesture.reset();
        self.last_activity = None;
        self.open = false;
        log::debug!("viewer closed");
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Current transform descriptor for the rendering collaborator
    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    // =========================================================================
    // Input entry points (no-ops while closed)
    // =========================================================================

    /// Mouse move over the viewport: absolute pointer-position panning.
    /// `pointer` is viewport-relative, `extent` the live bounding-rect size.
    /// Returns whether the transform changed (the host should re-render).
    pub fn pointer_moved(&mut self, pointer: (f32, f32), extent: (f32, f32), now: f64) -> bool {
        if !self.open {
            return false;
        }
        let changed = self.transform.pan_to_pointer(pointer, extent);
        if changed {
            self.last_activity = Some(now);
        }
        changed
    }

    /// Wheel input; only the vertical delta sign is used
    pub fn wheel(&mut self, delta_y: f32, now: f64) -> bool {
        if !self.open {
            return false;
        }
        let changed = self.transform.zoom_by_wheel(delta_y);
        if changed {
            self.last_activity = Some(now);
        }
        changed
    }

    /// Touchstart snapshot of all active contacts; never changes the
    /// transform, only the gesture phase
    pub fn touch_start(&mut self, contacts: &[Contact]) {
        if !self.open {
            return;
        }
        self.gesture.touch_start(contacts);
    }

    /// Touchmove snapshot; applies the resulting drag or pinch
    pub fn touch_move(&mut self, contacts: &[Contact], now: f64) -> bool {
        if !self.open {
            return false;
        }
        let changed = match self.gesture.touch_move(contacts) {
            GestureEffect::None => false,
            GestureEffect::Drag { dx, dy } => self.transform.drag_by(dx, dy),
            GestureEffect::Pinch { ratio } => self.transform.zoom_by_ratio(ratio),
        };
        if changed {
            self.last_activity = Some(now);
        }
        changed
    }

    /// Touchend snapshot of the contacts that remain active
    pub fn touch_end(&mut self, remaining: &[Contact]) {
        if !self.open {
            return;
        }
        self.gesture.touch_end(remaining);
    }

    // =========================================================================
    // Indicator
    // =========================================================================

    /// Zoom-percentage text for the on-screen indicator, or None once
    /// [`INDICATOR_HIDE_SECS`] have passed since the last activity
    pub fn indicator(&self, now: f64) -> Option<String> {
        let shown_at = self.last_activity?;
        if self.open && now - shown_at < INDICATOR_HIDE_SECS {
            Some(self.transform.zoom_percent())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::MAX_ZOOM;

    const NATURAL: (u32, u32) = (2000, 1000);
    const VIEWPORT: (u32, u32) = (800, 600);
    const EXTENT: (f32, f32) = (800.0, 600.0);

    fn open_viewer() -> LightboxViewer {
        let mut v = LightboxViewer::new();
        assert!(v.open(NATURAL, VIEWPORT));
        v
    }

    #[test]
    fn test_open_computes_fit() {
        let v = open_viewer();
        assert!(v.is_open());
        assert!((v.transform().scale - 0.72).abs() < 0.0001);
    }

    #[test]
    fn test_open_rejects_missing_metrics() {
        let mut v = LightboxViewer::new();
        assert!(!v.open((0, 0), VIEWPORT));
        assert!(!v.is_open());
        assert!(!v.open(NATURAL, (800, 0)));
        assert!(!v.is_open());
    }

    #[test]
    fn test_input_ignored_while_closed() {
        let mut v = LightboxViewer::new();
        assert!(!v.pointer_moved((10.0, 10.0), EXTENT, 0.0));
        assert!(!v.wheel(-1.0, 0.0));
        v.touch_start(&[(1.0, 1.0)]);
        assert!(!v.touch_move(&[(50.0, 50.0)], 0.0));
        assert!((v.transform().scale - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_close_resets_and_blocks_stale_input() {
        let mut v = open_viewer();
        v.wheel(-1.0, 0.0);
        v.touch_start(&[(10.0, 10.0)]);
        v.close();

        assert!(!v.is_open());
        assert!((v.transform().scale - 1.0).abs() < 0.001);
        assert_eq!(v.transform().translate_x, 0.0);

        // A listener that outlived the session must not mutate anything
        assert!(!v.touch_move(&[(90.0, 90.0)], 1.0));
        assert!(!v.wheel(-1.0, 1.0));
        assert_eq!(v.transform().translate_x, 0.0);
    }

    #[test]
    fn test_wheel_zoom_scenario() {
        let mut v = open_viewer();
        assert!(v.wheel(-120.0, 0.0));
        assert!((v.transform().scale - 0.792).abs() < 0.0001);
    }

    #[test]
    fn test_touch_drag_sequence() {
        let mut v = open_viewer();
        v.touch_start(&[(100.0, 100.0)]);
        assert!(v.touch_move(&[(130.0, 90.0)], 0.1));
        assert!((v.transform().translate_x - 30.0).abs() < 0.001);
        assert!((v.transform().translate_y - (-10.0)).abs() < 0.001);
        v.touch_end(&[]);

        // Gesture over: further moves have no anchor and change nothing
        assert!(!v.touch_move(&[(200.0, 200.0)], 0.2));
    }

    #[test]
    fn test_pinch_then_lift_one_finger_no_jump() {
        let mut v = open_viewer();
        v.touch_start(&[(300.0, 300.0), (500.0, 300.0)]);

        // Distance grows 200 -> 300: zoom by 1.5 (0.72 -> 1.08)
        assert!(v.touch_move(&[(250.0, 300.0), (550.0, 300.0)], 0.1));
        assert!((v.transform().scale - 1.08).abs() < 0.001);
        let tx = v.transform().translate_x;
        let ty = v.transform().translate_y;

        // One finger lifts; the survivor is at its current position
        v.touch_end(&[(550.0, 300.0)]);
        assert!(!v.touch_move(&[(550.0, 300.0)], 0.2), "re-anchor must not jump");
        assert_eq!(v.transform().translate_x, tx);
        assert_eq!(v.transform().translate_y, ty);

        // The drag continues incrementally from there
        assert!(v.touch_move(&[(560.0, 300.0)], 0.3));
        assert!((v.transform().translate_x - (tx + 10.0)).abs() < 0.001);
    }

    #[test]
    fn test_invariants_across_mixed_input() {
        let mut v = open_viewer();
        v.pointer_moved((790.0, 10.0), EXTENT, 0.0);
        v.wheel(-1.0, 0.1);
        v.touch_start(&[(100.0, 100.0), (300.0, 100.0)]);
        v.touch_move(&[(50.0, 100.0), (350.0, 100.0)], 0.2);
        v.touch_end(&[(350.0, 100.0)]);
        v.touch_move(&[(0.0, 0.0)], 0.3);

        let t = v.transform();
        assert!(t.scale >= t.min_scale() - 0.001 && t.scale <= MAX_ZOOM + 0.001);
        let (max_tx, max_ty) = t.max_translate();
        assert!(t.translate_x.abs() <= max_tx + 0.001);
        assert!(t.translate_y.abs() <= max_ty + 0.001);
    }

    #[test]
    fn test_indicator_auto_hides_after_inactivity() {
        let mut v = open_viewer();
        assert_eq!(v.indicator(10.0), None, "no activity yet");

        v.wheel(-1.0, 10.0);
        assert_eq!(v.indicator(10.5), Some("79%".to_string()));
        assert_eq!(v.indicator(11.9), Some("79%".to_string()));
        assert_eq!(v.indicator(12.0), None, "hidden after 2s");

        // New activity re-arms the window
        v.wheel(-1.0, 12.5);
        assert!(v.indicator(13.0).is_some());

        v.close();
        assert_eq!(v.indicator(13.1), None);
    }

    #[test]
    fn test_reopen_refits() {
        let mut v = open_viewer();
        v.wheel(-1.0, 0.0);
        v.close();
        assert!(v.open((1000, 1000), (500, 500)));
        assert!((v.transform().scale - 0.6).abs() < 0.0001);
        assert_eq!(v.transform().translate_x, 0.0);
    }
}
