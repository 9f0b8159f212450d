//! Pan/zoom transformation logic for the lightbox viewer
//!
//! This module contains pure coordinate transformation logic that can be
//! unit tested without any DOM dependencies.

use serde::Serialize;

/// Fit-scale multiplier: the image overflows the viewport by 20% so that
/// panning has room to operate.
pub const OVERFLOW_FACTOR: f32 = 1.2;

/// Damping applied to absolute pointer panning (softens edge-to-edge sweeps)
pub const PAN_DAMPING: f32 = 0.8;

/// Zoom step for one wheel notch (scale multiplied by 1 ± this)
pub const WHEEL_ZOOM_STEP: f32 = 0.1;

/// Maximum zoom factor
pub const MAX_ZOOM: f32 = 3.0;

/// Tolerance below which a scale change is treated as no change
const SCALE_EPSILON: f32 = 0.0001;

/// Pan/zoom state for one open viewer session.
///
/// `translate_x`/`translate_y` are the pixel offset of the image center from
/// the viewport center, in unscaled units. Natural and viewport dimensions are
/// captured once (image load / viewer open) and never re-measured while the
/// session is open.
#[derive(Clone, Debug, Serialize)]
pub struct ViewTransform {
    /// Current zoom factor
    pub scale: f32,
    /// Horizontal offset of the image center from the viewport center (px)
    pub translate_x: f32,
    /// Vertical offset of the image center from the viewport center (px)
    pub translate_y: f32,
    /// Intrinsic image width in pixels
    pub natural_width: u32,
    /// Intrinsic image height in pixels
    pub natural_height: u32,
    /// Viewport width in pixels, fixed at open time
    pub viewport_width: u32,
    /// Viewport height in pixels, fixed at open time
    pub viewport_height: u32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            natural_width: 0,
            natural_height: 0,
            viewport_width: 0,
            viewport_height: 0,
        }
    }
}

impl ViewTransform {
    /// Create a transform with no image metrics (all operations no-op until
    /// `fit_to_viewport` succeeds)
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the no-session default state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether image and viewport metrics are available. All pan/zoom
    /// operations no-op until this is true.
    pub fn has_metrics(&self) -> bool {
        self.natural_width > 0
            && self.natural_height > 0
            && self.viewport_width > 0
            && self.viewport_height > 0
    }

    /// Minimum zoom factor: the scale at which the image exactly fits inside
    /// the viewport on its larger relative axis.
    ///
    /// Recomputed from the stored dimensions on every call; never cached.
    pub fn min_scale(&self) -> f32 {
        if !self.has_metrics() {
            return 0.0;
        }
        let sx = self.viewport_width as f32 / self.natural_width as f32;
        let sy = self.viewport_height as f32 / self.natural_height as f32;
        sx.min(sy)
    }

    /// Maximum legal translation per axis at the current scale. Zero when the
    /// scaled image does not exceed the viewport on that axis, so the image
    /// may never reveal empty space beyond its edges.
    pub fn max_translate(&self) -> (f32, f32) {
        let tx = ((self.natural_width as f32 * self.scale - self.viewport_width as f32) / 2.0)
            .max(0.0);
        let ty = ((self.natural_height as f32 * self.scale - self.viewport_height as f32) / 2.0)
            .max(0.0);
        (tx, ty)
    }

    /// Initialize the session from image and viewport metrics.
    ///
    /// The scale is chosen so the image covers the viewport on both axes,
    /// then inflated by [`OVERFLOW_FACTOR`] and clamped into the legal zoom
    /// range. Translation resets to center. Returns false (state unchanged)
    /// if any dimension is zero.
    pub fn fit_to_viewport(&mut self, natural: (u32, u32), viewport: (u32, u32)) -> bool {
        let (nw, nh) = natural;
        let (vw, vh) = viewport;
        if nw == 0 || nh == 0 || vw == 0 || vh == 0 {
            return false;
        }

        self.natural_width = nw;
        self.natural_height = nh;
        self.viewport_width = vw;
        self.viewport_height = vh;

        let cover = (vw as f32 / nw as f32).max(vh as f32 / nh as f32);
        // For images smaller than a third of the viewport the fit floor
        // exceeds MAX_ZOOM; the zoom ceiling wins
        let floor = self.min_scale().min(MAX_ZOOM);
        self.scale = (cover * OVERFLOW_FACTOR).clamp(floor, MAX_ZOOM);
        self.translate_x = 0.0;
        self.translate_y = 0.0;
        true
    }

    /// Absolute pointer-position panning: the pointer position inside the
    /// viewport maps directly to an image offset (this is not relative
    /// dragging).
    ///
    /// `pointer` is in viewport-relative coordinates; `extent` is the live
    /// width/height of the viewport bounding rectangle. The offset from the
    /// viewport center is scaled by `max_translate / (extent / 2)` and damped
    /// by [`PAN_DAMPING`], then clamped. Returns whether the translation
    /// changed.
    pub fn pan_to_pointer(&mut self, pointer: (f32, f32), extent: (f32, f32)) -> bool {
        if !self.has_metrics() || extent.0 <= 0.0 || extent.1 <= 0.0 {
            return false;
        }

        let (max_tx, max_ty) = self.max_translate();
        let half_w = extent.0 / 2.0;
        let half_h = extent.1 / 2.0;

        let offset_x = pointer.0 - half_w;
        let offset_y = pointer.1 - half_h;
        let new_tx = (-offset_x * (max_tx / half_w) * PAN_DAMPING).clamp(-max_tx, max_tx);
        let new_ty = (-offset_y * (max_ty / half_h) * PAN_DAMPING).clamp(-max_ty, max_ty);

        let changed = new_tx != self.translate_x || new_ty != self.translate_y;
        self.translate_x = new_tx;
        self.translate_y = new_ty;
        changed
    }

    /// Relative drag panning: the per-frame delta of a single active touch is
    /// added to the current translation, then clamped. Returns whether the
    /// translation changed.
    pub fn drag_by(&mut self, dx: f32, dy: f32) -> bool {
        if !self.has_metrics() || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        let before = (self.translate_x, self.translate_y);
        self.translate_x += dx;
        self.translate_y += dy;
        self.clamp_translation();
        (self.translate_x, self.translate_y) != before
    }

    /// Multiplicative zoom shared by wheel and pinch input.
    ///
    /// The new scale is clamped into `[min_scale, MAX_ZOOM]`; translation is
    /// rescaled by the applied ratio so the focal point stays visually fixed,
    /// then re-clamped against the new bounds. A ratio of 1.0 (or a
    /// non-finite / non-positive one) leaves the state unchanged.
    pub fn zoom_by_ratio(&mut self, ratio: f32) -> bool {
        if !self.has_metrics() || !ratio.is_finite() || ratio <= 0.0 {
            return false;
        }
        if (ratio - 1.0).abs() < SCALE_EPSILON {
            return false;
        }

        let old_scale = self.scale;
        let floor = self.min_scale().min(MAX_ZOOM);
        let new_scale = (old_scale * ratio).clamp(floor, MAX_ZOOM);
        if (new_scale - old_scale).abs() < SCALE_EPSILON {
            return false; // No change after clamping
        }

        let applied = new_scale / old_scale;
        self.scale = new_scale;
        self.translate_x *= applied;
        self.translate_y *= applied;
        self.clamp_translation();
        true
    }

    /// Wheel zoom entry: only the sign of the vertical delta is consumed.
    /// Scrolling up (negative delta) zooms in by [`WHEEL_ZOOM_STEP`],
    /// scrolling down zooms out. A zero delta leaves the state unchanged.
    pub fn zoom_by_wheel(&mut self, delta_y: f32) -> bool {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        let ratio = if delta_y < 0.0 {
            1.0 + WHEEL_ZOOM_STEP
        } else {
            1.0 - WHEEL_ZOOM_STEP
        };
        self.zoom_by_ratio(ratio)
    }

    /// Clamp translation into the legal bounds for the current scale
    pub fn clamp_translation(&mut self) {
        let (max_tx, max_ty) = self.max_translate();
        self.translate_x = self.translate_x.clamp(-max_tx, max_tx);
        self.translate_y = self.translate_y.clamp(-max_ty, max_ty);
    }

    /// Render the transform as a CSS `transform` value. The image element is
    /// centered with the -50% translate, offset by the pan translation in
    /// unscaled pixels, then scaled (translate-then-scale order).
    pub fn css_transform(&self) -> String {
        format!(
            "translate(calc(-50% + {:.2}px), calc(-50% + {:.2}px)) scale({:.4})",
            self.translate_x, self.translate_y, self.scale
        )
    }

    /// Zoom level for the on-screen indicator, e.g. "135%"
    pub fn zoom_percent(&self) -> String {
        format!("{}%", (self.scale * 100.0).round() as i32)
    }
}
