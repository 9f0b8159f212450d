//! Touch gesture state machine
//!
//! Tracks the active touch gesture across touchstart/touchmove/touchend
//! snapshots and turns raw contact positions into drag deltas and pinch
//! ratios. Pure logic; the caller owns the contact extraction and applies the
//! returned effects to the view transform.
//!
//! States: `Idle` (no contacts), `Dragging` (one contact, relative panning),
//! `Pinching` (two contacts, distance-ratio zooming). When one finger lifts
//! from a pinch the machine re-anchors to the remaining contact's current
//! position so the hand-off causes no translation jump. There is no
//! tap-vs-release distinction and no inertia: motion stops when input stops.

/// One touch contact in viewport coordinates
pub type Contact = (f32, f32);

/// Current gesture phase. Position and distance fields are updated on every
/// processed move so effects are always relative to the previous snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GesturePhase {
    /// No active contacts
    Idle,
    /// One active contact; `last` is its most recently seen position
    Dragging { last: Contact },
    /// Two active contacts; `distance` is the inter-touch distance at the
    /// previous snapshot, `midpoint` the point between them
    Pinching { distance: f32, midpoint: Contact },
}

impl Default for GesturePhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Transform-relevant outcome of one touchmove snapshot
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEffect {
    /// Nothing to apply
    None,
    /// Single-touch drag delta since the previous snapshot
    Drag { dx: f32, dy: f32 },
    /// Pinch scale ratio (current distance / previous distance)
    Pinch { ratio: f32 },
}

impl GesturePhase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any active gesture
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    /// Process a touchstart snapshot of all active contacts.
    ///
    /// One contact begins a drag; two or more begin a pinch measured over the
    /// first two. Coincident contacts (zero distance) cannot produce a ratio,
    /// so the phase is left unchanged until they separate.
    pub fn touch_start(&mut self, contacts: &[Contact]) {
        match contacts {
            [] => *self = Self::Idle,
            [only] => *self = Self::Dragging { last: *only },
            [a, b, ..] => {
                if let Some((distance, midpoint)) = pinch_geometry(*a, *b) {
                    log::trace!("pinch start: distance {distance} at {midpoint:?}");
                    *self = Self::Pinching { distance, midpoint };
                }
            }
        }
    }

    /// Process a touchmove snapshot, returning the effect to apply.
    ///
    /// While dragging, the effect is the position delta of the tracked
    /// contact; while pinching, the distance ratio since the previous move.
    /// Internal anchors advance to the current snapshot either way.
    pub fn touch_move(&mut self, contacts: &[Contact]) -> GestureEffect {
        match self {
            Self::Idle => GestureEffect::None,
            Self::Dragging { last } => {
                let Some(current) = contacts.first() else {
                    return GestureEffect::None;
                };
                let dx = current.0 - last.0;
                let dy = current.1 - last.1;
                *last = *current;
                GestureEffect::Drag { dx, dy }
            }
            Self::Pinching { distance, midpoint } => {
                let [a, b, ..] = contacts else {
                    return GestureEffect::None;
                };
                let Some((current, mid)) = pinch_geometry(*a, *b) else {
                    return GestureEffect::None;
                };
                let ratio = current / *distance;
                *distance = current;
                *midpoint = mid;
                if ratio.is_finite() && ratio > 0.0 {
                    GestureEffect::Pinch { ratio }
                } else {
                    GestureEffect::None
                }
            }
        }
    }

    /// Process a touchend snapshot of the contacts that REMAIN active.
    ///
    /// No remaining contacts ends the gesture. One remaining contact
    /// transitions Pinching -> Dragging re-anchored at that contact's current
    /// position, so the next move produces a delta from where the finger is
    /// now rather than from any historical position. Two or more remaining
    /// contacts re-measure the pinch.
    pub fn touch_end(&mut self, remaining: &[Contact]) {
        match remaining {
            [] => *self = Self::Idle,
            [only] => *self = Self::Dragging { last: *only },
            [a, b, ..] => {
                if let Some((distance, midpoint)) = pinch_geometry(*a, *b) {
                    *self = Self::Pinching { distance, midpoint };
                } else {
                    *self = Self::Idle;
                }
            }
        }
    }
}

/// Distance and midpoint of a contact pair; None for coincident or
/// non-finite contacts (a zero distance can never seed a pinch ratio)
fn pinch_geometry(a: Contact, b: Contact) -> Option<(f32, Contact)> {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance > 0.0 && distance.is_finite() {
        Some((distance, ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_one_contact_begins_drag() {
        let mut g = GesturePhase::new();
        g.touch_start(&[(100.0, 50.0)]);
        assert_eq!(g, GesturePhase::Dragging { last: (100.0, 50.0) });
    }

    #[test]
    fn test_start_two_contacts_begin_pinch() {
        let mut g = GesturePhase::new();
        g.touch_start(&[(0.0, 0.0), (30.0, 40.0)]);
        let GesturePhase::Pinching { distance, midpoint } = g else {
            panic!("expected Pinching, got {g:?}");
        };
        assert!((distance - 50.0).abs() < 0.001);
        assert!((midpoint.0 - 15.0).abs() < 0.001);
        assert!((midpoint.1 - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_start_coincident_contacts_leave_phase_unchanged() {
        let mut g = GesturePhase::new();
        g.touch_start(&[(10.0, 10.0), (10.0, 10.0)]);
        assert_eq!(g, GesturePhase::Idle);
    }

    #[test]
    fn test_drag_deltas_are_relative_to_previous_move() {
        let mut g = GesturePhase::new();
        g.touch_start(&[(100.0, 100.0)]);

        assert_eq!(
            g.touch_move(&[(110.0, 95.0)]),
            GestureEffect::Drag { dx: 10.0, dy: -5.0 }
        );
        // Anchor advanced: next delta is measured from (110, 95)
        assert_eq!(
            g.touch_move(&[(112.0, 95.0)]),
            GestureEffect::Drag { dx: 2.0, dy: 0.0 }
        );
    }

    #[test]
    fn test_pinch_ratio_per_move() {
        let mut g = GesturePhase::new();
        g.touch_start(&[(0.0, 0.0), (100.0, 0.0)]);

        let GestureEffect::Pinch { ratio } = g.touch_move(&[(0.0, 0.0), (150.0, 0.0)]) else {
            panic!("expected Pinch");
        };
        assert!((ratio - 1.5).abs() < 0.001);

        // Distance was updated: a further move to 150 is a no-change ratio
        let GestureEffect::Pinch { ratio } = g.touch_move(&[(0.0, 0.0), (150.0, 0.0)]) else {
            panic!("expected Pinch");
        };
        assert!((ratio - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_move_while_idle_is_none() {
        let mut g = GesturePhase::new();
        assert_eq!(g.touch_move(&[(5.0, 5.0)]), GestureEffect::None);
    }

    #[test]
    fn test_end_all_contacts_goes_idle() {
        let mut g = GesturePhase::new();
        g.touch_start(&[(10.0, 10.0)]);
        g.touch_end(&[]);
        assert_eq!(g, GesturePhase::Idle);
    }

    #[test]
    fn test_pinch_to_drag_reanchors_without_jump() {
        let mut g = GesturePhase::new();
        g.touch_start(&[(0.0, 0.0), (100.0, 0.0)]);
        g.touch_move(&[(0.0, 0.0), (140.0, 0.0)]);

        // First finger lifts; the remaining finger is currently at (140, 0)
        g.touch_end(&[(140.0, 0.0)]);
        assert_eq!(g, GesturePhase::Dragging { last: (140.0, 0.0) });

        // A move from exactly that position produces a zero delta: no jump
        assert_eq!(
            g.touch_move(&[(140.0, 0.0)]),
            GestureEffect::Drag { dx: 0.0, dy: 0.0 }
        );
        assert_eq!(
            g.touch_move(&[(143.0, 1.0)]),
            GestureEffect::Drag { dx: 3.0, dy: 1.0 }
        );
    }

    #[test]
    fn test_end_with_two_remaining_remeasures_pinch() {
        let mut g = GesturePhase::new();
        g.touch_start(&[(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)]);
        g.touch_end(&[(0.0, 0.0), (0.0, 80.0)]);
        let GesturePhase::Pinching { distance, .. } = g else {
            panic!("expected Pinching, got {g:?}");
        };
        assert!((distance - 80.0).abs() < 0.001);
    }

    #[test]
    fn test_drag_after_start_replaces_previous_gesture() {
        let mut g = GesturePhase::new();
        g.touch_start(&[(10.0, 10.0)]);
        // Second finger lands: drag becomes pinch
        g.touch_start(&[(10.0, 10.0), (50.0, 10.0)]);
        assert!(matches!(g, GesturePhase::Pinching { .. }));
    }
}
