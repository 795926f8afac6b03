//! Per-frame gesture features from a single landmark set.
//!
//! The camera image is mirrored for display, so palm and cursor positions flip
//! x (`1 - x`) to line up with what the user sees. Distances are unaffected.

use crate::landmarks::{LandmarkSet, FINGERTIPS, INDEX_TIP, MIDDLE_MCP, THUMB_TIP, WRIST};
use glam::Vec2;

/// Thumb-to-index distance below which the hand counts as pinching.
/// Strict comparison, no hysteresis band; a hand held exactly at the
/// threshold will flicker, which is accepted.
pub const PINCH_THRESHOLD: f32 = 0.05;

/// Floor for the palm size before division, so a degenerate landmark set
/// (all points coincident) cannot produce NaN or infinity.
const PALM_SIZE_FLOOR: f32 = 0.001;

/// Reach ratio span between an open hand (~2.2) and a fist (~1.0). Public
/// so a synthetic detector can invert the mapping.
pub const REACH_SPAN: f32 = 1.2;

/// One frame of derived hand signals. All positions are normalized [0, 1]
/// display coordinates (x already mirrored), y growing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureFrame {
    /// 0 = open hand, 1 = closed fist.
    pub tension: f32,
    pub present: bool,
    /// Middle-finger MCP, the steadiest point on the hand.
    pub palm: Vec2,
    /// Index fingertip, used for drawing.
    pub cursor: Vec2,
    pub pinching: bool,
}

impl GestureFrame {
    /// The no-hand frame: zero tension, centered positions, flags off.
    #[inline]
    pub fn absent() -> Self {
        Self {
            tension: 0.0,
            present: false,
            palm: Vec2::splat(0.5),
            cursor: Vec2::splat(0.5),
            pinching: false,
        }
    }
}

impl Default for GestureFrame {
    fn default() -> Self {
        Self::absent()
    }
}

/// Derives the full feature frame for a present hand.
pub fn extract(lm: &LandmarkSet) -> GestureFrame {
    let palm_raw = lm.point(MIDDLE_MCP);
    let cursor_raw = lm.point(INDEX_TIP);
    let pinch_dist = lm.point(THUMB_TIP).distance(cursor_raw);

    GestureFrame {
        tension: tension_of(lm),
        present: true,
        palm: mirror_x(palm_raw),
        cursor: mirror_x(cursor_raw),
        pinching: pinch_dist < PINCH_THRESHOLD,
    }
}

/// Fist tension from fingertip reach relative to palm size.
///
/// 1. Palm size: wrist to middle-finger MCP.
/// 2. Average reach: mean wrist distance over the five fingertips.
/// 3. Map the reach ratio (open ~2.2 down to fist ~1.0) onto [0, 1].
pub fn tension_of(lm: &LandmarkSet) -> f32 {
    let wrist = lm.point(WRIST);
    let palm_size = wrist.distance(lm.point(MIDDLE_MCP));

    let total: f32 = FINGERTIPS
        .iter()
        .map(|&tip| lm.point(tip).distance(wrist))
        .sum();
    let avg_reach = total / FINGERTIPS.len() as f32;

    let ratio = avg_reach / palm_size.max(PALM_SIZE_FLOOR);
    (1.0 - (ratio - 1.0) / REACH_SPAN).clamp(0.0, 1.0)
}

#[inline]
fn mirror_x(p: Vec2) -> Vec2 {
    Vec2::new(1.0 - p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LANDMARK_COUNT;

    /// Builds a hand with a 0.12 palm and all five fingertips at
    /// `ratio * palm_size` from the wrist.
    fn hand_with_ratio(ratio: f32) -> LandmarkSet {
        let wrist = Vec2::new(0.5, 0.6);
        let mut pts = [wrist; LANDMARK_COUNT];
        pts[MIDDLE_MCP] = Vec2::new(0.5, 0.48); // palm_size = 0.12
        let reach = ratio * 0.12;
        for (i, &tip) in FINGERTIPS.iter().enumerate() {
            let angle = -0.6 + 0.3 * i as f32;
            pts[tip] = wrist + Vec2::new(angle.sin(), -angle.cos()) * reach;
        }
        LandmarkSet::new(pts)
    }

    #[test]
    fn tension_maps_reach_ratio() {
        // Open hand (ratio 2.2) relaxes to 0, fist (ratio 1.0) peaks at 1.
        assert!(tension_of(&hand_with_ratio(2.2)).abs() < 1e-4);
        assert!((tension_of(&hand_with_ratio(1.0)) - 1.0).abs() < 1e-4);
        assert!((tension_of(&hand_with_ratio(1.6)) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn tension_is_clamped() {
        // Hyper-extended and tighter-than-fist hands stay inside [0, 1].
        assert_eq!(tension_of(&hand_with_ratio(5.0)), 0.0);
        assert_eq!(tension_of(&hand_with_ratio(0.5)), 1.0);
    }

    #[test]
    fn degenerate_landmarks_stay_finite() {
        // Every point coincident: palm size hits the floor, reach is zero.
        let collapsed = LandmarkSet::new([Vec2::new(0.3, 0.3); LANDMARK_COUNT]);
        let t = tension_of(&collapsed);
        assert!(t.is_finite());
        assert_eq!(t, 1.0);

        // Tiny palm with huge reach clamps to zero instead of diverging.
        let mut pts = [Vec2::new(0.5, 0.5); LANDMARK_COUNT];
        for &tip in &FINGERTIPS {
            pts[tip] = Vec2::new(100.0, 100.0);
        }
        let stretched = tension_of(&LandmarkSet::new(pts));
        assert!(stretched.is_finite());
        assert_eq!(stretched, 0.0);
    }

    #[test]
    fn pinch_threshold_is_strict() {
        let mut pts = [Vec2::new(0.5, 0.5); LANDMARK_COUNT];
        pts[THUMB_TIP] = Vec2::new(0.0, 0.0);
        pts[INDEX_TIP] = Vec2::new(PINCH_THRESHOLD, 0.0);
        assert!(!extract(&LandmarkSet::new(pts)).pinching);

        pts[INDEX_TIP] = Vec2::new(PINCH_THRESHOLD - 1e-4, 0.0);
        assert!(extract(&LandmarkSet::new(pts)).pinching);
    }

    #[test]
    fn positions_are_mirrored() {
        let mut pts = [Vec2::new(0.5, 0.5); LANDMARK_COUNT];
        // x values are dyadic so `1 - x` is exact and assert_eq holds.
        pts[MIDDLE_MCP] = Vec2::new(0.25, 0.7);
        pts[INDEX_TIP] = Vec2::new(0.875, 0.125);
        let frame = extract(&LandmarkSet::new(pts));
        assert_eq!(frame.palm, Vec2::new(0.75, 0.7));
        assert_eq!(frame.cursor, Vec2::new(0.125, 0.125));
        assert!(frame.present);
    }

    #[test]
    fn absent_frame_defaults() {
        let frame = GestureFrame::absent();
        assert_eq!(frame.tension, 0.0);
        assert!(!frame.present);
        assert!(!frame.pinching);
        assert_eq!(frame.palm, Vec2::splat(0.5));
        assert_eq!(frame.cursor, Vec2::splat(0.5));
    }
}
