//! JSON-lines protocol between a detector process and the viewer.
//!
//! A detector writes one object per line on stdout:
//!
//! ```text
//! {"landmarks":[[0.41,0.63],[0.44,0.58], ... 21 pairs ]}
//! {"landmarks":[]}
//! ```
//!
//! An empty list means "no hand this frame". Any other count than 21 also
//! decodes to no hand; a detector that disagrees about the landmark model is
//! indistinguishable from one that lost the hand, and neither should stall
//! the viewer.

use crate::landmarks::{LandmarkSet, LANDMARK_COUNT};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One detector frame on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFrame {
    pub landmarks: Vec<[f32; 2]>,
}

impl WireFrame {
    /// Frame carrying a full hand.
    pub fn hand(lm: &LandmarkSet) -> Self {
        Self {
            landmarks: lm.points().iter().map(|p| [p.x, p.y]).collect(),
        }
    }

    /// The no-hand frame.
    pub fn empty() -> Self {
        Self { landmarks: Vec::new() }
    }

    /// `Some` only for a well-formed 21-point hand.
    pub fn to_landmarks(&self) -> Option<LandmarkSet> {
        if self.landmarks.len() != LANDMARK_COUNT {
            return None;
        }
        let mut pts = [Vec2::ZERO; LANDMARK_COUNT];
        for (dst, src) in pts.iter_mut().zip(&self.landmarks) {
            *dst = Vec2::new(src[0], src[1]);
        }
        Some(LandmarkSet::new(pts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_counts_decode_to_no_hand() {
        assert!(WireFrame::empty().to_landmarks().is_none());
        let short = WireFrame { landmarks: vec![[0.5, 0.5]; 7] };
        assert!(short.to_landmarks().is_none());
        let long = WireFrame { landmarks: vec![[0.5, 0.5]; 42] };
        assert!(long.to_landmarks().is_none());
    }

    #[test]
    fn hand_survives_the_wire() {
        let mut pts = [Vec2::ZERO; LANDMARK_COUNT];
        for (i, p) in pts.iter_mut().enumerate() {
            *p = Vec2::new(i as f32 * 0.01, 1.0 - i as f32 * 0.01);
        }
        let lm = LandmarkSet::new(pts);
        let line = serde_json::to_string(&WireFrame::hand(&lm)).unwrap();
        let back: WireFrame = serde_json::from_str(&line).unwrap();
        assert_eq!(back.to_landmarks().unwrap(), lm);
    }

    #[test]
    fn garbage_lines_fail_to_parse() {
        assert!(serde_json::from_str::<WireFrame>("not json").is_err());
        assert!(serde_json::from_str::<WireFrame>("{\"points\":[]}").is_err());
    }
}
