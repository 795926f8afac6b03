//! Hand landmark conventions (MediaPipe 21-point model).
//!
//! Landmarks arrive as normalized image coordinates: x grows right, y grows
//! down, both nominally in [0, 1]. The detector may report points slightly
//! outside that range near the frame edge; nothing here clamps them.

use glam::Vec2;

/// Points per hand. Anything else is not a hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// One tip per finger, thumb first.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Bone connections for drawing a skeleton preview.
pub const SKELETON: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC),
    (THUMB_CMC, THUMB_MCP),
    (THUMB_MCP, THUMB_IP),
    (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP),
    (INDEX_MCP, INDEX_PIP),
    (INDEX_PIP, INDEX_DIP),
    (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP),
    (MIDDLE_MCP, MIDDLE_PIP),
    (MIDDLE_PIP, MIDDLE_DIP),
    (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP),
    (RING_MCP, RING_PIP),
    (RING_PIP, RING_DIP),
    (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP),
    (WRIST, PINKY_MCP),
    (PINKY_MCP, PINKY_PIP),
    (PINKY_PIP, PINKY_DIP),
    (PINKY_DIP, PINKY_TIP),
];

/// A complete single-hand landmark frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkSet {
    points: [Vec2; LANDMARK_COUNT],
}

impl LandmarkSet {
    #[inline]
    pub fn new(points: [Vec2; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Accepts exactly [`LANDMARK_COUNT`] points; any other length is not a
    /// usable hand and yields `None`.
    pub fn from_slice(points: &[Vec2]) -> Option<Self> {
        if points.len() != LANDMARK_COUNT {
            return None;
        }
        let mut out = [Vec2::ZERO; LANDMARK_COUNT];
        out.copy_from_slice(points);
        Some(Self { points: out })
    }

    #[inline]
    pub fn point(&self, index: usize) -> Vec2 {
        self.points[index]
    }

    #[inline]
    pub fn points(&self) -> &[Vec2; LANDMARK_COUNT] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_rejects_wrong_counts() {
        assert!(LandmarkSet::from_slice(&[]).is_none());
        assert!(LandmarkSet::from_slice(&[Vec2::ZERO; 20]).is_none());
        assert!(LandmarkSet::from_slice(&[Vec2::ZERO; 22]).is_none());
        assert!(LandmarkSet::from_slice(&[Vec2::ZERO; LANDMARK_COUNT]).is_some());
    }

    #[test]
    fn skeleton_indices_in_range() {
        for (a, b) in SKELETON {
            assert!(a < LANDMARK_COUNT && b < LANDMARK_COUNT);
        }
    }
}
