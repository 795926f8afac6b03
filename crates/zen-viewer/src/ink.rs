//! Pinch-gated ink overlay.
//!
//! While draw mode is on and the hand pinches, the cursor lays down glowing
//! stroke segments in display-space pixels. Segments accumulate until an
//! explicit clear; because they are stored in pixel coordinates they survive
//! window resizes untouched, with no rescaling. The recorder ticks every
//! display frame whether or not it is drawing; an inactive tick changes
//! nothing, not even the pending pen position.

use glam::Vec2;
use handsig::HandState;

/// Core stroke width in pixels.
pub const STROKE_WIDTH_PX: f32 = 4.0;

/// Soft halo reach beyond the core, in pixels.
pub const GLOW_RADIUS_PX: f32 = 15.0;

/// One stroke segment. Must match the instance inputs in the ink shader.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct SegmentInstance {
    pub a: [f32; 2],
    pub b: [f32; 2],
    pub color: [f32; 3],
    pub _pad: f32,
}

pub struct InkLayer {
    segments: Vec<SegmentInstance>,
    /// Pen-down position from the previous drawing tick; `None` whenever the
    /// pinch is open or the hand is away, so strokes never bridge a gap.
    last_point: Option<Vec2>,
    dirty: bool,
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
}

impl InkLayer {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            last_point: None,
            dirty: false,
            buffer: None,
            capacity: 0,
        }
    }

    /// One recorder tick.
    pub fn tick(&mut self, hand: &HandState, active: bool, color: [f32; 3]) {
        if !active {
            return;
        }
        if hand.present && hand.pinching {
            let p = hand.cursor_px;
            if let Some(prev) = self.last_point {
                self.segments.push(SegmentInstance {
                    a: prev.to_array(),
                    b: p.to_array(),
                    color,
                    _pad: 0.0,
                });
                self.dirty = true;
            }
            self.last_point = Some(p);
        } else {
            self.last_point = None;
        }
    }

    /// Wipes the board. Edge-triggered from the UI. The pen position is
    /// deliberately kept: a clear during an ongoing pinch lets the stroke
    /// continue from where it was.
    pub fn clear(&mut self) {
        if !self.segments.is_empty() {
            self.segments.clear();
            self.dirty = true;
        }
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn segments(&self) -> &[SegmentInstance] {
        &self.segments
    }

    /// Pushes pending segments to the GPU, growing the vertex buffer in
    /// power-of-two steps when it runs out.
    pub fn ensure_uploaded(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if !self.dirty {
            return;
        }
        let needed = self.segments.len();
        if self.buffer.is_none() || self.capacity < needed {
            let capacity = needed.max(256).next_power_of_two();
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Ink Segment VB"),
                size: (capacity * std::mem::size_of::<SegmentInstance>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = capacity;
        }
        if needed > 0 {
            let buffer = self.buffer.as_ref().unwrap();
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.segments));
        }
        self.dirty = false;
    }

    #[inline]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }
}

impl Default for InkLayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

    fn pinched_at(x: f32, y: f32) -> HandState {
        HandState {
            tension: 0.2,
            present: true,
            palm: Vec2::splat(0.5),
            cursor: Vec2::ZERO,
            cursor_px: Vec2::new(x, y),
            pinching: true,
        }
    }

    fn open_hand() -> HandState {
        let mut h = pinched_at(0.0, 0.0);
        h.pinching = false;
        h
    }

    #[test]
    fn n_points_make_n_minus_one_segments() {
        let mut ink = InkLayer::new();
        for i in 0..5 {
            ink.tick(&pinched_at(i as f32 * 10.0, 0.0), true, WHITE);
        }
        assert_eq!(ink.segment_count(), 4);
        assert_eq!(ink.segments()[0].a, [0.0, 0.0]);
        assert_eq!(ink.segments()[3].b, [40.0, 0.0]);
    }

    #[test]
    fn release_and_repinch_leave_disjoint_strokes() {
        let mut ink = InkLayer::new();
        ink.tick(&pinched_at(0.0, 0.0), true, WHITE);
        ink.tick(&pinched_at(10.0, 0.0), true, WHITE);
        // Pinch opens; pen lifts.
        ink.tick(&open_hand(), true, WHITE);
        // Re-pinch far away: first tick only re-arms the pen.
        ink.tick(&pinched_at(200.0, 200.0), true, WHITE);
        ink.tick(&pinched_at(210.0, 200.0), true, WHITE);

        assert_eq!(ink.segment_count(), 2);
        // No segment bridges (10,0) -> (200,200).
        assert_eq!(ink.segments()[1].a, [200.0, 200.0]);
    }

    #[test]
    fn hand_loss_lifts_the_pen_too() {
        let mut ink = InkLayer::new();
        ink.tick(&pinched_at(0.0, 0.0), true, WHITE);
        let mut lost = pinched_at(5.0, 5.0);
        lost.present = false;
        ink.tick(&lost, true, WHITE);
        ink.tick(&pinched_at(50.0, 50.0), true, WHITE);
        // Still no segments: singleton points on both sides of the gap.
        assert_eq!(ink.segment_count(), 0);
    }

    #[test]
    fn inactive_ticks_record_nothing() {
        let mut ink = InkLayer::new();
        ink.tick(&pinched_at(0.0, 0.0), false, WHITE);
        ink.tick(&pinched_at(10.0, 0.0), false, WHITE);
        assert_eq!(ink.segment_count(), 0);
    }

    #[test]
    fn clear_wipes_segments_but_not_the_pen() {
        let mut ink = InkLayer::new();
        ink.tick(&pinched_at(0.0, 0.0), true, WHITE);
        ink.tick(&pinched_at(10.0, 0.0), true, WHITE);
        assert_eq!(ink.segment_count(), 1);
        ink.clear();
        assert_eq!(ink.segment_count(), 0);
        // A pinch still held keeps drawing from where it was.
        ink.tick(&pinched_at(20.0, 0.0), true, WHITE);
        assert_eq!(ink.segment_count(), 1);
        assert_eq!(ink.segments()[0].a, [10.0, 0.0]);
    }

    #[test]
    fn stationary_pinch_dots_in_place() {
        let mut ink = InkLayer::new();
        ink.tick(&pinched_at(7.0, 7.0), true, WHITE);
        ink.tick(&pinched_at(7.0, 7.0), true, WHITE);
        // Degenerate segment, rendered as a dot by the round cap.
        assert_eq!(ink.segment_count(), 1);
        assert_eq!(ink.segments()[0].a, ink.segments()[0].b);
    }
}
