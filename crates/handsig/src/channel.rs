//! Dual-path distribution of hand state.
//!
//! The render-rate consumers (particle field, ink recorder) read a plain
//! mutable record every tick; publishing overwrites it whole, latest write
//! wins, nothing is queued or copied along the way. The UI instead drains
//! change notices: presence transitions deduplicated against what it last
//! saw, plus the newest tension value. Everything runs on one thread inside
//! the frame callback, so the cell carries no synchronization at all; the
//! channel is owned by the application and passed by reference, never held
//! in a global.

use crate::features::GestureFrame;
use glam::Vec2;

/// The shared record. `GestureFrame` fields plus the cursor resolved into
/// display-space pixels at publish time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandState {
    pub tension: f32,
    pub present: bool,
    pub palm: Vec2,
    pub cursor: Vec2,
    pub cursor_px: Vec2,
    pub pinching: bool,
}

impl Default for HandState {
    fn default() -> Self {
        let frame = GestureFrame::absent();
        Self {
            tension: frame.tension,
            present: frame.present,
            palm: frame.palm,
            cursor: frame.cursor,
            cursor_px: Vec2::ZERO,
            pinching: frame.pinching,
        }
    }
}

/// What the UI learns from one drain. `None` fields mean "nothing new".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UiDelta {
    pub presence: Option<bool>,
    pub tension: Option<f32>,
}

#[derive(Debug, Default)]
pub struct HandChannel {
    state: HandState,
    /// Presence value last delivered through `drain_ui`.
    ui_presence: Option<bool>,
    ui_tension_pending: bool,
}

impl HandChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct path: overwrite the record. Called once per processed
    /// detector frame. Does not allocate.
    pub fn publish(&mut self, frame: &GestureFrame, viewport: Vec2) {
        self.state = HandState {
            tension: frame.tension,
            present: frame.present,
            palm: frame.palm,
            cursor: frame.cursor,
            cursor_px: frame.cursor * viewport,
            pinching: frame.pinching,
        };
        self.ui_tension_pending = true;
    }

    /// Direct path: current record. Per-tick consumers call this freely; a
    /// value one frame old is fine.
    #[inline]
    pub fn state(&self) -> HandState {
        self.state
    }

    /// Notification path: collects what changed since the previous drain.
    /// Presence flip-flops between drains collapse to the net transition
    /// (or to nothing); tension reports the latest published value.
    pub fn drain_ui(&mut self) -> UiDelta {
        let mut delta = UiDelta::default();
        if self.ui_presence != Some(self.state.present) {
            self.ui_presence = Some(self.state.present);
            delta.presence = Some(self.state.present);
        }
        if self.ui_tension_pending {
            self.ui_tension_pending = false;
            delta.tension = Some(self.state.tension);
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tension: f32, present: bool) -> GestureFrame {
        GestureFrame {
            tension,
            present,
            palm: Vec2::new(0.25, 0.75),
            cursor: Vec2::new(0.5, 0.25),
            pinching: false,
        }
    }

    #[test]
    fn publish_then_read_is_identical() {
        let mut chan = HandChannel::new();
        let f = frame(0.625, true);
        chan.publish(&f, Vec2::new(800.0, 600.0));
        let s = chan.state();
        assert_eq!(s.tension, f.tension);
        assert_eq!(s.present, f.present);
        assert_eq!(s.palm, f.palm);
        assert_eq!(s.cursor, f.cursor);
        assert_eq!(s.pinching, f.pinching);
        assert_eq!(s.cursor_px, Vec2::new(400.0, 150.0));
    }

    #[test]
    fn last_write_wins() {
        let mut chan = HandChannel::new();
        for t in [0.1f32, 0.4, 0.9, 0.2] {
            chan.publish(&frame(t, true), Vec2::ONE);
        }
        assert_eq!(chan.state().tension, 0.2);
    }

    #[test]
    fn presence_notices_are_deduplicated() {
        let mut chan = HandChannel::new();
        // First drain reports the initial (absent) state once.
        assert_eq!(chan.drain_ui().presence, Some(false));
        assert_eq!(chan.drain_ui().presence, None);

        chan.publish(&frame(0.5, true), Vec2::ONE);
        chan.publish(&frame(0.6, true), Vec2::ONE);
        assert_eq!(chan.drain_ui().presence, Some(true));
        // Still present, no repeat notice.
        chan.publish(&frame(0.7, true), Vec2::ONE);
        assert_eq!(chan.drain_ui().presence, None);
    }

    #[test]
    fn presence_flipflop_between_drains_collapses() {
        let mut chan = HandChannel::new();
        chan.drain_ui();
        chan.publish(&frame(0.5, true), Vec2::ONE);
        chan.publish(&GestureFrame::absent(), Vec2::ONE);
        // Net change since last drain: still absent.
        assert_eq!(chan.drain_ui().presence, None);
    }

    #[test]
    fn tension_notice_per_publish_batch() {
        let mut chan = HandChannel::new();
        assert_eq!(chan.drain_ui().tension, None);
        chan.publish(&frame(0.3, true), Vec2::ONE);
        chan.publish(&frame(0.8, true), Vec2::ONE);
        // Batched: one notice carrying the latest value.
        assert_eq!(chan.drain_ui().tension, Some(0.8));
        assert_eq!(chan.drain_ui().tension, None);
    }
}
