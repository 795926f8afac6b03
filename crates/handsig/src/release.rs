//! Clench-then-release event detection.
//!
//! A "release" is the snap from a closed fist to an open hand between two
//! consecutive frames: previous tension above [`TENSION_HIGH`], current below
//! [`TENSION_LOW`]. A cooldown debounces the trigger so one physical gesture
//! fires once no matter how noisily the thresholds are crossed.

/// Previous-frame tension must exceed this for a release to arm.
pub const TENSION_HIGH: f32 = 0.8;

/// Current-frame tension must drop below this to fire.
pub const TENSION_LOW: f32 = 0.4;

/// Minimum spacing between two events, in seconds.
pub const COOLDOWN_S: f64 = 0.8;

/// The only state the detection path keeps between frames.
#[derive(Debug, Clone)]
pub struct ReleaseDetector {
    last_tension: f32,
    last_fire_s: f64,
}

impl ReleaseDetector {
    pub fn new() -> Self {
        Self {
            last_tension: 0.0,
            last_fire_s: f64::NEG_INFINITY,
        }
    }

    /// Feeds one frame's tension; returns true when a release fires.
    ///
    /// Call once per frame in which a hand is present, with a monotonic
    /// timestamp. The previous tension is recorded on every call, fired or
    /// not, so the detector re-arms as soon as the hand clenches again.
    pub fn update(&mut self, tension: f32, now_s: f64) -> bool {
        let fired = now_s - self.last_fire_s > COOLDOWN_S
            && self.last_tension > TENSION_HIGH
            && tension < TENSION_LOW;
        if fired {
            self.last_fire_s = now_s;
        }
        self.last_tension = tension;
        fired
    }
}

impl Default for ReleaseDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_debounce_window() {
        let mut det = ReleaseDetector::new();
        let sequence = [0.9f32, 0.9, 0.3, 0.9, 0.3];
        let mut fired_at = Vec::new();
        for (i, &t) in sequence.iter().enumerate() {
            if det.update(t, i as f64 * 0.01) {
                fired_at.push(i);
            }
        }
        // Only the first 0.9 -> 0.3 transition fires; the second falls
        // inside the cooldown.
        assert_eq!(fired_at, vec![2]);
    }

    #[test]
    fn refires_after_cooldown() {
        let mut det = ReleaseDetector::new();
        assert!(!det.update(0.9, 0.0));
        assert!(det.update(0.2, 0.1));
        assert!(!det.update(0.9, 0.2));
        // Still cooling down at +0.7s.
        assert!(!det.update(0.2, 0.8));
        assert!(!det.update(0.9, 0.9));
        // Past the window relative to the first fire.
        assert!(det.update(0.2, 1.0));
    }

    #[test]
    fn fresh_detector_needs_a_clench_first() {
        let mut det = ReleaseDetector::new();
        // Open-hand frames from a cold start never fire.
        assert!(!det.update(0.3, 0.0));
        assert!(!det.update(0.1, 0.1));
        assert!(!det.update(0.0, 0.2));
    }

    #[test]
    fn gradual_open_does_not_fire() {
        let mut det = ReleaseDetector::new();
        // Slow opening passes through the middle band and disarms before
        // the low threshold is reached.
        for (i, t) in [0.9f32, 0.7, 0.5, 0.3].into_iter().enumerate() {
            assert!(!det.update(t, i as f64 * 0.05));
        }
    }
}
