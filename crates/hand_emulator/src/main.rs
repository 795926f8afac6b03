//! Synthetic hand detector for running the viewer without a camera.
//!
//! Speaks the same wire format a real landmark detector would: one JSON
//! frame per line on stdout, 21 normalized `[x, y]` pairs or an empty list
//! for "no hand". The hand runs a fixed gesture loop that exercises every
//! consumer downstream: clench-and-release waves for the scatter effect, a
//! pinch stretch that traces ink, and a dropout so presence handling gets
//! hit too. Logs go to stderr, which the viewer inherits.

use anyhow::Result;
use clap::Parser;
use glam::Vec2;
use handsig::{
    features::REACH_SPAN,
    landmarks::{INDEX_TIP, LANDMARK_COUNT, THUMB_TIP, WRIST},
    wire::WireFrame,
    LandmarkSet,
};
use rand::Rng;
use std::io::Write;
use std::time::{Duration, Instant};

/// Wrist to middle-MCP distance of the synthetic hand.
const PALM_SIZE: f32 = 0.12;

/// Full gesture loop, seconds.
const CYCLE_S: f32 = 16.0;

/// One clench-and-release wave, seconds.
const WAVE_S: f32 = 4.0;

/// Per-finger reach multipliers, thumb through pinky. The mean is exactly 1
/// so the average fingertip reach, and with it the recovered tension, stays
/// on script.
const FINGER_REACH: [f32; 5] = [0.9, 1.05, 1.15, 1.0, 0.9];

/// Fan-out of each finger from straight up, radians.
const FINGER_ANGLE: [f32; 5] = [-0.85, -0.25, 0.0, 0.25, 0.55];

#[derive(Parser, Debug)]
#[command(name = "hand_emulator", about = "Synthetic hand landmark stream")]
struct Config {
    /// Frames per second to emit.
    #[arg(long, env = "HAND_EMULATOR_FPS", default_value_t = 30)]
    fps: u32,

    /// Uniform jitter added to every coordinate.
    #[arg(long, env = "HAND_EMULATOR_NOISE", default_value_t = 0.002)]
    noise: f32,
}

/// The scripted pose at one instant of the loop.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    present: bool,
    tension: f32,
    pinch: bool,
}

fn pose_at(cycle_t: f32) -> Pose {
    if cycle_t < 8.0 {
        // Two clench waves back to back.
        Pose {
            present: true,
            tension: clench_wave((cycle_t % WAVE_S) / WAVE_S),
            pinch: false,
        }
    } else if cycle_t < 13.0 {
        // Pinch and write; tension parked mid-range so no release can fire.
        Pose {
            present: true,
            tension: 0.35,
            pinch: true,
        }
    } else if cycle_t < 14.5 {
        // Open drift before leaving the frame.
        Pose {
            present: true,
            tension: 0.1,
            pinch: false,
        }
    } else {
        Pose {
            present: false,
            tension: 0.0,
            pinch: false,
        }
    }
}

/// One wave: ease shut, hold the fist, then snap open between two frames.
/// The snap is deliberate; a release is a high-to-low jump across adjacent
/// detector frames, and a gradual ramp would never register as one.
fn clench_wave(phase: f32) -> f32 {
    const RISE_END: f32 = 0.55;
    const HOLD_END: f32 = 0.75;
    if phase < RISE_END {
        let u = phase / RISE_END;
        0.05 + 0.9 * (u * u * (3.0 - 2.0 * u))
    } else if phase < HOLD_END {
        0.95
    } else {
        0.05
    }
}

/// Slow Lissajous wander, kept away from the frame edges.
fn palm_center(t: f32) -> Vec2 {
    Vec2::new(
        0.5 + 0.16 * (t * std::f32::consts::TAU / 7.3).sin(),
        0.45 + 0.1 * (t * std::f32::consts::TAU / 5.1).cos(),
    )
}

/// Builds a 21-point hand around `palm` whose fingertip reach inverts the
/// viewer's tension mapping: reach = palm_size * (1 + span * (1 - tension)).
/// Knuckles sit on a fixed rim; only the reach breathes with tension.
fn synth_hand(palm: Vec2, tension: f32, pinch: bool) -> LandmarkSet {
    let wrist = palm + Vec2::new(0.0, PALM_SIZE); // y grows downward
    let mut pts = [wrist; LANDMARK_COUNT];
    pts[WRIST] = wrist;

    let reach_base = PALM_SIZE * (1.0 + REACH_SPAN * (1.0 - tension));
    for finger in 0..5 {
        let (sin, cos) = FINGER_ANGLE[finger].sin_cos();
        let dir = Vec2::new(sin, -cos);
        let knuckle = wrist + dir * PALM_SIZE;
        let tip = wrist + dir * (reach_base * FINGER_REACH[finger]);

        let chain = 1 + finger * 4;
        pts[chain] = knuckle;
        pts[chain + 1] = knuckle.lerp(tip, 0.45);
        pts[chain + 2] = knuckle.lerp(tip, 0.75);
        pts[chain + 3] = tip;
    }

    if pinch {
        // Bring thumb and index tips well inside the pinch threshold.
        let meet = (pts[THUMB_TIP] + pts[INDEX_TIP]) * 0.5;
        pts[THUMB_TIP] = meet + Vec2::new(-0.008, 0.0);
        pts[INDEX_TIP] = meet + Vec2::new(0.008, 0.0);
    }

    LandmarkSet::new(pts)
}

fn frame_at(t: f32, noise: f32, rng: &mut impl Rng) -> WireFrame {
    let pose = pose_at(t % CYCLE_S);
    if !pose.present {
        return WireFrame::empty();
    }
    let lm = synth_hand(palm_center(t), pose.tension, pose.pinch);
    if noise <= 0.0 {
        return WireFrame::hand(&lm);
    }
    let mut pts = *lm.points();
    for p in pts.iter_mut() {
        p.x += rng.gen_range(-noise..=noise);
        p.y += rng.gen_range(-noise..=noise);
    }
    WireFrame::hand(&LandmarkSet::new(pts))
}

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = Config::parse();
    let fps = config.fps.max(1);
    let period = Duration::from_secs_f64(1.0 / f64::from(fps));
    log::info!(
        "Emitting synthetic hand frames: {} fps, {}s gesture loop, noise {}",
        fps,
        CYCLE_S,
        config.noise
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut rng = rand::thread_rng();
    let start = Instant::now();
    let mut next = start;

    loop {
        let t = start.elapsed().as_secs_f32();
        let frame = frame_at(t, config.noise, &mut rng);
        let line = serde_json::to_string(&frame)?;
        if writeln!(out, "{line}").and_then(|_| out.flush()).is_err() {
            // The consumer closed the pipe; nothing left to do.
            log::info!("Output pipe closed, stopping");
            return Ok(());
        }

        next += period;
        if let Some(wait) = next.checked_duration_since(Instant::now()) {
            std::thread::sleep(wait);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handsig::{extract, ReleaseDetector};

    #[test]
    fn recovered_tension_matches_the_script() {
        for tension in [0.0, 0.25, 0.5, 0.8, 1.0] {
            let lm = synth_hand(Vec2::new(0.5, 0.45), tension, false);
            let got = extract(&lm).tension;
            assert!(
                (got - tension).abs() < 1e-3,
                "scripted {tension}, recovered {got}"
            );
        }
    }

    #[test]
    fn pinch_passes_the_extractor_threshold() {
        let palm = Vec2::new(0.5, 0.45);
        assert!(extract(&synth_hand(palm, 0.35, true)).pinching);
        assert!(!extract(&synth_hand(palm, 0.35, false)).pinching);
    }

    #[test]
    fn wave_snaps_open_between_frames() {
        // Adjacent samples around the hold/open boundary jump the full
        // release window in one step.
        let before = clench_wave(0.74);
        let after = clench_wave(0.76);
        assert!(before > 0.8, "held fist reads {before}");
        assert!(after < 0.4, "snapped hand reads {after}");
    }

    #[test]
    fn one_release_per_wave() {
        let mut det = ReleaseDetector::new();
        let mut fired = 0;
        // Two waves at 30 fps.
        for frame in 0..240 {
            let t = frame as f32 / 30.0;
            let pose = pose_at(t);
            assert!(pose.present);
            if det.update(pose.tension, f64::from(t)) {
                fired += 1;
            }
        }
        assert_eq!(fired, 2);
    }

    #[test]
    fn dropout_window_goes_silent() {
        assert!(pose_at(0.5).present);
        assert!(pose_at(10.0).present);
        assert!(!pose_at(15.0).present);
        let mut rng = rand::thread_rng();
        assert!(frame_at(15.0, 0.002, &mut rng).landmarks.is_empty());
    }

    #[test]
    fn scripted_frames_survive_the_wire() {
        let mut rng = rand::thread_rng();
        let frame = frame_at(1.0, 0.002, &mut rng);
        let line = serde_json::to_string(&frame).unwrap();
        let back: WireFrame = serde_json::from_str(&line).unwrap();
        assert!(back.to_landmarks().is_some());
    }
}
