//! The particle field: CPU-side simulation state plus the GPU resources the
//! displacement shader consumes.
//!
//! All per-particle motion is evaluated on the GPU; the CPU only advances a
//! handful of scalars per tick (time, explosion impulse, smoothed tension and
//! palm position) and rewrites the target lane of the instance buffer when
//! the shape changes. That keeps the per-frame upload to one small uniform.

use crate::camera::Camera;
use crate::shapes::{self, ShapeKind};
use glam::{Vec2, Vec3};
use handsig::HandState;
use rayon::prelude::*;
use wgpu::util::DeviceExt;

/// Trail copies per base particle. Copy j lags the noise field by j * 0.1
/// time units and fades with j.
pub const TRAIL_DEPTH: usize = 5;

/// Point sprite diameter multiplier, in pixels at view depth 1.
pub const POINT_SIZE_PX: f32 = 45.0;

/// Repulsion center parked far outside the field until the pointer moves.
pub const POINTER_PARKED: Vec3 = Vec3::new(999.0, 999.0, 0.0);

const TIME_STEP: f32 = 0.01;
const EXPLOSION_DECAY: f32 = 0.95;
const EXPLOSION_FLOOR: f32 = 0.01;
const TENSION_BLEND: f32 = 0.1;
const PALM_BLEND: f32 = 0.25;

/// Per-instance vertex data. Must match the instance inputs in
/// `particles.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct ParticleInstance {
    /// Undisplaced home position; rewritten in bulk on shape change.
    pub target: [f32; 3],
    /// Size factor, 0.5..1.5.
    pub scale: f32,
    /// 0 = leader, 1..TRAIL_DEPTH-1 = afterimages.
    pub trail_idx: f32,
    /// Per-particle jitter, each component in [-0.5, 0.5]. Also seeds the
    /// explosion direction and distance.
    pub randomness: [f32; 3],
}

/// Per-frame uniform data. Must match `FieldUniform` in `particles.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FieldUniformStd140 {
    pub view_proj: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub time: f32,
    pub pointer_pos: [f32; 3],
    pub tension: f32,
    pub hand_pos: [f32; 3],
    pub hand_active: f32,
    pub viewport: [f32; 2],
    pub explosion: f32,
    pub pixel_ratio: f32,
    pub trail_depth: f32,
    pub point_px: f32,
    pub _pad: [f32; 2],
}

// Compile-time safety check: buffer size must match the WGSL-reflected size.
const _: [(); 144] = [(); core::mem::size_of::<FieldUniformStd140>()];

/// The scalar state the animation loop advances each tick. Separate from the
/// GPU half so the motion rules are testable without a device.
#[derive(Debug, Clone)]
pub struct FieldState {
    pub time: f32,
    /// Scatter impulse, 1.0 on trigger, multiplicative decay afterwards.
    pub explosion: f32,
    /// Smoothed tension actually fed to the shader.
    pub tension: f32,
    /// Smoothed palm position in normalized [0,1] display coordinates.
    pub palm: Vec2,
}

impl FieldState {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            explosion: 0.0,
            tension: 0.0,
            palm: Vec2::splat(0.5),
        }
    }

    /// One animation tick.
    ///
    /// 1. Advance shader time by a fixed step (the motion design is tuned
    ///    per tick, not per wall-clock second).
    /// 2. Decay the explosion impulse, snapping to zero once negligible.
    /// 3. Ease tension toward the published value.
    /// 4. Ease the palm estimate toward the published position while a hand
    ///    is present; snap it when absent so reacquisition cannot drag the
    ///    repulsion center across the field.
    pub fn tick(&mut self, hand: &HandState) {
        self.time += TIME_STEP;

        if self.explosion > EXPLOSION_FLOOR {
            self.explosion *= EXPLOSION_DECAY;
        } else {
            self.explosion = 0.0;
        }

        self.tension += (hand.tension - self.tension) * TENSION_BLEND;

        if hand.present {
            self.palm += (hand.palm - self.palm) * PALM_BLEND;
        } else {
            self.palm = hand.palm;
        }
    }

    /// Fires the scatter. Not smoothed; the decay in `tick` shapes the tail.
    pub fn trigger_burst(&mut self) {
        self.explosion = 1.0;
    }
}

impl Default for FieldState {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU half: instance buffer, uniform buffer, bind group, plus the CPU-side
/// instance mirror used for target rewrites.
pub struct ParticleField {
    pub state: FieldState,
    pub shape: ShapeKind,
    base_count: usize,
    instances: Vec<ParticleInstance>,
    vtx: wgpu::Buffer,
    ubo: wgpu::Buffer,
    bind: wgpu::BindGroup,
}

impl ParticleField {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        base_count: usize,
        shape: ShapeKind,
    ) -> Self {
        let total = base_count * TRAIL_DEPTH;
        let mut instances: Vec<ParticleInstance> = (0..total)
            .map(|i| ParticleInstance {
                target: [0.0; 3],
                scale: 0.5 + rand::random::<f32>(),
                trail_idx: (i % TRAIL_DEPTH) as f32,
                randomness: [
                    rand::random::<f32>() - 0.5,
                    rand::random::<f32>() - 0.5,
                    rand::random::<f32>() - 0.5,
                ],
            })
            .collect();
        write_targets(&mut instances, &shapes::generate(shape, base_count));

        let vtx = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Instance VB"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Field Uniform Buffer"),
            size: std::mem::size_of::<FieldUniformStd140>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Field Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        log::info!(
            "Particle field ready: {} base x {} trail = {} instances, shape {:?}",
            base_count,
            TRAIL_DEPTH,
            total,
            shape
        );

        Self {
            state: FieldState::new(),
            shape,
            base_count,
            instances,
            vtx,
            ubo,
            bind,
        }
    }

    /// Swaps the active shape: resamples targets, rewrites the target lane
    /// of every instance, re-uploads the buffer. Positions jump; the
    /// displacement model masks the cut.
    pub fn set_shape(&mut self, queue: &wgpu::Queue, shape: ShapeKind) {
        if shape == self.shape {
            return;
        }
        let targets = shapes::generate(shape, self.base_count);
        write_targets(&mut self.instances, &targets);
        queue.write_buffer(&self.vtx, 0, bytemuck::cast_slice(&self.instances));
        self.shape = shape;
        log::info!("Shape -> {:?}", shape);
    }

    pub fn make_uniform(
        &self,
        camera: &Camera,
        viewport: [f32; 2],
        pixel_ratio: f32,
        pointer_world: Vec3,
        hand_world: Vec3,
        hand_active: bool,
        color: [f32; 3],
    ) -> FieldUniformStd140 {
        FieldUniformStd140 {
            view_proj: camera.view_proj().to_cols_array_2d(),
            color,
            time: self.state.time,
            pointer_pos: pointer_world.to_array(),
            tension: self.state.tension,
            hand_pos: hand_world.to_array(),
            hand_active: if hand_active { 1.0 } else { 0.0 },
            viewport,
            explosion: self.state.explosion,
            pixel_ratio,
            trail_depth: TRAIL_DEPTH as f32,
            point_px: POINT_SIZE_PX,
            _pad: [0.0; 2],
        }
    }

    pub fn upload_uniform(&self, queue: &wgpu::Queue, uniform: &FieldUniformStd140) {
        queue.write_buffer(&self.ubo, 0, bytemuck::bytes_of(uniform));
    }

    #[inline]
    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vtx
    }

    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind
    }

    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }
}

/// Copies each base target into its trail copies. Instance idx / TRAIL_DEPTH
/// is the base particle, idx % TRAIL_DEPTH its trail position.
fn write_targets(instances: &mut [ParticleInstance], targets: &[Vec3]) {
    instances
        .par_iter_mut()
        .enumerate()
        .for_each(|(idx, inst)| {
            inst.target = targets[idx / TRAIL_DEPTH].to_array();
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use handsig::{GestureFrame, HandChannel, ReleaseDetector};

    fn present(tension: f32) -> HandState {
        HandState {
            tension,
            present: true,
            palm: Vec2::new(0.3, 0.6),
            cursor: Vec2::splat(0.5),
            cursor_px: Vec2::ZERO,
            pinching: false,
        }
    }

    #[test]
    fn explosion_decays_geometrically() {
        let mut state = FieldState::new();
        state.trigger_burst();
        assert_eq!(state.explosion, 1.0);

        let hand = present(0.0);
        let mut prev = state.explosion;
        for k in 1..=20 {
            state.tick(&hand);
            let expected = 0.95f32.powi(k);
            assert!((state.explosion - expected).abs() < 1e-5, "k={k}");
            assert!(state.explosion < prev);
            prev = state.explosion;
        }
    }

    #[test]
    fn explosion_floors_to_zero() {
        let mut state = FieldState::new();
        state.trigger_burst();
        let hand = present(0.0);
        // 0.95^k drops below the floor well inside 120 ticks.
        for _ in 0..120 {
            state.tick(&hand);
        }
        assert_eq!(state.explosion, 0.0);
    }

    #[test]
    fn tension_eases_toward_published_value() {
        let mut state = FieldState::new();
        let hand = present(1.0);
        state.tick(&hand);
        assert!((state.tension - 0.1).abs() < 1e-6);
        for _ in 0..200 {
            state.tick(&hand);
        }
        assert!((state.tension - 1.0).abs() < 1e-3);
    }

    #[test]
    fn palm_smooths_when_present_and_snaps_when_absent() {
        let mut state = FieldState::new();
        let hand = present(0.5);
        state.tick(&hand);
        // One tick moves a quarter of the way from (0.5, 0.5).
        assert!((state.palm.x - 0.45).abs() < 1e-6);
        assert!((state.palm.y - 0.525).abs() < 1e-6);

        let mut gone = hand;
        gone.present = false;
        gone.palm = Vec2::splat(0.5);
        state.tick(&gone);
        assert_eq!(state.palm, Vec2::splat(0.5));
    }

    /// One processed frame: publish, detect, tick. Mirrors the order the
    /// application runs per display frame.
    fn step(
        chan: &mut HandChannel,
        det: &mut ReleaseDetector,
        state: &mut FieldState,
        frame: GestureFrame,
        now: f64,
    ) -> bool {
        chan.publish(&frame, Vec2::new(640.0, 480.0));
        let fired = frame.present && det.update(frame.tension, now);
        if fired {
            state.trigger_burst();
        }
        let snapshot = chan.state();
        state.tick(&snapshot);
        fired
    }

    #[test]
    fn release_gesture_drives_exactly_one_burst() {
        // Absent -> present clenched -> released, all through the real
        // channel and detector.
        let mut chan = HandChannel::new();
        let mut det = ReleaseDetector::new();
        let mut state = FieldState::new();

        assert!(!step(&mut chan, &mut det, &mut state, GestureFrame::absent(), 0.0));

        let mut clenched = GestureFrame::absent();
        clenched.present = true;
        clenched.tension = 0.9;
        assert!(!step(&mut chan, &mut det, &mut state, clenched, 0.1));

        let mut open = clenched;
        open.tension = 0.3;
        assert!(step(&mut chan, &mut det, &mut state, open, 0.4));
        // Triggered this frame, so one decay step has already run.
        assert!((state.explosion - 0.95).abs() < 1e-6);

        // Repeating the open hand inside the cooldown adds nothing.
        assert!(!step(&mut chan, &mut det, &mut state, open, 0.5));
        assert!(state.explosion < 0.95);
    }

    #[test]
    fn trail_indices_interleave() {
        let mut instances: Vec<ParticleInstance> = (0..10)
            .map(|i| ParticleInstance {
                target: [0.0; 3],
                scale: 1.0,
                trail_idx: (i % TRAIL_DEPTH) as f32,
                randomness: [0.0; 3],
            })
            .collect();
        let targets = vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)];
        write_targets(&mut instances, &targets);
        // First five copies share base 0, next five base 1.
        for inst in &instances[..TRAIL_DEPTH] {
            assert_eq!(inst.target, [1.0, 0.0, 0.0]);
        }
        for inst in &instances[TRAIL_DEPTH..] {
            assert_eq!(inst.target, [0.0, 2.0, 0.0]);
        }
        assert_eq!(instances[3].trail_idx, 3.0);
        assert_eq!(instances[7].trail_idx, 2.0);
    }
}
