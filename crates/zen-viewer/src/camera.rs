//! Drifting perspective camera.
//!
//! The camera hovers in front of the field at z = 8, always looking at the
//! origin, and eases toward a composition target built from the pointer
//! position plus a slow ambient wander. Interaction points (pointer, palm)
//! are unprojected onto the z = 0 plane the shapes are modeled around.

use glam::{Mat4, Vec2, Vec3};

const FOV_Y_DEG: f32 = 75.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;

/// Ease factor per tick toward the drift target.
const DRIFT_BLEND: f32 = 0.05;

pub struct Camera {
    pub position: Vec3,
    pub proj: Mat4,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 8.0),
            // WebGPU/wgpu uses 0..1 depth; glam::Mat4::perspective_rh is RH, depth in [0,1].
            proj: Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect.max(1e-3), Z_NEAR, Z_FAR),
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.proj = Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect.max(1e-3), Z_NEAR, Z_FAR);
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y)
    }

    #[inline]
    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view()
    }

    /// One tick of composition drift: parallax toward the pointer plus a
    /// slow sinusoidal wander, eased so the motion never snaps.
    pub fn drift(&mut self, pointer_ndc: Vec2, time: f32) {
        let target_x = pointer_ndc.x * 2.0 + (time * 0.2).sin() * 0.5;
        let target_y = pointer_ndc.y * 2.0 + (time * 0.3).cos() * 0.5;
        self.position.x += (target_x - self.position.x) * DRIFT_BLEND;
        self.position.y += (target_y - self.position.y) * DRIFT_BLEND;
    }

    /// Casts the normalized-device xy through the current view onto the
    /// z = 0 plane and returns the world-space hit.
    pub fn unproject_to_plane(&self, ndc: Vec2) -> Vec3 {
        let inv = self.view_proj().inverse();
        // Two depths of the wgpu clip cube give the ray.
        let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let dir = (far - near).normalize_or_zero();
        if dir.z.abs() < 1e-6 {
            // Ray parallel to the plane; the near point is the best answer.
            return near;
        }
        let t = -near.z / dir.z;
        near + dir * t
    }
}
