//! Procedural point-cloud targets for the particle field.
//!
//! Each generator returns exactly `count` model-space points centered on the
//! origin, sized for the camera at z = 8. Silhouettes are deterministic;
//! the detail inside them is independently sampled per call, so regenerating
//! a shape re-rolls its texture.

use glam::Vec3;
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Sphere,
    Heart,
    Plane,
    Saturn,
    Buddha,
    Fireworks,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Sphere,
        ShapeKind::Heart,
        ShapeKind::Plane,
        ShapeKind::Saturn,
        ShapeKind::Buddha,
        ShapeKind::Fireworks,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Heart => "Heart",
            ShapeKind::Plane => "Plane",
            ShapeKind::Saturn => "Saturn",
            ShapeKind::Buddha => "Buddha",
            ShapeKind::Fireworks => "Fireworks",
        }
    }
}

impl Default for ShapeKind {
    fn default() -> Self {
        ShapeKind::Sphere
    }
}

pub fn generate(kind: ShapeKind, count: usize) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let p = match kind {
            ShapeKind::Sphere => sphere_surface(2.5),
            ShapeKind::Heart => heart(),
            ShapeKind::Plane => plane(),
            ShapeKind::Saturn => saturn(i as f32 / count as f32),
            ShapeKind::Buddha => buddha(),
            ShapeKind::Fireworks => fireworks(),
        };
        points.push(p);
    }
    points
}

#[inline]
fn rng() -> f32 {
    rand::random::<f32>()
}

/// Uniform point on a sphere of the given radius.
fn sphere_surface(radius: f32) -> Vec3 {
    let theta = rng() * PI * 2.0;
    let phi = (2.0 * rng() - 1.0).acos();
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}

/// Classic parametric heart curve with depth jitter for volume.
fn heart() -> Vec3 {
    let t = rng() * PI * 2.0;
    let x = 16.0 * t.sin().powi(3);
    let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
    let depth = (rng() - 0.5) * 10.0;
    let scale = 0.15;
    Vec3::new(x * scale, y * scale, depth * scale)
}

/// Stylized airplane: 50% fuselage, 30% wings, 20% tail.
fn plane() -> Vec3 {
    let r = rng();
    if r < 0.5 {
        // Fuselage: a cylinder along z, tapering toward the ends.
        let len = (rng() - 0.5) * 5.0;
        let radius = 0.5 * (1.0 - len.abs() / 5.0) + 0.1;
        let angle = rng() * PI * 2.0;
        Vec3::new(radius * angle.cos(), radius * angle.sin(), len)
    } else if r < 0.8 {
        // Main wings, swept back the further out they reach.
        let span = (rng() - 0.5) * 6.0;
        let z_offset = span.abs() * 0.5 - 0.5;
        let thickness = (rng() - 0.5) * 0.2;
        Vec3::new(span, thickness, z_offset + rng() * 0.5)
    } else {
        // Tail section, split between the two stabilizers.
        let tail_z = 2.0 + rng();
        if rng() > 0.5 {
            let h = rng() * 1.5;
            let w = (rng() - 0.5) * 0.2;
            Vec3::new(w, h, tail_z + h * 0.5)
        } else {
            let w = (rng() - 0.5) * 2.5;
            let h = (rng() - 0.5) * 0.1;
            Vec3::new(w, h, tail_z + w.abs() * 0.5)
        }
    }
}

/// Planet plus tilted ring. The split is by index so the 40/60 ratio is
/// exact regardless of sampling.
fn saturn(ratio: f32) -> Vec3 {
    if ratio < 0.4 {
        sphere_surface(1.5)
    } else {
        let angle = rng() * PI * 2.0;
        let (min_r, max_r) = (2.0f32, 4.5f32);
        // Area-correct annulus sampling, so the ring has even density.
        let r = (rng() * (max_r * max_r - min_r * min_r) + min_r * min_r).sqrt();
        let x = r * angle.cos();
        let z = r * angle.sin();
        let y = (rng() - 0.5) * 0.1;
        // Tilt the disk 30 degrees about x.
        let tilt = PI / 6.0;
        Vec3::new(
            x,
            y * tilt.cos() - z * tilt.sin(),
            y * tilt.sin() + z * tilt.cos(),
        )
    }
}

/// Abstract seated figure: head sphere, torso ellipsoid, base ring.
fn buddha() -> Vec3 {
    let r = rng();
    if r < 0.2 {
        sphere_surface(0.8) + Vec3::new(0.0, 1.8, 0.0)
    } else if r < 0.7 {
        let (rad_x, rad_y) = (1.5f32, 1.6f32);
        let theta = rng() * PI * 2.0;
        let phi = (2.0 * rng() - 1.0).acos();
        Vec3::new(
            rad_x * phi.sin() * theta.cos(),
            rad_y * phi.sin() * theta.sin() - 0.2,
            rad_x * phi.cos(),
        )
    } else {
        let angle = rng() * PI * 2.0;
        let dist = 1.0 + rng() * 1.5;
        Vec3::new(
            dist * angle.cos(),
            -1.8 + (rng() - 0.5) * 0.5,
            dist * angle.sin(),
        )
    }
}

/// Burst volume: quadratic radial falloff packs the center and leaves
/// sparse outliers.
fn fireworks() -> Vec3 {
    let dir = sphere_surface(1.0);
    dir * (rng().powi(2) * 4.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_returns_exactly_count_points() {
        for kind in ShapeKind::ALL {
            assert_eq!(generate(kind, 0).len(), 0);
            assert_eq!(generate(kind, 1).len(), 1);
            assert_eq!(generate(kind, 1337).len(), 1337, "{kind:?}");
        }
    }

    #[test]
    fn sphere_points_sit_on_the_surface() {
        for p in generate(ShapeKind::Sphere, 500) {
            assert!((p.length() - 2.5).abs() < 1e-3, "{p:?}");
        }
    }

    #[test]
    fn saturn_partitions_core_and_ring() {
        let count = 1000;
        let points = generate(ShapeKind::Saturn, count);
        // Core samples sit at radius 1.5; ring samples start at radial 2.0,
        // so a 1.75 split classifies them cleanly.
        let core = points.iter().filter(|p| p.length() < 1.75).count();
        assert_eq!(core, count * 2 / 5);
        // Rotation preserves distance, so ring radii survive the tilt.
        for p in &points[count * 2 / 5..] {
            assert!((1.95..=4.55).contains(&p.length()), "{p:?}");
        }
    }

    #[test]
    fn heart_stays_inside_its_parametric_bounds() {
        for p in generate(ShapeKind::Heart, 1000) {
            assert!(p.x.abs() <= 16.0 * 0.15 + 1e-3);
            assert!(p.y <= 12.0 * 0.15 + 1e-3 && p.y >= -17.0 * 0.15 - 1e-3);
            assert!(p.z.abs() <= 0.75 + 1e-3);
        }
    }

    #[test]
    fn fireworks_concentrate_toward_the_center() {
        let mut radii: Vec<f32> = generate(ShapeKind::Fireworks, 2000)
            .iter()
            .map(|p| p.length())
            .collect();
        radii.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let median = radii[radii.len() / 2];
        // Quadratic falloff puts the median near 4.5 / 4.
        assert!(median < 1.6, "median {median}");
        assert!(*radii.last().unwrap() <= 4.5 + 1e-3);
    }
}
