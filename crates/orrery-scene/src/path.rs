//! Procedural orbit path geometry.

use glam::Vec3;

/// Samples per loop used when no other count is configured. Also the floor.
pub const DEFAULT_SEGMENTS: u32 = 100;

/// A closed, immutable loop of points tracing an orbital plane.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitPath {
    radius: f32,
    inclination_deg: f32,
    points: Vec<Vec3>,
}

impl OrbitPath {
    /// Sample `segments + 1` points at `theta = 2 pi i / segments`.
    ///
    /// Point `i` is `(r cos theta, r sin theta sin(incl), r sin theta)`. The last
    /// point is an exact copy of the first so the loop closes bit-for-bit.
    /// Segment counts below [`DEFAULT_SEGMENTS`] are raised to it.
    pub fn generate(radius: f32, inclination_deg: f32, segments: u32) -> Self {
        let segments = segments.max(DEFAULT_SEGMENTS);
        let tilt = inclination_deg.to_radians().sin();
        let mut points = Vec::with_capacity(segments as usize + 1);
        for i in 0..segments {
            let theta = std::f32::consts::TAU * i as f32 / segments as f32;
            let (sin, cos) = theta.sin_cos();
            points.push(Vec3::new(radius * cos, radius * sin * tilt, radius * sin));
        }
        points.push(points[0]);
        Self {
            radius,
            inclination_deg,
            points,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn inclination_deg(&self) -> f32 {
        self.inclination_deg
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn segments(&self) -> usize {
        self.points.len() - 1
    }
}
