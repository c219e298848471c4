//! Triangle primitive.
//!
//! Uses the Moller-Trumbore algorithm for ray intersection.

use ember_math::Vec3;

/// Epsilon below which the intersection determinant is treated as a
/// parallel ray.
const PARALLEL_EPSILON: f32 = 1e-7;

/// A triangle with a precomputed unit face normal.
///
/// Vertices wind counter-clockwise with respect to the normal
/// (right-hand rule over v0->v1, v0->v2).
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub normal: Vec3,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let u = v1 - v0;
        let v = v2 - v0;
        Self {
            v0,
            v1,
            v2,
            normal: u.cross(v).normalize(),
        }
    }

    /// Moller-Trumbore ray intersection. Returns the hit distance, or
    /// `None` for a miss or a near-parallel ray.
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < PARALLEL_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        (t > PARALLEL_EPSILON).then_some(t)
    }

    /// Surface area.
    pub fn area(&self) -> f32 {
        let u = self.v1 - self.v0;
        let v = self.v2 - self.v0;
        u.cross(v).length() / 2.0
    }
}
