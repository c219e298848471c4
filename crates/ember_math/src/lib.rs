// Re-export glam for convenience
pub use glam::*;

// Ember math types
mod aabb;
mod ray;

pub use aabb::Aabb;
pub use ray::Ray;

/// Linear radiance triple. Kept in f64 so long accumulation runs do not
/// drift; never clamped inside the core.
pub type Color = DVec3;

/// Offset applied by the integrator when spawning secondary rays, to keep
/// them from re-hitting the surface they left.
pub const INTERSECTION_EPSILON: f32 = f32::EPSILON * 20.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_is_f64() {
        let c = Color::new(0.1, 0.2, 0.3);
        assert_eq!(c.x, 0.1f64);
        assert_eq!(c + c, Color::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0);
    }
}
