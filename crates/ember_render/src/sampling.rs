//! Direction sampling helpers for the integrator.

use ember_core::rng::gen_f32;
use ember_math::Vec3;
use rand::RngCore;
use std::f32::consts::TAU;

/// Mirror `d` about the unit normal `n`.
#[inline]
pub fn reflect(d: Vec3, n: Vec3) -> Vec3 {
    d - 2.0 * d.dot(n) * n
}

/// Uniform direction on the hemisphere around `normal`.
///
/// `cos(theta)` is drawn uniformly from `[0, 1)`, which is the uniform
/// solid-angle distribution; the matching pdf is `1 / (2 pi)`.
pub fn uniform_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    // Orthonormal basis with the normal as the y axis.
    let ny = normal;
    let nx = if ny.x.abs() > ny.y.abs() {
        Vec3::new(ny.z, 0.0, -ny.x)
    } else {
        Vec3::new(0.0, -ny.z, ny.y)
    }
    .normalize();
    let nz = ny.cross(nx).normalize();

    let cos_theta = gen_f32(rng);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi = TAU * gen_f32(rng);

    let local = Vec3::new(sin_theta * phi.cos(), cos_theta, sin_theta * phi.sin());
    local.x * nx + local.y * ny + local.z * nz
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::Xorshift128Plus;

    #[test]
    fn test_reflect_is_involutive() {
        let n = Vec3::new(0.3, 0.9, -0.1).normalize();
        let d = Vec3::new(0.5, -0.7, 0.2).normalize();
        let twice = reflect(reflect(d, n), n);
        assert!((twice - d).length() < 1e-6);
    }

    #[test]
    fn test_reflect_mirrors_about_normal() {
        let reflected = reflect(Vec3::new(1.0, -1.0, 0.0).normalize(), Vec3::Y);
        assert!((reflected - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn test_hemisphere_samples_stay_above_surface() {
        let normal = Vec3::new(0.2, 0.8, 0.5).normalize();
        let mut rng = Xorshift128Plus::new(21);
        for _ in 0..1_000 {
            let dir = uniform_hemisphere(normal, &mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-4);
            assert!(dir.dot(normal) >= 0.0);
        }
    }

    #[test]
    fn test_hemisphere_mean_aligns_with_normal() {
        // The sample mean of a uniform hemisphere is normal / 2.
        let normal = Vec3::Y;
        let mut rng = Xorshift128Plus::new(5);
        let n = 20_000;
        let mut sum = Vec3::ZERO;
        for _ in 0..n {
            sum += uniform_hemisphere(normal, &mut rng);
        }
        let mean = sum / n as f32;
        assert!(mean.x.abs() < 0.02);
        assert!(mean.z.abs() < 0.02);
        assert!((mean.y - 0.5).abs() < 0.02);
    }
}
