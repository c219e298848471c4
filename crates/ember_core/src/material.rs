//! Surface material model.

use ember_math::{Color, Vec3};
use std::f64::consts::PI;

/// How a surface responds to an incoming ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Matte reflector, shaded with next-event estimation plus a
    /// hemisphere bounce.
    Diffuse,
    /// Perfect mirror.
    Specular,
    /// Dielectric with Fresnel-weighted reflection and refraction.
    Refractive,
}

/// Sub-model used by the diffuse branch when evaluating the BRDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffuseModel {
    Lambertian,
    OrenNayar,
}

/// Material carried by every scene object.
///
/// Any positive emission channel marks the object as a light source.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub kind: SurfaceKind,
    pub diffuse_model: DiffuseModel,
    /// Surface color, each channel in `[0, 1]`.
    pub albedo: Color,
    /// Emitted radiance, each channel in `[0, inf)`.
    pub emission: Color,
    /// Gray reflectance factor applied by the BRDF.
    pub albedo_scale: f32,
    /// Oren-Nayar roughness sigma in `[0, 1]`.
    pub roughness: f32,
    /// Index of refraction (1.31 ice, 1.52 window glass, 2.417 diamond).
    pub refractive_index: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: SurfaceKind::Diffuse,
            diffuse_model: DiffuseModel::Lambertian,
            albedo: Color::ONE,
            emission: Color::ZERO,
            albedo_scale: 1.0,
            roughness: 1.0,
            refractive_index: 1.52,
        }
    }
}

impl Material {
    /// Lambertian diffuse surface with the given albedo.
    pub fn diffuse(albedo: Color) -> Self {
        Self {
            albedo,
            ..Default::default()
        }
    }

    /// Oren-Nayar diffuse surface.
    pub fn oren_nayar(albedo: Color, roughness: f32) -> Self {
        Self {
            albedo,
            diffuse_model: DiffuseModel::OrenNayar,
            roughness,
            ..Default::default()
        }
    }

    /// Perfect mirror.
    pub fn specular(albedo: Color) -> Self {
        Self {
            kind: SurfaceKind::Specular,
            albedo,
            ..Default::default()
        }
    }

    /// Dielectric surface.
    pub fn refractive(albedo: Color, refractive_index: f32) -> Self {
        Self {
            kind: SurfaceKind::Refractive,
            albedo,
            refractive_index,
            ..Default::default()
        }
    }

    /// Emissive surface (a light). `albedo` doubles as the surface color
    /// when the light is viewed directly in unlit mode.
    pub fn emissive(emission: Color) -> Self {
        Self {
            albedo: emission.clamp(Color::ZERO, Color::ONE),
            emission,
            ..Default::default()
        }
    }

    /// True when any emission channel is positive.
    #[inline]
    pub fn is_light(&self) -> bool {
        self.emission.x > 0.0 || self.emission.y > 0.0 || self.emission.z > 0.0
    }

    /// Scalar (gray) diffuse reflectance for the incident/outgoing pair.
    ///
    /// Lambertian: `albedo_scale / pi`. Oren-Nayar: the A/B approximation
    /// with sigma = roughness, reduced to Lambertian at sigma = 0.
    pub fn brdf(&self, incident: Vec3, outgoing: Vec3, normal: Vec3) -> f64 {
        let lambert = self.albedo_scale as f64 / PI;
        match self.diffuse_model {
            DiffuseModel::Lambertian => lambert,
            DiffuseModel::OrenNayar => {
                let sigma2 = (self.roughness * self.roughness) as f64;
                let a = 1.0 - 0.5 * sigma2 / (sigma2 + 0.57);
                let b = 0.45 * sigma2 / (sigma2 + 0.09);

                let cos_in = incident.dot(normal).clamp(-1.0, 1.0) as f64;
                let cos_out = outgoing.dot(normal).clamp(-1.0, 1.0) as f64;
                let cos_in_out = incident.dot(outgoing).max(0.0) as f64;

                let theta_in = cos_in.acos();
                let theta_out = cos_out.acos();
                let alpha = theta_out.max(theta_in);
                let beta = theta_out.min(theta_in);

                lambert * (a + b * cos_in_out * alpha.sin() * beta.tan())
            }
        }
    }
}
