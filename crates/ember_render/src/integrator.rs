//! Recursive path integrator.
//!
//! One call to [`Integrator::trace`] produces a single radiance sample
//! for a camera ray: direct lighting is estimated explicitly at every
//! diffuse bounce (next-event estimation) while the indirect part follows
//! one hemisphere sample, with Russian roulette keeping the recursion
//! honest.

use crate::sampling::{reflect, uniform_hemisphere};
use ember_core::rng::gen_f64;
use ember_core::{Material, Scene, SurfaceKind};
use ember_math::{Color, Ray, Vec3, INTERSECTION_EPSILON};
use rand::RngCore;
use std::f64::consts::TAU;

/// Path tracer over a prepared scene.
pub struct Integrator<'a> {
    scene: &'a Scene,
    light_subsamples: u32,
}

impl<'a> Integrator<'a> {
    pub fn new(scene: &'a Scene, light_subsamples: u32) -> Self {
        Self {
            scene,
            light_subsamples,
        }
    }

    /// Surface albedo of the first hit, or the background. No lighting,
    /// no recursion; used for fast previews.
    pub fn trace_unlit(&self, ray: &Ray) -> Color {
        let hit = self.scene.intersect(ray);
        match hit.object {
            Some(id) => self.scene.object(id).material.albedo,
            None => self.scene.background,
        }
    }

    /// Radiance along `ray`, estimated with one path sample.
    ///
    /// `importance` is the throughput accumulated by the ancestors of
    /// this ray; top-level callers pass `Color::ONE`.
    pub fn trace(
        &self,
        ray: &Ray,
        rng: &mut dyn RngCore,
        depth: u32,
        mut importance: Color,
    ) -> Color {
        let hit = self.scene.intersect(ray);
        let Some(id) = hit.object else {
            return importance * self.scene.background;
        };

        let object = self.scene.object(id);
        let surface = object.material;
        let mut point = ray.at(hit.distance);
        let normal = object.normal_at(point, hit.element_index);

        // Lights terminate paths: their emission stands in for all the
        // transport behind them. The depth floor terminates everything
        // else.
        if depth == 0 || object.is_light() {
            return importance * surface.emission;
        }

        match surface.kind {
            SurfaceKind::Diffuse => {
                point += normal * INTERSECTION_EPSILON;

                let direct = self.direct_light(point, normal, rng);

                let bounced = Ray::new(point, uniform_hemisphere(normal, rng));
                let hemisphere_pdf = 1.0 / TAU;
                let brdf = surface.brdf(ray.direction, bounced.direction, normal);
                importance = importance * surface.albedo * (brdf / hemisphere_pdf);

                // Russian roulette on the strongest channel.
                let p = importance.max_element();
                if p <= 0.0 || gen_f64(rng) > p {
                    return importance * surface.emission;
                }
                importance /= p;

                let indirect = self.trace(&bounced, rng, depth - 1, importance);
                importance * (surface.emission + direct + indirect)
            }
            SurfaceKind::Specular => {
                point += normal * INTERSECTION_EPSILON;
                let reflected = Ray::new(point, reflect(ray.direction, normal));
                surface.emission + self.trace(&reflected, rng, depth - 1, importance)
            }
            SurfaceKind::Refractive => {
                self.trace_refractive(ray, rng, depth, importance, point, normal, &surface)
            }
        }
    }

    /// Dielectric branch: Schlick-weighted reflection and refraction.
    #[allow(clippy::too_many_arguments)]
    fn trace_refractive(
        &self,
        ray: &Ray,
        rng: &mut dyn RngCore,
        depth: u32,
        importance: Color,
        point: Vec3,
        mut normal: Vec3,
        surface: &Material,
    ) -> Color {
        let incident = ray.direction;
        let mut n1 = 1.0_f32; // air
        let mut n2 = surface.refractive_index;

        // Flip everything when the ray is leaving the material.
        if normal.dot(incident) >= 0.0 {
            normal = -normal;
            std::mem::swap(&mut n1, &mut n2);
        }
        let offset = normal * INTERSECTION_EPSILON;
        let eta = n1 / n2;

        let cos_i = incident.dot(normal);
        let cos2_t = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
        if cos2_t < 0.0 {
            // Total internal reflection.
            let reflected = Ray::new(point + offset, reflect(incident, normal));
            return importance
                * (surface.emission + self.trace(&reflected, rng, depth - 1, importance));
        }

        let transmitted = incident * eta - normal * (cos_i * eta + cos2_t.sqrt());
        let (reflectance, transmittance) = schlick_split(n1, n2, cos_i);

        let reflected = Ray::new(point + offset, reflect(incident, normal));
        let refracted = Ray::new(point - offset, transmitted);

        if gen_f64(rng) < importance.max_element() {
            // A strong path is worth following down both branches.
            self.trace(&reflected, rng, depth - 1, importance * reflectance)
                + self.trace(&refracted, rng, depth - 1, importance * transmittance)
        } else {
            // Weak path: pick one branch, reweighted to stay unbiased.
            let p = 0.25 + 0.5 * reflectance;
            if gen_f64(rng) < p {
                self.trace(&reflected, rng, depth - 1, importance * (reflectance / p))
            } else {
                self.trace(
                    &refracted,
                    rng,
                    depth - 1,
                    importance * (transmittance / (1.0 - p)),
                )
            }
        }
    }

    /// Direct contribution of every area light at a diffuse hit.
    ///
    /// Each light is sampled `light_subsamples` times; a sample counts
    /// when the shadow ray escapes or reaches the light itself. The
    /// squared distance is clamped to 1 below, preserving the brightness
    /// behavior close surfaces were tuned against.
    fn direct_light(&self, point: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Color {
        let mut total = Color::ZERO;

        for &light_id in self.scene.lights() {
            let light = self.scene.object(light_id);
            if light.area <= 0.0 {
                // Delta lights have no surface to sample.
                continue;
            }

            let mut sub_samples = 0.0_f64;
            for _ in 0..self.light_subsamples {
                let light_point = light.sample_point(rng);
                let to_light = light_point - point;
                let distance_sq = to_light.length_squared().max(1.0);
                let direction = to_light.normalize();

                let shadow = Ray::new(point, direction);
                let hit = self.scene.intersect(&shadow);
                if !hit.is_hit() || hit.object == Some(light_id) {
                    let surface_dot = normal.dot(direction).max(0.0);
                    let light_normal = light.normal_at(light_point, 0);
                    let light_dot = light_normal.dot(-direction).max(0.0);
                    sub_samples += (surface_dot * light_dot / distance_sq) as f64;
                }
            }

            // pdf of a uniform surface sample is 1 / area.
            total += light.material.emission
                * light.area as f64
                * (sub_samples / self.light_subsamples as f64);
        }

        total
    }
}

/// Schlick's approximation. Returns `(R, 1 - R)`.
fn schlick_split(n1: f32, n2: f32, cos_i: f32) -> (f64, f64) {
    let r0 = ((n2 - n1) / (n2 + n1)) as f64;
    let r0 = r0 * r0;
    let c = (1.0 + cos_i) as f64; // cos_i is negative entering the surface
    let r = r0 + (1.0 - r0) * c.powi(5);
    (r, 1.0 - r)
}
