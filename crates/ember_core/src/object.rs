//! Scene objects: spheres, triangle meshes, light quads and boxes behind
//! one uniform handle.
//!
//! Objects are owned by the scene in a single vector and referenced by
//! index everywhere else (octree, light cache, hit records).

use crate::material::Material;
use crate::rng::gen_f32;
use crate::triangle::Triangle;
use ember_math::{Aabb, Vec2, Vec3, INTERSECTION_EPSILON};
use rand::RngCore;
use std::f32::consts::{PI, TAU};

/// Index of an object inside its owning scene.
pub type ObjectId = usize;

/// Result of a ray-vs-scene query. `object == None` means a miss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub object: Option<ObjectId>,
    /// Triangle index for mesh-backed shapes, 0 otherwise.
    pub element_index: u32,
    pub distance: f32,
}

impl HitRecord {
    /// A miss, with the distance primed for nearest-hit comparisons.
    pub fn miss() -> Self {
        Self {
            object: None,
            element_index: 0,
            distance: f32::INFINITY,
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.object.is_some()
    }
}

/// A triangle list with helpers for building quads.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    pub triangles: Vec<Triangle>,
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from raw vertex triples, as returned by a triangle
    /// source collaborator.
    pub fn from_triangles(triangles: impl IntoIterator<Item = (Vec3, Vec3, Vec3)>) -> Self {
        Self {
            triangles: triangles
                .into_iter()
                .map(|(v0, v1, v2)| Triangle::new(v0, v1, v2))
                .collect(),
        }
    }

    /// Add a quad as two triangles. The points must wind counter-clockwise
    /// with respect to the desired normal.
    pub fn add_quad(&mut self, p1: Vec3, p2: Vec3, p3: Vec3, p4: Vec3) {
        self.triangles.push(Triangle::new(p1, p2, p3));
        self.triangles.push(Triangle::new(p3, p4, p1));
    }

    /// Nearest triangle hit as `(triangle index, distance)`.
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<(u32, f32)> {
        let mut nearest: Option<(u32, f32)> = None;
        for (index, triangle) in self.triangles.iter().enumerate() {
            if let Some(distance) = triangle.intersect(origin, direction) {
                if nearest.map_or(true, |(_, best)| distance < best) {
                    nearest = Some((index as u32, distance));
                }
            }
        }
        nearest
    }

    /// Total surface area.
    pub fn area(&self) -> f32 {
        self.triangles.iter().map(Triangle::area).sum()
    }

    /// Bounds over every vertex.
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::ZERO;
        for triangle in &self.triangles {
            aabb.encapsulate_point(triangle.v0);
            aabb.encapsulate_point(triangle.v1);
            aabb.encapsulate_point(triangle.v2);
        }
        aabb
    }
}

/// Geometry variant of a scene object.
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere {
        radius: f32,
    },
    Mesh(TriangleMesh),
    /// Rectangular area light. `x_vec`/`y_vec` are half-extent vectors in
    /// the quad plane, used by the surface sampler.
    LightQuad {
        normal: Vec3,
        x_vec: Vec3,
        y_vec: Vec3,
        mesh: TriangleMesh,
    },
    Box(TriangleMesh),
}

/// A positioned, material-carrying object in the scene.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub position: Vec3,
    pub material: Material,
    /// Surface area; the direct-light estimator divides by this (pdf of a
    /// uniform surface sample is `1 / area`).
    pub area: f32,
    pub aabb: Aabb,
    shape: Shape,
}

impl SceneObject {
    /// Sphere of the given radius. A zero radius gives a point light that
    /// rays cannot hit.
    pub fn sphere(position: Vec3, radius: f32, material: Material) -> Self {
        let mut object = Self {
            position,
            material,
            area: 4.0 * PI * radius * radius,
            aabb: Aabb::ZERO,
            shape: Shape::Sphere { radius },
        };
        object.update_aabb();
        object
    }

    /// Triangle mesh. Triangles are in world space; `position` is kept
    /// only as the object's nominal anchor.
    pub fn mesh(position: Vec3, mesh: TriangleMesh, material: Material) -> Self {
        let area = mesh.area();
        let mut object = Self {
            position,
            material,
            area,
            aabb: Aabb::ZERO,
            shape: Shape::Mesh(mesh),
        };
        object.update_aabb();
        object
    }

    /// Rectangular area light facing `direction`, spanned from `side`.
    ///
    /// The quad center is nudged along its normal so the emitting face
    /// never self-shadows against the surface it is mounted on.
    pub fn light_quad(
        center: Vec3,
        direction: Vec3,
        side: Vec3,
        dimensions: Vec2,
        material: Material,
    ) -> Self {
        let normal = direction.normalize();
        let y_vec = side.normalize().cross(normal).normalize();
        let x_vec = y_vec.cross(normal).normalize();

        let x_vec = x_vec * dimensions.x / 2.0;
        let y_vec = y_vec * dimensions.y / 2.0;

        let mut mesh = TriangleMesh::new();
        mesh.add_quad(
            center - x_vec - y_vec,
            center - x_vec + y_vec,
            center + x_vec + y_vec,
            center + x_vec - y_vec,
        );

        let mut object = Self {
            position: center + normal * INTERSECTION_EPSILON,
            material,
            area: dimensions.x * dimensions.y,
            aabb: Aabb::ZERO,
            shape: Shape::LightQuad {
                normal,
                x_vec,
                y_vec,
                mesh,
            },
        };
        object.update_aabb();
        object
    }

    /// Axis-frame box standing on `base`, extruded along `up`.
    pub fn cuboid(
        base: Vec3,
        up: Vec3,
        side: Vec3,
        width: f32,
        depth: f32,
        height: f32,
        material: Material,
    ) -> Self {
        let up = up.normalize();
        let side = side.normalize();

        let local_y = up;
        let local_z = side.cross(local_y);
        let local_x = local_y.cross(local_z);

        let half_width = width / 2.0;
        let half_depth = depth / 2.0;

        let b1 = base + local_x * half_width + local_z * half_depth;
        let b2 = base + local_x * half_width - local_z * half_depth;
        let b3 = base - local_x * half_width - local_z * half_depth;
        let b4 = base - local_x * half_width + local_z * half_depth;

        let t1 = b1 + up * height;
        let t2 = b2 + up * height;
        let t3 = b3 + up * height;
        let t4 = b4 + up * height;

        let mut mesh = TriangleMesh::new();
        mesh.add_quad(b4, b3, b2, b1); // bottom
        mesh.add_quad(t1, t2, t3, t4); // top
        mesh.add_quad(b1, b2, t2, t1);
        mesh.add_quad(b2, b3, t3, t2);
        mesh.add_quad(b3, b4, t4, t3);
        mesh.add_quad(b4, b1, t1, t4);

        let area = mesh.area();
        let mut object = Self {
            position: base,
            material,
            area,
            aabb: Aabb::ZERO,
            shape: Shape::Box(mesh),
        };
        object.update_aabb();
        object
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn is_light(&self) -> bool {
        self.material.is_light()
    }

    /// Nearest intersection as `(element index, distance)`.
    ///
    /// Mesh-backed shapes run the AABB slab test before scanning their
    /// triangles; spheres use the closed form directly.
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<(u32, f32)> {
        match &self.shape {
            Shape::Sphere { radius } => self
                .intersect_sphere(origin, direction, *radius)
                .map(|t| (0, t)),
            Shape::Mesh(mesh) | Shape::Box(mesh) | Shape::LightQuad { mesh, .. } => {
                self.aabb.intersect_ray(origin, direction)?;
                mesh.intersect(origin, direction)
            }
        }
    }

    fn intersect_sphere(&self, origin: Vec3, direction: Vec3, radius: f32) -> Option<f32> {
        if radius < f32::EPSILON {
            return None;
        }

        let l = self.position - origin;
        let tca = l.dot(direction);
        if tca < 0.0 {
            return None;
        }

        let distance_sq = l.dot(l) - tca * tca;
        let radius_sq = radius * radius;
        if distance_sq > radius_sq {
            return None;
        }

        let thc = (radius_sq - distance_sq).sqrt();
        let mut t = tca - thc;
        if t < 0.0 {
            t = tca + thc;
        }
        (t >= 0.0).then_some(t)
    }

    /// Outward surface normal at a hit point.
    pub fn normal_at(&self, point: Vec3, element_index: u32) -> Vec3 {
        match &self.shape {
            Shape::Sphere { .. } => (point - self.position).normalize(),
            Shape::Mesh(mesh) | Shape::Box(mesh) => {
                mesh.triangles[element_index as usize].normal
            }
            Shape::LightQuad { normal, .. } => *normal,
        }
    }

    /// Uniform random point on the surface, used by the direct-light
    /// estimator. Shapes without a sampler fall back to their position.
    pub fn sample_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        match &self.shape {
            Shape::Sphere { radius } => {
                let u = gen_f32(rng);
                let v = gen_f32(rng);
                let theta = TAU * u;
                let phi = (2.0 * v - 1.0).acos();
                self.position
                    + Vec3::new(
                        radius * phi.sin() * theta.cos(),
                        radius * phi.sin() * theta.sin(),
                        radius * phi.cos(),
                    )
            }
            Shape::LightQuad { x_vec, y_vec, .. } => {
                let u = gen_f32(rng);
                let v = gen_f32(rng);
                let corner = self.position - *x_vec - *y_vec;
                corner + *x_vec * (2.0 * u) + *y_vec * (2.0 * v)
            }
            Shape::Mesh(_) | Shape::Box(_) => self.position,
        }
    }

    /// Recompute the bounding box from the current geometry.
    pub fn update_aabb(&mut self) {
        self.aabb = match &self.shape {
            Shape::Sphere { radius } => Aabb::new(self.position, Vec3::splat(2.0 * radius)),
            Shape::Mesh(mesh) | Shape::Box(mesh) | Shape::LightQuad { mesh, .. } => mesh.bounds(),
        };
    }
}
