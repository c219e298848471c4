//! Scene container: owns every object, caches the light list and drives
//! intersection queries through the octree.

use crate::material::Material;
use crate::object::{HitRecord, ObjectId, SceneObject, TriangleMesh};
use crate::octree::Octree;
use crate::source::TriangleSource;
use ember_math::{Color, Ray, Vec3};
use log::{debug, warn};
use thiserror::Error;

/// Scene construction and preparation failures.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene contains no objects")]
    Empty,
    #[error("failed to load mesh '{path}': {source}")]
    MeshLoad {
        path: String,
        source: std::io::Error,
    },
}

/// An owning collection of scene objects.
///
/// Objects are added freely, then `prepare()` fixes the scene for
/// rendering: bounding boxes are refreshed, emissive objects are cached
/// as the light list and the octree is built. After that the scene is
/// read-only and safe to share across render workers.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    lights: Vec<ObjectId>,
    octree: Option<Octree>,
    pub background: Color,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return its id.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = self.objects.len();
        self.objects.push(object);
        id
    }

    /// Add a triangle mesh pulled from a collaborator source.
    pub fn add_mesh_from(
        &mut self,
        source: &mut dyn TriangleSource,
        path: &str,
        position: Vec3,
        material: Material,
    ) -> Result<ObjectId, SceneError> {
        let triangles = source.load_mesh(path).map_err(|source| SceneError::MeshLoad {
            path: path.to_string(),
            source,
        })?;
        debug!("loaded mesh '{path}' with {} triangles", triangles.len());

        let mesh = TriangleMesh::from_triangles(
            triangles
                .into_iter()
                .map(|(a, b, c)| (a + position, b + position, c + position)),
        );
        Ok(self.add(SceneObject::mesh(position, mesh, material)))
    }

    /// Freeze the scene for rendering.
    pub fn prepare(&mut self) -> Result<(), SceneError> {
        if self.objects.is_empty() {
            return Err(SceneError::Empty);
        }

        for object in &mut self.objects {
            object.update_aabb();
        }

        self.lights = self
            .objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.is_light())
            .map(|(id, _)| id)
            .collect();
        for &id in &self.lights {
            if self.objects[id].area <= 0.0 {
                warn!("light {id} has zero area and is skipped by direct lighting");
            }
        }

        let octree = Octree::build(&self.objects, Octree::DEFAULT_MAX_COUNT);
        debug!(
            "prepared scene: {} objects, {} lights, {} octree nodes",
            self.objects.len(),
            self.lights.len(),
            octree.node_count()
        );
        self.octree = Some(octree);
        Ok(())
    }

    #[inline]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    #[inline]
    pub fn object(&self, id: ObjectId) -> &SceneObject {
        &self.objects[id]
    }

    /// Mutable access before `prepare()`, e.g. to tune a preset material.
    pub fn object_mut(&mut self, id: ObjectId) -> &mut SceneObject {
        &mut self.objects[id]
    }

    /// Ids of all emissive objects. Empty before `prepare()`.
    #[inline]
    pub fn lights(&self) -> &[ObjectId] {
        &self.lights
    }

    /// Nearest hit along the ray. Uses the octree once prepared and falls
    /// back to the linear scan before that (mainly for tests).
    pub fn intersect(&self, ray: &Ray) -> HitRecord {
        match &self.octree {
            Some(octree) => octree.intersect(&self.objects, ray),
            None => self.intersect_linear(ray),
        }
    }

    fn intersect_linear(&self, ray: &Ray) -> HitRecord {
        let mut best = HitRecord::miss();
        for (id, object) in self.objects.iter().enumerate() {
            if let Some((element, distance)) = object.intersect(ray.origin, ray.direction) {
                if distance < best.distance {
                    best = HitRecord {
                        object: Some(id),
                        element_index: element,
                        distance,
                    };
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::rng::{gen_f32, Xorshift128Plus};

    #[test]
    fn test_empty_scene_fails_prepare() {
        let mut scene = Scene::new();
        assert!(matches!(scene.prepare(), Err(SceneError::Empty)));
    }

    #[test]
    fn test_lights_are_cached() {
        let mut scene = Scene::new();
        scene.add(SceneObject::sphere(
            Vec3::ZERO,
            1.0,
            Material::diffuse(Color::splat(0.5)),
        ));
        let light = scene.add(SceneObject::sphere(
            Vec3::new(0.0, 5.0, 0.0),
            0.5,
            Material::emissive(Color::splat(2.0)),
        ));
        scene.prepare().unwrap();

        assert_eq!(scene.lights(), &[light]);
    }

    #[test]
    fn test_octree_and_linear_agree() {
        let mut rng = Xorshift128Plus::new(5);
        let mut scene = Scene::new();
        for _ in 0..100 {
            scene.add(SceneObject::sphere(
                Vec3::new(
                    gen_f32(&mut rng) * 10.0 - 5.0,
                    gen_f32(&mut rng) * 10.0 - 5.0,
                    gen_f32(&mut rng) * 10.0 - 5.0,
                ),
                0.2,
                Material::diffuse(Color::splat(0.5)),
            ));
        }

        let rays: Vec<Ray> = (0..500)
            .map(|_| {
                Ray::new(
                    Vec3::new(
                        gen_f32(&mut rng) * 12.0 - 6.0,
                        gen_f32(&mut rng) * 12.0 - 6.0,
                        gen_f32(&mut rng) * 12.0 - 6.0,
                    ),
                    Vec3::new(
                        gen_f32(&mut rng) * 2.0 - 1.0,
                        gen_f32(&mut rng) * 2.0 - 1.0,
                        gen_f32(&mut rng) * 2.0 - 1.0,
                    ),
                )
            })
            .collect();

        let linear: Vec<HitRecord> = rays.iter().map(|r| scene.intersect_linear(r)).collect();
        scene.prepare().unwrap();

        for (ray, expected) in rays.iter().zip(&linear) {
            let hit = scene.intersect(ray);
            assert_eq!(hit.object, expected.object);
            if hit.is_hit() {
                assert!((hit.distance - expected.distance).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_mesh_from_source_is_positioned() {
        struct Quad;
        impl TriangleSource for Quad {
            fn load_mesh(&mut self, _path: &str) -> std::io::Result<Vec<(Vec3, Vec3, Vec3)>> {
                Ok(vec![
                    (
                        Vec3::new(-1.0, -1.0, 0.0),
                        Vec3::new(1.0, -1.0, 0.0),
                        Vec3::new(1.0, 1.0, 0.0),
                    ),
                    (
                        Vec3::new(1.0, 1.0, 0.0),
                        Vec3::new(-1.0, 1.0, 0.0),
                        Vec3::new(-1.0, -1.0, 0.0),
                    ),
                ])
            }
        }

        let mut scene = Scene::new();
        let id = scene
            .add_mesh_from(
                &mut Quad,
                "quad.obj",
                Vec3::new(0.0, 0.0, -5.0),
                Material::diffuse(Color::splat(0.5)),
            )
            .unwrap();
        scene.prepare().unwrap();

        let hit = scene.intersect(&Ray::new(Vec3::ZERO, Vec3::NEG_Z));
        assert_eq!(hit.object, Some(id));
        assert!((hit.distance - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_failing_source_surfaces_io_error() {
        struct Broken;
        impl TriangleSource for Broken {
            fn load_mesh(&mut self, _path: &str) -> std::io::Result<Vec<(Vec3, Vec3, Vec3)>> {
                Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such mesh",
                ))
            }
        }

        let mut scene = Scene::new();
        let err = scene
            .add_mesh_from(
                &mut Broken,
                "missing.obj",
                Vec3::ZERO,
                Material::default(),
            )
            .unwrap_err();
        assert!(matches!(err, SceneError::MeshLoad { .. }));
    }
}
