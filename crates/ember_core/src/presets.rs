//! Demo scenes: the classic Cornell box and a hexagonal room.
//!
//! Both rooms come furnished with the example spheres and boxes used to
//! exercise every material branch, plus a ceiling light.

use crate::material::Material;
use crate::object::SceneObject;
use crate::object::TriangleMesh;
use crate::scene::Scene;
use ember_math::{Color, Vec2, Vec3};

/// Radius shared by the example spheres.
const SPHERE_RADIUS: f32 = 1.5;

/// Emission of the demo ceiling light. Bright enough that the Reinhard
/// tone mapper produces a readable image after a handful of samples.
const LIGHT_EMISSION: f64 = 10.0;

/// Demo scene selector, as it appears in the render configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScenePreset {
    CornellBox {
        length: f32,
        width: f32,
        height: f32,
    },
    Hexagon,
}

impl ScenePreset {
    /// Build the furnished scene with the default area light.
    pub fn build(&self) -> Scene {
        self.build_with_light(Color::splat(LIGHT_EMISSION), false)
    }

    /// Build the furnished scene.
    ///
    /// With `point_light` the ceiling quad is replaced by a zero-radius
    /// emissive sphere; such a light cannot be hit by rays and the direct
    /// estimator skips it, so expect an essentially black render. It is
    /// kept for parity with the historical presets.
    pub fn build_with_light(&self, emission: Color, point_light: bool) -> Scene {
        match self {
            Self::CornellBox {
                length,
                width,
                height,
            } => cornell_box(*length, *width, *height, emission, point_light),
            Self::Hexagon => hexagon(emission, point_light),
        }
    }

    /// Eye and look-at target that frame the scene.
    pub fn recommended_view(&self) -> (Vec3, Vec3) {
        match self {
            Self::CornellBox { length, .. } => {
                (Vec3::new(0.0, 0.0, length / 2.0), Vec3::ZERO)
            }
            Self::Hexagon => (Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)),
        }
    }
}

fn add_light(scene: &mut Scene, roof_center: Vec3, dimensions: Vec2, emission: Color, point: bool) {
    if point {
        scene.add(SceneObject::sphere(roof_center, 0.0, Material::emissive(emission)));
    } else {
        scene.add(SceneObject::light_quad(
            roof_center,
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            dimensions,
            Material::emissive(emission),
        ));
    }
}

fn cornell_box(length: f32, width: f32, height: f32, emission: Color, point_light: bool) -> Scene {
    let half_length = length / 2.0;
    let half_width = width / 2.0;
    let half_height = height / 2.0;

    let mut scene = Scene::new();

    // Ceiling corners; the floor mirrors them in y.
    let c1 = Vec3::new(-half_width, half_height, half_length);
    let c2 = Vec3::new(half_width, half_height, half_length);
    let c3 = Vec3::new(half_width, half_height, -half_length);
    let c4 = Vec3::new(-half_width, half_height, -half_length);
    let flip = Vec3::new(1.0, -1.0, 1.0);
    let (f1, f2, f3, f4) = (c1 * flip, c2 * flip, c3 * flip, c4 * flip);

    let mut left_wall = TriangleMesh::new();
    left_wall.add_quad(f2, c2, c3, f3);
    scene.add(SceneObject::mesh(
        Vec3::ZERO,
        left_wall,
        Material::diffuse(Color::new(0.2, 0.01, 0.01)),
    ));

    let mut right_wall = TriangleMesh::new();
    right_wall.add_quad(f1, f4, c4, c1);
    scene.add(SceneObject::mesh(
        Vec3::ZERO,
        right_wall,
        Material::diffuse(Color::new(0.01, 0.2, 0.01)),
    ));

    let mut white_segments = TriangleMesh::new();
    white_segments.add_quad(c4, c3, c2, c1); // ceiling
    white_segments.add_quad(f4, f3, c3, c4); // back wall
    white_segments.add_quad(f1, f2, f3, f4); // floor
    scene.add(SceneObject::mesh(
        Vec3::ZERO,
        white_segments,
        Material::diffuse(Color::splat(0.2)),
    ));

    // Example spheres, one per material branch.
    let radius = SPHERE_RADIUS;
    let width_offset = half_width - radius;
    let depth_offset = half_length - radius;
    let gray = Color::splat(0.5);

    scene.add(SceneObject::sphere(
        Vec3::new(-width_offset, 0.0, -depth_offset / 2.0),
        radius,
        Material::diffuse(gray),
    ));
    scene.add(SceneObject::sphere(
        Vec3::new(0.0, 2.0, -half_length + radius),
        radius,
        Material::specular(gray),
    ));
    scene.add(SceneObject::sphere(
        Vec3::new(width_offset, 0.0, -depth_offset / 2.0),
        radius,
        Material::oren_nayar(gray, 0.5),
    ));
    scene.add(SceneObject::sphere(
        Vec3::new(0.0, -half_height + radius + 1.5, -2.0),
        radius,
        Material::refractive(gray, 1.52),
    ));

    scene.add(SceneObject::cuboid(
        Vec3::new(half_width - 1.5, -half_height, -depth_offset / 2.0),
        Vec3::Y,
        Vec3::new(-0.5, 0.0, 1.0),
        2.0,
        2.0,
        half_height - radius,
        Material::diffuse(Color::new(0.01, 0.3, 0.8)),
    ));
    scene.add(SceneObject::cuboid(
        Vec3::new(-half_width + 1.5, -half_height, -depth_offset / 2.0),
        Vec3::Y,
        Vec3::new(0.5, 0.0, 1.0),
        2.0,
        2.0,
        half_height - radius,
        Material::oren_nayar(Color::new(0.8, 0.4, 0.01), 0.5),
    ));
    scene.add(SceneObject::cuboid(
        Vec3::new(0.0, -half_height, -3.0),
        Vec3::Y,
        Vec3::new(1.0, 0.0, 1.0),
        4.0,
        4.0,
        half_height - radius - 2.3,
        Material::diffuse(Color::new(0.5, 0.2, 0.8)),
    ));

    add_light(
        &mut scene,
        Vec3::new(0.0, half_height - 0.001, 0.0),
        Vec2::new(half_width / 3.0, half_height / 3.0),
        emission,
        point_light,
    );

    scene
}

fn hexagon(emission: Color, point_light: bool) -> Scene {
    let mut scene = Scene::new();

    // Ceiling corners; the floor mirrors them in y.
    let c1 = Vec3::new(0.0, 5.0, -3.0);
    let c2 = Vec3::new(6.0, 5.0, 0.0);
    let c3 = Vec3::new(6.0, 5.0, 10.0);
    let c4 = Vec3::new(0.0, 5.0, 13.0);
    let c5 = Vec3::new(-6.0, 5.0, 10.0);
    let c6 = Vec3::new(-6.0, 5.0, 0.0);
    let flip = Vec3::new(1.0, -1.0, 1.0);
    let (f1, f2, f3, f4, f5, f6) = (
        c1 * flip,
        c2 * flip,
        c3 * flip,
        c4 * flip,
        c5 * flip,
        c6 * flip,
    );

    let mut floor = TriangleMesh::new();
    floor.add_quad(f1, f4, f3, f2);
    floor.add_quad(f1, f6, f5, f4);
    scene.add(SceneObject::mesh(
        Vec3::ZERO,
        floor,
        Material::diffuse(Color::splat(0.2)),
    ));

    let mut ceiling = TriangleMesh::new();
    ceiling.add_quad(c1, c2, c3, c4);
    ceiling.add_quad(c4, c5, c6, c1);
    scene.add(SceneObject::mesh(
        Vec3::ZERO,
        ceiling,
        Material::diffuse(Color::splat(0.2)),
    ));

    let mut red_wall = TriangleMesh::new();
    red_wall.add_quad(f2, f3, c3, c2);
    scene.add(SceneObject::mesh(
        Vec3::ZERO,
        red_wall,
        Material::diffuse(Color::new(0.2, 0.01, 0.01)),
    ));

    let mut green_walls = TriangleMesh::new();
    green_walls.add_quad(f1, f2, c2, c1);
    green_walls.add_quad(f5, f6, c6, c5);
    scene.add(SceneObject::mesh(
        Vec3::ZERO,
        green_walls,
        Material::diffuse(Color::new(0.01, 0.2, 0.01)),
    ));

    let mut white_walls = TriangleMesh::new();
    white_walls.add_quad(f3, f4, c4, c3);
    white_walls.add_quad(f4, f5, c5, c4);
    white_walls.add_quad(f6, f1, c1, c6);
    scene.add(SceneObject::mesh(
        Vec3::ZERO,
        white_walls,
        Material::diffuse(Color::splat(0.2)),
    ));

    let radius = SPHERE_RADIUS;
    let gray = Color::splat(0.5);
    scene.add(SceneObject::sphere(
        Vec3::new(3.0, 2.0, 10.0),
        radius,
        Material::diffuse(gray),
    ));
    scene.add(SceneObject::sphere(
        Vec3::new(-3.0, 0.0, 8.0),
        radius,
        Material::specular(gray),
    ));
    scene.add(SceneObject::sphere(
        Vec3::new(1.0, -3.0, 6.0),
        radius,
        Material::refractive(gray, 1.52),
    ));

    scene.add(SceneObject::cuboid(
        Vec3::new(3.0, -5.0, 10.0),
        Vec3::Y,
        Vec3::new(0.5, 0.0, 1.0),
        2.0,
        2.0,
        7.0 - radius,
        Material::diffuse(Color::new(0.01, 0.3, 0.8)),
    ));
    scene.add(SceneObject::cuboid(
        Vec3::new(-3.0, -5.0, 8.0),
        Vec3::Y,
        Vec3::new(0.5, 0.0, 1.0),
        2.0,
        2.0,
        5.0 - radius,
        Material::refractive(Color::new(0.8, 0.4, 0.01), 1.52),
    ));
    scene.add(SceneObject::cuboid(
        Vec3::new(1.0, -5.0, 6.0),
        Vec3::Y,
        Vec3::new(0.5, 0.0, 1.0),
        4.0,
        4.0,
        2.0 - radius,
        Material::diffuse(Color::new(0.5, 0.2, 0.8)),
    ));

    add_light(
        &mut scene,
        Vec3::new(0.0, 5.0 - 0.001, 8.0),
        Vec2::new(1.0, 1.0),
        emission,
        point_light,
    );

    scene
}
