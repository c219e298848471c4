//! Ember core - scene model for the path tracer.
//!
//! This crate provides:
//!
//! - **Random source**: the per-worker xorshift128+ generator
//! - **Materials**: surface kinds, diffuse models, emission
//! - **Geometry**: triangles, meshes, spheres, light quads, boxes
//! - **Acceleration**: an octree over scene objects
//! - **Scenes**: the owning object container plus demo presets

pub mod material;
pub mod object;
pub mod octree;
pub mod presets;
pub mod rng;
pub mod scene;
pub mod source;
pub mod triangle;

// Re-export commonly used types
pub use material::{DiffuseModel, Material, SurfaceKind};
pub use object::{HitRecord, ObjectId, SceneObject, Shape, TriangleMesh};
pub use octree::Octree;
pub use presets::ScenePreset;
pub use rng::Xorshift128Plus;
pub use scene::{Scene, SceneError};
pub use source::TriangleSource;
pub use triangle::Triangle;
