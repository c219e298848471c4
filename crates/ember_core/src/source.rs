//! Collaborator contract for mesh geometry.
//!
//! Parsing OBJ (or any other format) is not the core's concern; the scene
//! only consumes triangle triples from whatever source the application
//! wires in.

use ember_math::Vec3;

/// Supplies world-space triangles for named meshes.
pub trait TriangleSource {
    /// Load the triangles of the mesh at `path`.
    fn load_mesh(&mut self, path: &str) -> std::io::Result<Vec<(Vec3, Vec3, Vec3)>>;
}
