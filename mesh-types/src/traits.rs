//! Storage-layout accessor trait.

use nalgebra::{Point2, Point3};

/// Read-only accessors over a textured mesh's storage layout.
///
/// Algorithms that only need to read positions, texcoords and index
/// triples should take `&impl MeshBuffers` instead of a concrete mesh
/// type, so alternative storage layouts (flat typed arrays, memory-mapped
/// buffers) can feed the same code path.
///
/// Accessors panic on out-of-range indices; callers are expected to have
/// validated the mesh first.
pub trait MeshBuffers {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of triangle faces.
    fn face_count(&self) -> usize;

    /// Number of texture coordinates.
    fn texcoord_count(&self) -> usize;

    /// Position of vertex `index`.
    fn position(&self, index: usize) -> Point3<f64>;

    /// Texture coordinate `index`.
    fn texcoord(&self, index: usize) -> Point2<f64>;

    /// Vertex index triple of face `index`.
    fn face(&self, index: usize) -> [u32; 3];

    /// Texcoord index triple of face `index`.
    fn face_texcoord(&self, index: usize) -> [u32; 3];
}
