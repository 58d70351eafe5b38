//! Indexed triangle mesh with decoupled texture coordinates.

use crate::{MeshBuffers, MeshError};
use nalgebra::{Point2, Point3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh with per-corner texture coordinates.
///
/// Positions and texture coordinates live in separate index spaces: each
/// face carries three vertex indices into `positions` and three texcoord
/// indices into `texcoords`. A vertex sitting on a texture seam is
/// referenced with different texcoord indices from the two sides of the
/// seam.
///
/// # Invariants
///
/// - `faces.len() == face_texcoords.len()`
/// - every index in `faces` is `< positions.len()`
/// - every index in `face_texcoords` is `< texcoords.len()` (unless the
///   mesh carries no texcoords at all, in which case both `texcoords` and
///   `face_texcoords` may be empty)
///
/// Use [`TexturedMesh::validate`] to check these before handing the mesh
/// to an algorithm.
///
/// # Winding Order
///
/// Faces use counter-clockwise winding when viewed from outside; normals
/// point outward by the right-hand rule.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TexturedMesh {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,

    /// Triangle faces as indices into `positions`, CCW winding.
    pub faces: Vec<[u32; 3]>,

    /// Texture coordinates, indexed independently of positions.
    pub texcoords: Vec<Point2<f64>>,

    /// Per-face texcoord indices into `texcoords`, one triple per face.
    pub face_texcoords: Vec<[u32; 3]>,
}

impl TexturedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            faces: Vec::new(),
            texcoords: Vec::new(),
            face_texcoords: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            texcoords: Vec::with_capacity(vertex_count),
            face_texcoords: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from its four component arrays.
    #[inline]
    #[must_use]
    pub const fn from_parts(
        positions: Vec<Point3<f64>>,
        faces: Vec<[u32; 3]>,
        texcoords: Vec<Point2<f64>>,
        face_texcoords: Vec<[u32; 3]>,
    ) -> Self {
        Self {
            positions,
            faces,
            texcoords,
            face_texcoords,
        }
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangle faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Whether the mesh carries texture coordinates.
    #[inline]
    #[must_use]
    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    /// Check the structural invariants of the mesh.
    ///
    /// # Errors
    ///
    /// Returns a [`MeshError`] describing the first violation found:
    /// mismatched face/face-texcoord lengths or an out-of-range index.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.has_texcoords() && self.faces.len() != self.face_texcoords.len() {
            return Err(MeshError::FaceTexcoordMismatch {
                faces: self.faces.len(),
                face_texcoords: self.face_texcoords.len(),
            });
        }

        let vertex_count = self.positions.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            for &v in face {
                if v as usize >= vertex_count {
                    return Err(MeshError::VertexIndexOutOfRange {
                        face: face_idx,
                        index: v,
                        count: vertex_count,
                    });
                }
            }
        }

        let texcoord_count = self.texcoords.len();
        for (face_idx, ft) in self.face_texcoords.iter().enumerate() {
            for &t in ft {
                if t as usize >= texcoord_count {
                    return Err(MeshError::TexcoordIndexOutOfRange {
                        face: face_idx,
                        index: t,
                        count: texcoord_count,
                    });
                }
            }
        }

        Ok(())
    }
}

impl MeshBuffers for TexturedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    fn texcoord_count(&self) -> usize {
        self.texcoords.len()
    }

    #[inline]
    fn position(&self, index: usize) -> Point3<f64> {
        self.positions[index]
    }

    #[inline]
    fn texcoord(&self, index: usize) -> Point2<f64> {
        self.texcoords[index]
    }

    #[inline]
    fn face(&self, index: usize) -> [u32; 3] {
        self.faces[index]
    }

    #[inline]
    fn face_texcoord(&self, index: usize) -> [u32; 3] {
        self.face_texcoords[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> TexturedMesh {
        TexturedMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn empty_mesh() {
        let mesh = TexturedMesh::new();
        assert!(mesh.is_empty());
        assert!(!mesh.has_texcoords());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn valid_triangle() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn vertex_index_out_of_range() {
        let mut mesh = triangle();
        mesh.faces[0][2] = 7;
        assert_eq!(
            mesh.validate(),
            Err(MeshError::VertexIndexOutOfRange {
                face: 0,
                index: 7,
                count: 3,
            })
        );
    }

    #[test]
    fn texcoord_index_out_of_range() {
        let mut mesh = triangle();
        mesh.face_texcoords[0][0] = 5;
        assert_eq!(
            mesh.validate(),
            Err(MeshError::TexcoordIndexOutOfRange {
                face: 0,
                index: 5,
                count: 3,
            })
        );
    }

    #[test]
    fn face_texcoord_length_mismatch() {
        let mut mesh = triangle();
        mesh.face_texcoords.push([0, 1, 2]);
        assert_eq!(
            mesh.validate(),
            Err(MeshError::FaceTexcoordMismatch {
                faces: 1,
                face_texcoords: 2,
            })
        );
    }

    #[test]
    fn buffers_trait_accessors() {
        let mesh = triangle();
        assert_eq!(MeshBuffers::face(&mesh, 0), [0, 1, 2]);
        assert!((MeshBuffers::position(&mesh, 1).x - 1.0).abs() < f64::EPSILON);
        assert!((MeshBuffers::texcoord(&mesh, 2).y - 1.0).abs() < f64::EPSILON);
    }
}
