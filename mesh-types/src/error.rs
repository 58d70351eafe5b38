//! Structural validation errors.

use thiserror::Error;

/// Errors raised by structural mesh validation.
///
/// These represent caller contract violations, never ordinary geometric
/// situations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    /// A face references a vertex index outside the position array.
    #[error("face {face} references vertex {index}, but mesh has {count} vertices")]
    VertexIndexOutOfRange {
        /// Offending face index.
        face: usize,
        /// Out-of-range vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        count: usize,
    },

    /// A face references a texcoord index outside the texcoord array.
    #[error("face {face} references texcoord {index}, but mesh has {count} texcoords")]
    TexcoordIndexOutOfRange {
        /// Offending face index.
        face: usize,
        /// Out-of-range texcoord index.
        index: u32,
        /// Number of texcoords in the mesh.
        count: usize,
    },

    /// The face and face-texcoord arrays have different lengths.
    #[error("face count {faces} does not match face-texcoord count {face_texcoords}")]
    FaceTexcoordMismatch {
        /// Number of faces.
        faces: usize,
        /// Number of face-texcoord triples.
        face_texcoords: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshError::VertexIndexOutOfRange {
            face: 3,
            index: 9,
            count: 5,
        };
        let msg = format!("{err}");
        assert!(msg.contains("face 3"));
        assert!(msg.contains('9'));
        assert!(msg.contains('5'));
    }
}
