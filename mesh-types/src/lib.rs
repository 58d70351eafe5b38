//! Core textured-mesh types for the decimation pipeline.
//!
//! This crate provides the foundational types shared by every consumer of
//! the decimation engine:
//!
//! - [`TexturedMesh`] - An indexed triangle mesh with per-corner texture
//!   coordinates
//! - [`MeshBuffers`] - Read-only accessor trait over the mesh storage layout
//! - [`MeshError`] - Structural validation errors
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no engine or renderer dependencies. It can
//! be used in CLI tools, servers, WASM and binding layers alike.
//!
//! # Texture coordinates
//!
//! Texture coordinates are stored in their own index space: each face
//! carries three texcoord indices in addition to its three vertex indices.
//! The same vertex may therefore reference different UVs from different
//! corners, which is what makes texture seams representable at all.
//!
//! # Example
//!
//! ```
//! use mesh_types::{TexturedMesh, Point3, Point2};
//!
//! let mut mesh = TexturedMesh::new();
//! mesh.positions.push(Point3::new(0.0, 0.0, 0.0));
//! mesh.positions.push(Point3::new(1.0, 0.0, 0.0));
//! mesh.positions.push(Point3::new(0.0, 1.0, 0.0));
//! mesh.texcoords.push(Point2::new(0.0, 0.0));
//! mesh.texcoords.push(Point2::new(1.0, 0.0));
//! mesh.texcoords.push(Point2::new(0.0, 1.0));
//! mesh.faces.push([0, 1, 2]);
//! mesh.face_texcoords.push([0, 1, 2]);
//!
//! assert!(mesh.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod mesh;
mod shapes;
mod traits;

pub use error::MeshError;
pub use mesh::TexturedMesh;
pub use shapes::{octahedron, seamed_cube, uv_grid};
pub use traits::MeshBuffers;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};
