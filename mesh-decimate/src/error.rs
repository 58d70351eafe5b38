//! Error types for decimation.

use thiserror::Error;

/// Failures that abort a decimation run before any collapse happens.
///
/// Geometric situations encountered mid-run (boundary edges, seam
/// junctions, infeasible placements, degenerate triangles) are never
/// errors; they surface as infinite costs and, at worst, an early stop
/// reason on the result.
#[derive(Debug, Error)]
pub enum DecimateError {
    /// The input mesh failed structural validation.
    #[error("invalid input mesh: {0}")]
    InvalidMesh(#[from] mesh_types::MeshError),

    /// An edge with more than two adjacent faces was found while building
    /// connectivity. Decimation requires a 2-manifold input.
    #[error("non-manifold edge between vertices {v0} and {v1}: more than two adjacent faces")]
    NonManifoldEdge {
        /// Smaller endpoint of the offending edge.
        v0: u32,
        /// Larger endpoint of the offending edge.
        v1: u32,
    },
}
