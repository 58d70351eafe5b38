//! Decimation results and stop reasons.

use mesh_types::TexturedMesh;
use std::fmt;

/// Why the greedy loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The vertex count reached the effective target.
    TargetReached,
    /// The candidate queue ran dry before the target.
    EmptyQueue,
    /// Every remaining candidate had infinite cost (boundaries, locked
    /// seams) for longer than the stall budget.
    AllInfiniteCost,
    /// Finite-cost candidates kept failing validity checks for longer
    /// than the stall budget.
    NoProgress,
}

impl StopReason {
    /// Stable machine-readable name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TargetReached => "target_reached",
            Self::EmptyQueue => "empty_queue",
            Self::AllInfiniteCost => "all_infinite_cost",
            Self::NoProgress => "no_progress",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a decimation run: the simplified mesh plus run statistics.
#[derive(Debug, Clone)]
pub struct DecimationResult {
    /// The simplified mesh with compacted, gap-free index buffers.
    pub mesh: TexturedMesh,
    /// Vertex count of the input.
    pub original_vertices: usize,
    /// Vertex count of the output.
    pub final_vertices: usize,
    /// Face count of the input.
    pub original_faces: usize,
    /// Face count of the output.
    pub final_faces: usize,
    /// Number of committed edge collapses.
    pub collapses: usize,
    /// Why the loop terminated.
    pub stop_reason: StopReason,
}

impl DecimationResult {
    /// Fraction of input vertices kept, in `[0, 1]`.
    #[must_use]
    pub fn vertex_ratio(&self) -> f64 {
        if self.original_vertices == 0 {
            return 1.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.final_vertices as f64 / self.original_vertices as f64
        }
    }

    /// Fraction of input faces kept, in `[0, 1]`.
    #[must_use]
    pub fn face_ratio(&self) -> f64 {
        if self.original_faces == 0 {
            return 1.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.final_faces as f64 / self.original_faces as f64
        }
    }
}

impl fmt::Display for DecimationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "decimated {} -> {} vertices, {} -> {} faces ({} collapses, {})",
            self.original_vertices,
            self.final_vertices,
            self.original_faces,
            self.final_faces,
            self.collapses,
            self.stop_reason
        )
    }
}
