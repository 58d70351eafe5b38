//! Decimation parameters.

/// How strictly seam endpoints must match before they may move.
///
/// A seam vertex is "free" when the UV step ratios toward its two
/// seam-chain neighbors agree on both sides of the seam. Freeing fewer
/// vertices preserves more of the original chart boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Every non-junction seam vertex is free.
    Permissive,
    /// Free when the ratios on both sides are finite.
    #[default]
    Finite,
    /// Free only when the ratios agree within a small tolerance.
    Equal,
}

/// Parameters for [`decimate_mesh`](crate::decimate_mesh).
///
/// When both [`target_vertices`](Self::target_vertices) and
/// [`target_percent`](Self::target_percent) are set, the vertex count
/// wins. With neither set the target defaults to 50% of the input.
///
/// # Examples
///
/// ```
/// use mesh_decimate::{DecimateParams, Strictness};
///
/// let params = DecimateParams::new()
///     .with_target_percent(25.0)
///     .with_min_vertices(16)
///     .with_strictness(Strictness::Equal);
/// assert_eq!(params.min_vertices, 16);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecimateParams {
    /// Keep this percentage of the input vertices, in `[0, 100]`.
    pub target_percent: Option<f64>,
    /// Absolute vertex-count target; overrides `target_percent`.
    pub target_vertices: Option<u32>,
    /// Never reduce below this many vertices (floor of 4 applies always).
    pub min_vertices: u32,
    /// Seam endpoint freedom rule.
    pub strictness: Strictness,
}

impl Default for DecimateParams {
    fn default() -> Self {
        Self {
            target_percent: None,
            target_vertices: None,
            min_vertices: 4,
            strictness: Strictness::default(),
        }
    }
}

impl DecimateParams {
    /// Default parameters: 50% target, `Finite` strictness.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the percentage of vertices to keep.
    #[must_use]
    pub fn with_target_percent(mut self, percent: f64) -> Self {
        self.target_percent = Some(percent.clamp(0.0, 100.0));
        self
    }

    /// Set an absolute vertex-count target.
    #[must_use]
    pub fn with_target_vertices(mut self, vertices: u32) -> Self {
        self.target_vertices = Some(vertices);
        self
    }

    /// Set the vertex-count floor.
    #[must_use]
    pub fn with_min_vertices(mut self, min_vertices: u32) -> Self {
        self.min_vertices = min_vertices;
        self
    }

    /// Set the seam strictness rule.
    #[must_use]
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// The vertex count the run aims for, given the input size.
    ///
    /// Resolution order: explicit vertex target, then percentage, then
    /// the 50% default; the result is clamped below by
    /// `max(4, min_vertices)`.
    #[must_use]
    pub fn effective_target(&self, input_vertices: usize) -> usize {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        #[allow(clippy::cast_precision_loss)]
        let requested = match (self.target_vertices, self.target_percent) {
            (Some(v), _) => v as usize,
            (None, Some(p)) => ((input_vertices as f64) * p / 100.0).round() as usize,
            (None, None) => input_vertices / 2,
        };
        requested.max(4).max(self.min_vertices as usize)
    }
}
