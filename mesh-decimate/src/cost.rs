//! Per-edge collapse cost and optimal placement.
//!
//! Each candidate edge runs through a decision tree: edges touching the
//! mesh boundary or splicing unrelated seam chains are priced at
//! infinity; seam edges collapse along the seam (to a fixed endpoint or
//! to a QP-optimized point on the seam segment); interior edges get the
//! classic QEM optimal placement via an equality-constrained QP with a
//! midpoint fallback.
//!
//! Costs are always re-evaluated through the quadric form at the chosen
//! placement, never taken from the QP objective, so the regularizer and
//! the dropped constant term cannot skew the queue ordering.

use crate::qp::solve_quadprog;
use crate::quadric::{lift, Quadric};
use crate::state::DecimationState;
use crate::Strictness;
use nalgebra::{DMatrix, DVector, Point2, Point3};

/// Diagonal regularizer keeping the QP Hessians positive definite.
const REGULARIZER: f64 = 1e-6;

/// Tolerance for the strictness-2 seam ratio comparison.
const RATIO_TOLERANCE: f64 = 1e-3;

/// UV target(s) of a placement, one per seam side.
#[derive(Debug, Clone)]
pub enum PlacementUvs {
    /// Both faces of the edge share one UV chart.
    Single {
        /// Target texture coordinate.
        uv: Point2<f64>,
        /// Combined quadric of the collapsed wedge pair.
        metric: Quadric,
    },
    /// A seam edge; each side keeps its own chart.
    Seam {
        /// Target texture coordinate per edge side.
        uvs: [Point2<f64>; 2],
        /// Combined quadric per edge side.
        metrics: [Quadric; 2],
    },
}

/// Where the surviving vertex goes after a collapse.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Target 3D position.
    pub position: Point3<f64>,
    /// Target UV value(s) and the metrics to install on the survivor.
    pub uvs: PlacementUvs,
}

/// Cost of collapsing one edge, with the placement that achieves it.
#[derive(Debug, Clone)]
pub struct EdgeCost {
    /// Quadric error at the placement; `f64::INFINITY` for forbidden
    /// collapses.
    pub cost: f64,
    /// Absent exactly when the cost is infinite.
    pub placement: Option<Placement>,
}

impl EdgeCost {
    fn infinite() -> Self {
        Self {
            cost: f64::INFINITY,
            placement: None,
        }
    }

    fn new(cost: f64, placement: Placement) -> Self {
        Self {
            cost,
            placement: Some(placement),
        }
    }
}

/// Evaluate the decision tree for one edge.
#[must_use]
pub fn edge_cost(state: &DecimationState, edge_id: u32, strictness: Strictness) -> EdgeCost {
    let edge = &state.flaps.edges[edge_id as usize];
    if edge.is_deleted() || edge.is_boundary() {
        return EdgeCost::infinite();
    }
    // A two-face pillow collapse can leave its last edge flapping dead
    // faces; such an edge is not a candidate.
    if edge.face.iter().any(|&f| !state.face_alive[f as usize]) {
        return EdgeCost::infinite();
    }
    let (a, b) = (edge.v[0], edge.v[1]);
    if state.boundary_vertex[a as usize] || state.boundary_vertex[b as usize] {
        return EdgeCost::infinite();
    }

    let seam_a = state.seams.is_seam_vertex(a);
    let seam_b = state.seams.is_seam_vertex(b);

    if state.seams.is_seam_edge(a, b) {
        seam_edge_cost(state, edge_id, strictness)
    } else if seam_a && seam_b {
        // Collapsing would splice two unrelated seam chains.
        EdgeCost::infinite()
    } else if seam_a {
        fixed_endpoint_cost(state, edge_id, a)
    } else if seam_b {
        fixed_endpoint_cost(state, edge_id, b)
    } else {
        interior_cost(state, edge_id)
    }
}

/// Collapse exactly onto `fixed`, used when one endpoint must not move.
fn fixed_endpoint_cost(state: &DecimationState, edge_id: u32, fixed: u32) -> EdgeCost {
    let edge = &state.flaps.edges[edge_id as usize];
    let (a, b) = (edge.v[0], edge.v[1]);
    let f0 = edge.face[0];

    let metric = state
        .wedges
        .get(a, state.tc_of(f0, a))
        .plus(&state.wedges.get(b, state.tc_of(f0, b)));

    let position = state.positions[fixed as usize];
    let uv = state.texcoords[state.tc_of(f0, fixed) as usize];
    let cost = metric.evaluate(&lift(position, uv));
    EdgeCost::new(
        cost,
        Placement {
            position,
            uvs: PlacementUvs::Single { uv, metric },
        },
    )
}

/// Optimal placement for an interior edge away from every seam.
///
/// Minimizes the combined 6x6 quadric over homogeneous (x, y, z, u, v, w)
/// with the single equality w = 1; a non-finite solve falls back to the
/// edge midpoint.
fn interior_cost(state: &DecimationState, edge_id: u32) -> EdgeCost {
    let edge = &state.flaps.edges[edge_id as usize];
    let (a, b) = (edge.v[0], edge.v[1]);
    let f0 = edge.face[0];
    let (tc_a, tc_b) = (state.tc_of(f0, a), state.tc_of(f0, b));

    let metric = state.wedges.get(a, tc_a).plus(&state.wedges.get(b, tc_b));

    let mut g = DMatrix::zeros(6, 6);
    for i in 0..6 {
        for j in 0..6 {
            g[(i, j)] = 2.0 * metric.matrix()[(i, j)];
        }
        g[(i, i)] += 2.0 * REGULARIZER;
    }
    let g0 = DVector::zeros(6);

    let mut ce = DMatrix::zeros(6, 1);
    ce[(5, 0)] = 1.0;
    let ce0 = DVector::from_element(1, -1.0);
    let ci = DMatrix::zeros(6, 0);
    let ci0 = DVector::zeros(0);

    let solution = solve_quadprog(g, &g0, &ce, &ce0, &ci, &ci0);
    let (position, uv) = if solution.is_feasible() && solution.x.iter().all(|v| v.is_finite()) {
        (
            Point3::new(solution.x[0], solution.x[1], solution.x[2]),
            Point2::new(solution.x[3], solution.x[4]),
        )
    } else {
        let pa = state.positions[a as usize];
        let pb = state.positions[b as usize];
        let ta = state.texcoords[tc_a as usize];
        let tb = state.texcoords[tc_b as usize];
        (pa + (pb - pa) * 0.5, ta + (tb - ta) * 0.5)
    };

    let cost = metric.evaluate(&lift(position, uv));
    EdgeCost::new(
        cost,
        Placement {
            position,
            uvs: PlacementUvs::Single { uv, metric },
        },
    )
}

/// Cost of a seam edge: both endpoints locked prices the edge out;
/// exactly one free end collapses onto the fixed one; two free ends run
/// the 8-unknown constrained QP along the seam segment.
fn seam_edge_cost(state: &DecimationState, edge_id: u32, strictness: Strictness) -> EdgeCost {
    let edge = &state.flaps.edges[edge_id as usize];
    let (a, b) = (edge.v[0], edge.v[1]);

    let metrics = [side_metric(state, edge_id, 0), side_metric(state, edge_id, 1)];

    let free_a = seam_end_free(state, edge_id, a, b, strictness);
    let free_b = seam_end_free(state, edge_id, b, a, strictness);

    match (free_a, free_b) {
        (false, false) => EdgeCost::infinite(),
        (true, false) => seam_fixed_cost(state, edge_id, b, metrics),
        (false, true) => seam_fixed_cost(state, edge_id, a, metrics),
        (true, true) => {
            let solved = seam_qp_cost(state, edge_id, &metrics);
            solved.unwrap_or_else(|| {
                let at_a = seam_fixed_cost(state, edge_id, a, metrics);
                let at_b = seam_fixed_cost(state, edge_id, b, metrics);
                if at_a.cost <= at_b.cost {
                    at_a
                } else {
                    at_b
                }
            })
        }
    }
}

/// Combined wedge quadric of both endpoints on one side of the edge.
fn side_metric(state: &DecimationState, edge_id: u32, side: usize) -> Quadric {
    let edge = &state.flaps.edges[edge_id as usize];
    let (a, b) = (edge.v[0], edge.v[1]);
    let f = edge.face[side];
    state
        .wedges
        .get(a, state.tc_of(f, a))
        .plus(&state.wedges.get(b, state.tc_of(f, b)))
}

/// Seam-edge collapse onto the fixed endpoint, keeping both charts' UVs.
fn seam_fixed_cost(
    state: &DecimationState,
    edge_id: u32,
    fixed: u32,
    metrics: [Quadric; 2],
) -> EdgeCost {
    let edge = &state.flaps.edges[edge_id as usize];
    let position = state.positions[fixed as usize];

    let uvs = [
        state.texcoords[state.tc_of(edge.face[0], fixed) as usize],
        state.texcoords[state.tc_of(edge.face[1], fixed) as usize],
    ];
    let cost = metrics[0].evaluate(&lift(position, uvs[0]))
        + metrics[1].evaluate(&lift(position, uvs[1]));
    EdgeCost::new(
        cost,
        Placement {
            position,
            uvs: PlacementUvs::Seam { uvs, metrics },
        },
    )
}

/// The 8-unknown seam placement QP.
///
/// Unknowns are (position, side-0 UV, side-1 UV, seam parameter t); four
/// equalities tie each side's UV to its own chart's segment at the
/// shared t, two inequalities bound t to [0, 1]. Returns `None` when the
/// solver fails to produce finite values, which sends the caller to the
/// fixed-endpoint fallback.
fn seam_qp_cost(
    state: &DecimationState,
    edge_id: u32,
    metrics: &[Quadric; 2],
) -> Option<EdgeCost> {
    let edge = &state.flaps.edges[edge_id as usize];
    let (a, b) = (edge.v[0], edge.v[1]);

    // x layout: [px, py, pz, u0, v0, u1, v1, t]; per side, the 5D
    // coordinates (p, uv_side) pick these x indices.
    const SIDE_INDEX: [[usize; 5]; 2] = [[0, 1, 2, 3, 4], [0, 1, 2, 5, 6]];

    let mut g = DMatrix::zeros(8, 8);
    let mut g0 = DVector::zeros(8);
    for (side, metric) in metrics.iter().enumerate() {
        let a_block = metric.a_block();
        let b_vec = metric.b_vec();
        for i in 0..5 {
            for j in 0..5 {
                g[(SIDE_INDEX[side][i], SIDE_INDEX[side][j])] += 2.0 * a_block[(i, j)];
            }
            g0[SIDE_INDEX[side][i]] += 2.0 * b_vec[i];
        }
    }
    for i in 0..8 {
        g[(i, i)] += 2.0 * REGULARIZER;
    }

    // uv_side = uv_side(a) + t * (uv_side(b) - uv_side(a)).
    let mut ce = DMatrix::zeros(8, 4);
    let mut ce0 = DVector::zeros(4);
    for side in 0..2 {
        let f = edge.face[side];
        let uv_a = state.texcoords[state.tc_of(f, a) as usize];
        let uv_b = state.texcoords[state.tc_of(f, b) as usize];
        let delta = uv_b - uv_a;
        for axis in 0..2 {
            let k = 2 * side + axis;
            ce[(3 + k, k)] = 1.0;
            ce[(7, k)] = -delta[axis];
            ce0[k] = -uv_a[axis];
        }
    }

    // 0 <= t <= 1.
    let mut ci = DMatrix::zeros(8, 2);
    ci[(7, 0)] = 1.0;
    ci[(7, 1)] = -1.0;
    let mut ci0 = DVector::zeros(2);
    ci0[1] = 1.0;

    let solution = solve_quadprog(g, &g0, &ce, &ce0, &ci, &ci0);
    if !solution.is_feasible() || solution.x.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let position = Point3::new(solution.x[0], solution.x[1], solution.x[2]);
    let uvs = [
        Point2::new(solution.x[3], solution.x[4]),
        Point2::new(solution.x[5], solution.x[6]),
    ];
    let cost = metrics[0].evaluate(&lift(position, uvs[0]))
        + metrics[1].evaluate(&lift(position, uvs[1]));
    Some(EdgeCost::new(
        cost,
        Placement {
            position,
            uvs: PlacementUvs::Seam {
                uvs,
                metrics: *metrics,
            },
        },
    ))
}

/// Whether seam endpoint `v` may slide along the seam toward `other`.
///
/// Junctions never move. A chain end (no seam neighbor besides `other`)
/// is trivially free. Otherwise the UV step ratios toward the far
/// neighbor are computed independently on both sides of the seam, paired
/// by the texcoord slot at `v`, and judged by the strictness rule.
fn seam_end_free(
    state: &DecimationState,
    edge_id: u32,
    v: u32,
    other: u32,
    strictness: Strictness,
) -> bool {
    if state.seams.is_junction(v) {
        return false;
    }
    let far: Vec<u32> = state
        .seams
        .neighbors_of(v)
        .iter()
        .copied()
        .filter(|&n| n != other)
        .collect();
    let Some(&n) = far.first() else {
        // Chain end: nothing constrains the parameterization past v.
        return true;
    };
    if strictness == Strictness::Permissive {
        return true;
    }

    let Some(far_edge) = state.flaps.edge_between(v, n) else {
        return false;
    };
    let far_edge = &state.flaps.edges[far_edge as usize];
    if far_edge.is_deleted() || far_edge.is_boundary() {
        return false;
    }

    let edge = &state.flaps.edges[edge_id as usize];
    let mut ratios = [f64::INFINITY; 2];
    for side in 0..2 {
        let f = edge.face[side];
        let tc_v = state.tc_of(f, v);
        let uv_v = state.texcoords[tc_v as usize];
        let uv_other = state.texcoords[state.tc_of(f, other) as usize];

        // Find the far edge's side sharing the same wedge at v.
        let mut uv_n = None;
        for far_side in 0..2 {
            let fg = far_edge.face[far_side];
            if state.tc_of(fg, v) == tc_v {
                uv_n = Some(state.texcoords[state.tc_of(fg, n) as usize]);
                break;
            }
        }
        let Some(uv_n) = uv_n else {
            return false;
        };

        let denom = (uv_v - uv_n).norm();
        if denom > 0.0 {
            ratios[side] = (uv_v - uv_other).norm() / denom;
        }
    }

    match strictness {
        Strictness::Permissive => true,
        Strictness::Finite => ratios.iter().all(|r| r.is_finite()),
        Strictness::Equal => {
            ratios.iter().all(|r| r.is_finite()) && (ratios[0] - ratios[1]).abs() <= RATIO_TOLERANCE
        }
    }
}
