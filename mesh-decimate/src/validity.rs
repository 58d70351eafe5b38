//! Pre-collapse legality tests.
//!
//! Both tests run before any mutation; a failure aborts only the current
//! attempt and the driver moves on to the next candidate.

use crate::cost::{Placement, PlacementUvs};
use crate::state::DecimationState;
use nalgebra::{Point2, Vector2};

/// Signed areas below this are treated as degenerate and skipped.
const AREA_EPSILON: f64 = 1e-12;

/// Face normals shorter than this cannot carry an orientation.
const NORMAL_EPSILON: f64 = 1e-12;

/// Run every legality test for collapsing `edge_id` to `placement`.
#[must_use]
pub fn collapse_valid(state: &DecimationState, edge_id: u32, placement: &Placement) -> bool {
    link_condition_ok(state, edge_id) && no_foldover(state, edge_id, placement)
}

/// The link condition: the endpoints may share at most two one-ring
/// neighbors (the opposite corners of the edge's two faces). A third
/// common neighbor means the collapse would pinch unrelated regions
/// into a non-manifold junction.
#[must_use]
pub fn link_condition_ok(state: &DecimationState, edge_id: u32) -> bool {
    let edge = &state.flaps.edges[edge_id as usize];
    let (a, b) = (edge.v[0], edge.v[1]);
    let start = edge.face[0];

    let ring_a = state.ring_vertices(a, start);
    let ring_b = state.ring_vertices(b, start);
    let common = ring_a
        .iter()
        .filter(|&&w| w != a && w != b && ring_b.contains(&w))
        .count();
    common <= 2
}

/// Reject placements that invert a one-ring triangle in UV space or flip
/// its 3D orientation.
///
/// The two faces adjacent to the edge are excluded (they die in the
/// collapse). UV sides are checked independently: for a seam placement
/// the replacement UV is matched to the face's wedge at the moving
/// vertex. Degenerate old triangles (synthetic or collapsed UVs) are
/// skipped so they stay collapsible.
#[must_use]
pub fn no_foldover(state: &DecimationState, edge_id: u32, placement: &Placement) -> bool {
    let edge = &state.flaps.edges[edge_id as usize];
    let dead = edge.face;

    for &v in &edge.v {
        for f in state.ring_faces(v, edge.face[0]) {
            if dead.contains(&f) {
                continue;
            }
            let face = state.faces[f as usize];
            let ft = state.face_texcoords[f as usize];
            let Some(k) = face.iter().position(|&w| w == v) else {
                continue;
            };
            let (p, q) = ((k + 1) % 3, (k + 2) % 3);

            // 3D orientation.
            let pv_old = state.positions[v as usize];
            let pp = state.positions[face[p] as usize];
            let pq = state.positions[face[q] as usize];
            let n_old = (pp - pv_old).cross(&(pq - pv_old));
            let n_new = (pp - placement.position).cross(&(pq - placement.position));
            if n_old.norm() > NORMAL_EPSILON
                && n_new.norm() > NORMAL_EPSILON
                && n_old.dot(&n_new) < 0.0
            {
                return false;
            }

            // UV orientation, per wedge.
            let uv_old = state.texcoords[ft[k] as usize];
            let uv_new = replacement_uv(state, edge_id, v, ft[k], placement);
            let uv_p = state.texcoords[ft[p] as usize];
            let uv_q = state.texcoords[ft[q] as usize];
            let area_old = cross2(uv_p - uv_old, uv_q - uv_old);
            if area_old.abs() <= AREA_EPSILON {
                continue;
            }
            let area_new = cross2(uv_p - uv_new, uv_q - uv_new);
            if area_old * area_new <= 0.0 {
                return false;
            }
        }
    }
    true
}

/// The UV the moving vertex takes inside the wedge keyed by `tc`.
fn replacement_uv(
    state: &DecimationState,
    edge_id: u32,
    v: u32,
    tc: u32,
    placement: &Placement,
) -> Point2<f64> {
    match &placement.uvs {
        PlacementUvs::Single { uv, .. } => *uv,
        PlacementUvs::Seam { uvs, .. } => {
            let edge = &state.flaps.edges[edge_id as usize];
            for side in 0..2 {
                if state.tc_of(edge.face[side], v) == tc {
                    return uvs[side];
                }
            }
            // No slot match (duplicated texcoords); pick the side whose
            // current corner UV is nearest.
            let current = state.texcoords[tc as usize];
            let mut best = uvs[0];
            let mut best_dist = f64::INFINITY;
            for side in 0..2 {
                let side_tc = state.tc_of(edge.face[side], v);
                let d = (state.texcoords[side_tc as usize] - current).norm();
                if d < best_dist {
                    best_dist = d;
                    best = uvs[side];
                }
            }
            best
        }
    }
}

#[inline]
fn cross2(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x.mul_add(b.y, -(a.y * b.x))
}
