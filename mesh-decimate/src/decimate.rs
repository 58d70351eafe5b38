//! The greedy decimation loop.
//!
//! Pops the cheapest candidate, revalidates its cost lazily, checks
//! legality, commits the collapse and refreshes the survivor's one-ring.
//! Stale queue entries are re-inserted with fresh costs instead of being
//! eagerly propagated on every collapse; this keeps the per-collapse
//! work proportional to the one-ring size.

use crate::collapse::collapse_edge;
use crate::connectivity::INVALID;
use crate::cost::edge_cost;
use crate::heap::CostHeap;
use crate::state::DecimationState;
use crate::validity::collapse_valid;
use crate::{DecimateError, DecimateParams, DecimationResult, StopReason};
use mesh_types::TexturedMesh;
use tracing::{debug, info};

/// Consecutive unproductive queue pops tolerated before giving up.
const STALL_BUDGET: usize = 1000;

/// Relative tolerance for the lazy cost revalidation at pop time.
const STALE_TOLERANCE: f64 = 1e-6;

/// Decimate `mesh` down to the target described by `params`.
///
/// The input is never mutated. The returned mesh has dense, gap-free
/// index buffers; the accompanying statistics report how far the run
/// got and why it stopped. A target at or above the input vertex count
/// performs zero collapses and returns a structurally unchanged copy.
///
/// # Errors
///
/// [`DecimateError::InvalidMesh`] for out-of-range indices or mismatched
/// buffer lengths, [`DecimateError::NonManifoldEdge`] when an edge has
/// more than two adjacent faces. Geometric dead ends (boundaries, locked
/// seams, infeasible placements) are not errors; they end the run early
/// with a [`StopReason`].
///
/// # Examples
///
/// ```
/// use mesh_decimate::{decimate_mesh, DecimateParams};
/// use mesh_types::octahedron;
///
/// let result = decimate_mesh(&octahedron(), &DecimateParams::new().with_target_vertices(4))?;
/// assert_eq!(result.final_vertices, 4);
/// assert_eq!(result.stop_reason.as_str(), "target_reached");
/// # Ok::<(), mesh_decimate::DecimateError>(())
/// ```
pub fn decimate_mesh(
    mesh: &TexturedMesh,
    params: &DecimateParams,
) -> Result<DecimationResult, DecimateError> {
    mesh.validate()?;

    let original_vertices = mesh.vertex_count();
    let original_faces = mesh.face_count();
    let target = params.effective_target(original_vertices);

    if original_vertices <= target {
        return Ok(DecimationResult {
            mesh: mesh.clone(),
            original_vertices,
            final_vertices: original_vertices,
            original_faces,
            final_faces: original_faces,
            collapses: 0,
            stop_reason: StopReason::TargetReached,
        });
    }

    let mut state = DecimationState::build(mesh)?;
    info!(
        vertices = original_vertices,
        faces = original_faces,
        target,
        seam_edges = state.seams.edge_count(),
        wedges = state.wedges.len(),
        "starting decimation"
    );

    let edge_count = state.flaps.edges.len();
    let mut heap = CostHeap::new(edge_count);
    for id in 0..edge_count {
        #[allow(clippy::cast_possible_truncation)]
        let id = id as u32;
        if state.flaps.edges[id as usize].is_deleted() {
            continue;
        }
        heap.push(id, edge_cost(&state, id, params.strictness).cost);
    }
    debug!(edges = edge_count, queued = heap.len(), "seeded candidate queue");

    let mut stall = 0usize;
    let mut collapses = 0usize;
    let stop_reason = loop {
        if state.live_vertices <= target {
            break StopReason::TargetReached;
        }
        let Some((id, cached)) = heap.pop() else {
            break StopReason::EmptyQueue;
        };
        if state.flaps.edges[id as usize].is_deleted() {
            continue;
        }
        if cached.is_infinite() {
            stall += 1;
            heap.push(id, cached);
            if stall >= STALL_BUDGET {
                break StopReason::AllInfiniteCost;
            }
            continue;
        }

        let fresh = edge_cost(&state, id, params.strictness);
        if !costs_match(cached, fresh.cost) {
            // Stale entry; requeue at the fresh cost and keep going.
            heap.push(id, fresh.cost);
            continue;
        }
        let Some(placement) = fresh.placement else {
            stall += 1;
            if stall >= STALL_BUDGET {
                break StopReason::NoProgress;
            }
            continue;
        };

        if !collapse_valid(&state, id, &placement) {
            stall += 1;
            if stall >= STALL_BUDGET {
                break StopReason::NoProgress;
            }
            continue;
        }

        let outcome = collapse_edge(&mut state, id, &placement);
        collapses += 1;
        stall = 0;
        debug!(
            edge = id,
            cost = cached,
            survivor = outcome.survivor,
            vertices = state.live_vertices,
            "collapsed edge"
        );

        for &e in &outcome.removed_edges {
            heap.remove(e);
        }
        for &f in &outcome.affected_faces {
            for corner in 0..3 {
                let e = state.flaps.corner_edges[f as usize][corner];
                if e == INVALID || state.flaps.edges[e as usize].is_deleted() {
                    continue;
                }
                heap.push(e, edge_cost(&state, e, params.strictness).cost);
            }
        }
    };

    let out = compact(&state);
    let result = DecimationResult {
        original_vertices,
        final_vertices: out.vertex_count(),
        original_faces,
        final_faces: out.face_count(),
        mesh: out,
        collapses,
        stop_reason,
    };
    info!(
        final_vertices = result.final_vertices,
        final_faces = result.final_faces,
        collapses,
        stop_reason = %stop_reason,
        "decimation finished"
    );
    Ok(result)
}

/// Whether a cached queue cost is still trustworthy.
fn costs_match(cached: f64, fresh: f64) -> bool {
    if cached == fresh {
        return true;
    }
    // The relative test treats every finite value as within tolerance of
    // infinity; non-finite costs only match exactly.
    if !cached.is_finite() || !fresh.is_finite() {
        return false;
    }
    let scale = cached.abs().max(fresh.abs());
    (cached - fresh).abs() <= STALE_TOLERANCE * scale
}

/// Rewrite the surviving vertices, faces and texcoords into dense arrays
/// with order-preserving remapped indices.
fn compact(state: &DecimationState) -> TexturedMesh {
    let mut vertex_map = vec![INVALID; state.positions.len()];
    let mut out = TexturedMesh::with_capacity(state.live_vertices, state.live_faces);

    for (i, alive) in state.vertex_alive.iter().enumerate() {
        if *alive {
            #[allow(clippy::cast_possible_truncation)]
            {
                vertex_map[i] = out.positions.len() as u32;
            }
            out.positions.push(state.positions[i]);
        }
    }

    let keep_uvs = !state.synthetic_uvs;
    let mut tc_map = vec![INVALID; state.texcoords.len()];
    if keep_uvs {
        // Keep only texcoords referenced by live faces, in index order.
        let mut used = vec![false; state.texcoords.len()];
        for (f, alive) in state.face_alive.iter().enumerate() {
            if *alive {
                for &tc in &state.face_texcoords[f] {
                    used[tc as usize] = true;
                }
            }
        }
        for (i, used) in used.iter().enumerate() {
            if *used {
                #[allow(clippy::cast_possible_truncation)]
                {
                    tc_map[i] = out.texcoords.len() as u32;
                }
                out.texcoords.push(state.texcoords[i]);
            }
        }
    }

    for (f, alive) in state.face_alive.iter().enumerate() {
        if !*alive {
            continue;
        }
        let face = state.faces[f];
        out.faces.push([
            vertex_map[face[0] as usize],
            vertex_map[face[1] as usize],
            vertex_map[face[2] as usize],
        ]);
        if keep_uvs {
            let ft = state.face_texcoords[f];
            out.face_texcoords.push([
                tc_map[ft[0] as usize],
                tc_map[ft[1] as usize],
                tc_map[ft[2] as usize],
            ]);
        }
    }

    out
}
