//! The edge-collapse executor.
//!
//! Runs only after the cost solver produced a placement and the validity
//! tests passed. One collapse is atomic with respect to the state: every
//! derived structure (flaps, seams, wedges, liveness) is updated before
//! control returns to the driver.

use crate::connectivity::INVALID;
use crate::cost::{Placement, PlacementUvs};
use crate::state::DecimationState;
use hashbrown::HashMap;

/// What one committed collapse changed.
#[derive(Debug)]
pub struct CollapseOutcome {
    /// The vertex that absorbed the edge.
    pub survivor: u32,
    /// Edge ids retired by this collapse (the edge itself plus one per
    /// dead face).
    pub removed_edges: Vec<u32>,
    /// Live faces around the survivor whose edge costs are now stale.
    pub affected_faces: Vec<u32>,
}

/// Collapse `edge_id` onto `placement`.
///
/// The smaller endpoint survives. The edge's adjacent faces die; their
/// outer edges are spliced so each far face takes the dead face's place
/// in the flap of the edge kept through the survivor. Every remaining
/// reference to the dead vertex (face corners, edge endpoints, seam
/// chains, wedge keys) is renamed to the survivor, merging texcoord
/// slots where the dead faces identified them.
pub fn collapse_edge(
    state: &mut DecimationState,
    edge_id: u32,
    placement: &Placement,
) -> CollapseOutcome {
    let edge = state.flaps.edges[edge_id as usize];
    let (a, b) = (edge.v[0], edge.v[1]);
    let (s, d) = if a < b { (a, b) } else { (b, a) };

    let dead_faces: Vec<u32> = edge.face.iter().copied().filter(|&f| f != INVALID).collect();
    let start = dead_faces[0];
    let ring_s = state.ring_faces(s, start);
    let ring_d = state.ring_faces(d, start);

    // Texcoord slots the dead faces identify across the edge.
    let mut tc_map: HashMap<u32, u32> = HashMap::new();
    for &f in &dead_faces {
        let tc_d = state.tc_of(f, d);
        let tc_s = state.tc_of(f, s);
        if tc_d != INVALID && tc_s != INVALID && tc_d != tc_s {
            tc_map.insert(tc_d, tc_s);
        }
    }

    state.positions[s as usize] = placement.position;
    match &placement.uvs {
        PlacementUvs::Single { uv, .. } => {
            for &f in &dead_faces {
                let tc = state.tc_of(f, s) as usize;
                state.texcoords[tc] = *uv;
            }
        }
        PlacementUvs::Seam { uvs, .. } => {
            for side in 0..2 {
                let f = edge.face[side];
                if f != INVALID {
                    let tc = state.tc_of(f, s) as usize;
                    state.texcoords[tc] = uvs[side];
                }
            }
        }
    }

    // Merge the dead vertex's wedges onto the survivor first, then
    // install the solved metrics on the wedges the collapse targeted.
    state.wedges.reparent(d, s, &tc_map);
    match &placement.uvs {
        PlacementUvs::Single { metric, .. } => {
            for &f in &dead_faces {
                state.wedges.set(s, state.tc_of(f, s), *metric);
            }
        }
        PlacementUvs::Seam { metrics, .. } => {
            for side in 0..2 {
                let f = edge.face[side];
                if f != INVALID {
                    state.wedges.set(s, state.tc_of(f, s), metrics[side]);
                }
            }
        }
    }

    // Kill each adjacent face and splice its far face into the kept edge.
    let mut removed_edges = vec![edge_id];
    for &f in &dead_faces {
        let face = state.faces[f as usize];
        let Some(k_s) = face.iter().position(|&w| w == s) else {
            continue;
        };
        let Some(k_d) = face.iter().position(|&w| w == d) else {
            continue;
        };
        let e_dead = state.flaps.corner_edges[f as usize][k_s];
        let e_kept = state.flaps.corner_edges[f as usize][k_d];

        let dead_edge = state.flaps.edges[e_dead as usize];
        if dead_edge.is_deleted() {
            // Both dead faces share the same opposite vertex (a pillow);
            // the shared outer edge was already retired by the first.
            state.face_alive[f as usize] = false;
            continue;
        }
        let (far_face, far_opposite) = match dead_edge.slot_of(f) {
            Some(slot) => (dead_edge.face[1 - slot], dead_edge.opposite[1 - slot]),
            None => (INVALID, INVALID),
        };

        let kept = &mut state.flaps.edges[e_kept as usize];
        if let Some(slot) = kept.slot_of(f) {
            kept.face[slot] = far_face;
            kept.opposite[slot] = if far_face == INVALID {
                INVALID
            } else {
                far_opposite
            };
        }
        if far_face != INVALID {
            state.flaps.corner_edges[far_face as usize][far_opposite as usize] = e_kept;
        }

        state.flaps.retire(e_dead);
        removed_edges.push(e_dead);
        state.face_alive[f as usize] = false;
    }
    state.flaps.retire(edge_id);

    // Rename the dead vertex in the surviving ring: edges first, then
    // face corners with their texcoord slots.
    for &f in &ring_d {
        if !state.face_alive[f as usize] {
            continue;
        }
        for corner in 0..3 {
            let e = state.flaps.corner_edges[f as usize][corner];
            if e == INVALID || state.flaps.edges[e as usize].is_deleted() {
                continue;
            }
            if state.flaps.edges[e as usize].has_vertex(d) {
                state.flaps.rename_endpoint(e, d, s);
            }
        }
    }
    for &f in &ring_d {
        if !state.face_alive[f as usize] {
            continue;
        }
        for corner in 0..3 {
            if state.faces[f as usize][corner] == d {
                state.faces[f as usize][corner] = s;
                let tc = state.face_texcoords[f as usize][corner];
                if let Some(&mapped) = tc_map.get(&tc) {
                    state.face_texcoords[f as usize][corner] = mapped;
                }
            }
        }
    }

    state.seams.collapse(s, d);
    state.vertex_alive[d as usize] = false;
    state.live_vertices -= 1;
    state.live_faces -= dead_faces
        .iter()
        .filter(|&&f| !state.face_alive[f as usize])
        .count();

    let mut affected_faces = Vec::with_capacity(ring_s.len() + ring_d.len());
    for f in ring_s.into_iter().chain(ring_d) {
        if state.face_alive[f as usize] && !affected_faces.contains(&f) {
            affected_faces.push(f);
        }
    }

    CollapseOutcome {
        survivor: s,
        removed_edges,
        affected_faces,
    }
}
