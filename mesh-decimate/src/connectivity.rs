//! Edge-flap connectivity derived from a face list.
//!
//! Every undirected edge gets an id on first sight, keyed by its
//! canonical `(min, max)` vertex pair. Each edge records up to two
//! adjacent faces together with the local index of the corner opposite
//! the edge on each side, and each face records the edge id opposite
//! each of its corners. This gives O(1) lookups in both directions.
//!
//! The mesh is assumed to be 2-manifold: a third face on an edge fails
//! fast instead of silently corrupting the flaps.

use crate::error::DecimateError;
use hashbrown::HashMap;

/// Sentinel index for an absent face, edge or corner slot.
pub const INVALID: u32 = u32::MAX;

/// One undirected edge with its face flaps.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    /// Endpoint vertices; canonical `v[0] < v[1]` at build time (collapses
    /// rename endpoints in place afterwards).
    pub v: [u32; 2],
    /// Adjacent faces, [`INVALID`] when absent. Exactly one face marks a
    /// boundary edge.
    pub face: [u32; 2],
    /// Local corner index (0-2) opposite this edge in `face[i]`.
    pub opposite: [u32; 2],
}

impl Edge {
    /// Whether this edge has been retired by a collapse.
    #[inline]
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.v[0] == INVALID
    }

    /// Whether the edge has fewer than two adjacent faces.
    #[inline]
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.face[0] == INVALID || self.face[1] == INVALID
    }

    /// The slot (0 or 1) holding face `f`, if any.
    #[inline]
    #[must_use]
    pub fn slot_of(&self, f: u32) -> Option<usize> {
        if self.face[0] == f {
            Some(0)
        } else if self.face[1] == f {
            Some(1)
        } else {
            None
        }
    }

    /// Whether `v` is one of the endpoints.
    #[inline]
    #[must_use]
    pub fn has_vertex(&self, v: u32) -> bool {
        self.v[0] == v || self.v[1] == v
    }

}

/// Edge list plus face-corner adjacency for a triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct EdgeFlaps {
    /// All edges, indexed by edge id.
    pub edges: Vec<Edge>,
    /// Per face, the edge id opposite each corner.
    pub corner_edges: Vec<[u32; 3]>,
    /// Canonical `(min, max)` endpoint pair to edge id. Maintained through
    /// collapses so seam-chain queries stay O(1).
    pub lookup: HashMap<(u32, u32), u32>,
}

impl EdgeFlaps {
    /// Build the flaps for a face list.
    ///
    /// Faces are visited in order; each corner's opposite edge is keyed
    /// canonically, created on first sight and extended with the second
    /// face otherwise. The side a face occupies is chosen by whether its
    /// local corner order matches the canonical endpoint order.
    ///
    /// # Errors
    ///
    /// [`DecimateError::NonManifoldEdge`] when a third face shares an
    /// edge; the 2-manifold precondition is the caller's contract.
    pub fn build(faces: &[[u32; 3]]) -> Result<Self, DecimateError> {
        let mut edges: Vec<Edge> = Vec::with_capacity(faces.len() * 3 / 2);
        let mut corner_edges = vec![[INVALID; 3]; faces.len()];
        let mut lookup: HashMap<(u32, u32), u32> = HashMap::with_capacity(faces.len() * 3 / 2);

        for (f, face) in faces.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let f = f as u32;
            for corner in 0..3 {
                let a = face[(corner + 1) % 3];
                let b = face[(corner + 2) % 3];
                let key = canonical(a, b);
                // Side 0 iff the face traverses the edge in canonical order.
                let side = usize::from(a > b);

                #[allow(clippy::cast_possible_truncation)]
                let id = *lookup.entry(key).or_insert_with(|| {
                    edges.push(Edge {
                        v: [key.0, key.1],
                        face: [INVALID; 2],
                        opposite: [INVALID; 2],
                    });
                    (edges.len() - 1) as u32
                });

                let edge = &mut edges[id as usize];
                let slot = if edge.face[side] == INVALID {
                    side
                } else if edge.face[1 - side] == INVALID {
                    // Inconsistent winding; still manifold, use the free slot.
                    1 - side
                } else {
                    return Err(DecimateError::NonManifoldEdge {
                        v0: key.0,
                        v1: key.1,
                    });
                };
                edge.face[slot] = f;
                #[allow(clippy::cast_possible_truncation)]
                {
                    edge.opposite[slot] = corner as u32;
                }
                corner_edges[f as usize][corner] = id;
            }
        }

        Ok(Self {
            edges,
            corner_edges,
            lookup,
        })
    }

    /// Edge id between two vertices, if one exists.
    #[inline]
    #[must_use]
    pub fn edge_between(&self, a: u32, b: u32) -> Option<u32> {
        self.lookup.get(&canonical(a, b)).copied()
    }

    /// Flag every vertex incident to a boundary edge.
    #[must_use]
    pub fn boundary_vertices(&self, vertex_count: usize) -> Vec<bool> {
        let mut flags = vec![false; vertex_count];
        for edge in &self.edges {
            if edge.is_boundary() && !edge.is_deleted() {
                flags[edge.v[0] as usize] = true;
                flags[edge.v[1] as usize] = true;
            }
        }
        flags
    }

    /// Retire an edge and drop it from the canonical lookup.
    pub fn retire(&mut self, id: u32) {
        let edge = &mut self.edges[id as usize];
        if !edge.is_deleted() {
            self.lookup.remove(&canonical(edge.v[0], edge.v[1]));
            edge.v = [INVALID; 2];
            edge.face = [INVALID; 2];
        }
    }

    /// Rename endpoint `from` to `to` on edge `id`, keeping the lookup in
    /// sync.
    pub fn rename_endpoint(&mut self, id: u32, from: u32, to: u32) {
        let edge = &mut self.edges[id as usize];
        if edge.is_deleted() || !edge.has_vertex(from) {
            return;
        }
        self.lookup.remove(&canonical(edge.v[0], edge.v[1]));
        for v in &mut edge.v {
            if *v == from {
                *v = to;
            }
        }
        let key = canonical(edge.v[0], edge.v[1]);
        self.lookup.entry(key).or_insert(id);
    }
}

/// Canonical unordered edge key.
#[inline]
#[must_use]
pub fn canonical(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn two_triangles() -> Vec<[u32; 3]> {
        // Share edge (1, 2).
        vec![[0, 1, 2], [2, 1, 3]]
    }

    #[test]
    fn test_edge_count() {
        let flaps = EdgeFlaps::build(&two_triangles()).unwrap();
        assert_eq!(flaps.edges.len(), 5);
    }

    #[test]
    fn test_shared_edge_has_two_faces() {
        let flaps = EdgeFlaps::build(&two_triangles()).unwrap();
        let id = flaps.edge_between(1, 2).unwrap();
        let edge = flaps.edges[id as usize];
        assert!(!edge.is_boundary());

        // Opposite corners point at vertex 0 and vertex 3.
        let faces = [[0u32, 1, 2], [2, 1, 3]];
        let opp: Vec<u32> = (0..2)
            .map(|s| faces[edge.face[s] as usize][edge.opposite[s] as usize])
            .collect();
        assert!(opp.contains(&0));
        assert!(opp.contains(&3));
    }

    #[test]
    fn test_boundary_edges_have_one_face() {
        let flaps = EdgeFlaps::build(&two_triangles()).unwrap();
        for (a, b) in [(0, 1), (0, 2), (1, 3), (2, 3)] {
            let id = flaps.edge_between(a, b).unwrap();
            assert!(flaps.edges[id as usize].is_boundary());
        }
    }

    #[test]
    fn test_corner_edge_map_is_inverse() {
        let faces = two_triangles();
        let flaps = EdgeFlaps::build(&faces).unwrap();
        for (f, face) in faces.iter().enumerate() {
            for corner in 0..3 {
                let id = flaps.corner_edges[f][corner];
                let edge = flaps.edges[id as usize];
                let a = face[(corner + 1) % 3];
                let b = face[(corner + 2) % 3];
                assert_eq!(canonical(a, b), (edge.v[0], edge.v[1]));
            }
        }
    }

    #[test]
    fn test_boundary_vertices() {
        let flaps = EdgeFlaps::build(&two_triangles()).unwrap();
        let flags = flaps.boundary_vertices(4);
        // All four vertices touch the open border of this strip.
        assert_eq!(flags, vec![true; 4]);
    }

    #[test]
    fn test_non_manifold_is_rejected() {
        let faces = vec![[0, 1, 2], [0, 1, 3], [0, 1, 4]];
        let err = EdgeFlaps::build(&faces).unwrap_err();
        assert!(matches!(err, DecimateError::NonManifoldEdge { v0: 0, v1: 1 }));
    }

    #[test]
    fn test_rename_endpoint_updates_lookup() {
        let mut flaps = EdgeFlaps::build(&two_triangles()).unwrap();
        let id = flaps.edge_between(1, 3).unwrap();
        flaps.rename_endpoint(id, 3, 5);
        assert_eq!(flaps.edge_between(1, 5), Some(id));
        assert_eq!(flaps.edge_between(1, 3), None);
    }

    #[test]
    fn test_retire_removes_lookup() {
        let mut flaps = EdgeFlaps::build(&two_triangles()).unwrap();
        let id = flaps.edge_between(1, 2).unwrap();
        flaps.retire(id);
        assert_eq!(flaps.edge_between(1, 2), None);
        assert!(flaps.edges[id as usize].is_deleted());
    }
}
