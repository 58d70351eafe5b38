//! Texture-seam detection and bookkeeping.
//!
//! An interior edge is a seam when its two adjacent faces disagree on the
//! texture coordinates of the edge's endpoints. Seam edges form chains
//! along chart boundaries; the table tracks the chains as a vertex
//! adjacency so the placement solver can reason about chain neighbors
//! and junctions.

use crate::connectivity::{canonical, EdgeFlaps, INVALID};
use hashbrown::{HashMap, HashSet};
use nalgebra::Point2;

/// UV comparison tolerance for seam detection.
const SEAM_EPSILON: f64 = 1e-9;

/// Seam edges and per-vertex seam adjacency.
#[derive(Debug, Clone, Default)]
pub struct SeamTable {
    edges: HashSet<(u32, u32)>,
    neighbors: HashMap<u32, Vec<u32>>,
}

impl SeamTable {
    /// Detect seam edges over built connectivity.
    ///
    /// For every interior edge, the UVs each side assigns to the two
    /// endpoints are compared in both cyclic orders; any mismatch within
    /// tolerance marks the edge as a seam and links its endpoints in the
    /// seam adjacency.
    #[must_use]
    pub fn detect(
        faces: &[[u32; 3]],
        face_texcoords: &[[u32; 3]],
        texcoords: &[Point2<f64>],
        flaps: &EdgeFlaps,
    ) -> Self {
        let mut table = Self::default();
        if texcoords.is_empty() {
            return table;
        }

        for edge in &flaps.edges {
            if edge.is_deleted() || edge.is_boundary() {
                continue;
            }
            let (a, b) = (edge.v[0], edge.v[1]);

            let uv_of = |f: u32, v: u32| -> Point2<f64> {
                let face = faces[f as usize];
                let ft = face_texcoords[f as usize];
                for i in 0..3 {
                    if face[i] == v {
                        return texcoords[ft[i] as usize];
                    }
                }
                unreachable!("edge endpoint not found in adjacent face");
            };

            let a0 = uv_of(edge.face[0], a);
            let b0 = uv_of(edge.face[0], b);
            let a1 = uv_of(edge.face[1], a);
            let b1 = uv_of(edge.face[1], b);

            let direct = uv_eq(a0, a1) && uv_eq(b0, b1);
            let crossed = uv_eq(a0, b1) && uv_eq(b0, a1);
            if !direct && !crossed {
                table.insert(a, b);
            }
        }

        table
    }

    fn insert(&mut self, a: u32, b: u32) {
        if self.edges.insert(canonical(a, b)) {
            let na = self.neighbors.entry(a).or_default();
            if !na.contains(&b) {
                na.push(b);
            }
            let nb = self.neighbors.entry(b).or_default();
            if !nb.contains(&a) {
                nb.push(a);
            }
        }
    }

    /// Whether the edge between two vertices is a seam edge.
    #[inline]
    #[must_use]
    pub fn is_seam_edge(&self, a: u32, b: u32) -> bool {
        self.edges.contains(&canonical(a, b))
    }

    /// Whether the vertex lies on any seam.
    #[inline]
    #[must_use]
    pub fn is_seam_vertex(&self, v: u32) -> bool {
        self.neighbors.get(&v).is_some_and(|n| !n.is_empty())
    }

    /// Seam-chain neighbors of a vertex.
    #[must_use]
    pub fn neighbors_of(&self, v: u32) -> &[u32] {
        self.neighbors.get(&v).map_or(&[], Vec::as_slice)
    }

    /// More than two seam neighbors marks an immovable chart junction.
    #[inline]
    #[must_use]
    pub fn is_junction(&self, v: u32) -> bool {
        self.neighbors_of(v).len() > 2
    }

    /// Number of seam edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Apply an edge collapse: the seam edge between `survivor` and `dead`
    /// (if any) disappears, and every other seam reference to `dead` is
    /// renamed to `survivor`.
    pub fn collapse(&mut self, survivor: u32, dead: u32) {
        self.edges.remove(&canonical(survivor, dead));

        let dead_neighbors = self.neighbors.remove(&dead).unwrap_or_default();
        for n in dead_neighbors {
            if n == survivor {
                continue;
            }
            self.edges.remove(&canonical(dead, n));
            self.edges.insert(canonical(survivor, n));

            if let Some(list) = self.neighbors.get_mut(&n) {
                list.retain(|&x| x != dead);
                if !list.contains(&survivor) {
                    list.push(survivor);
                }
            }
            let list = self.neighbors.entry(survivor).or_default();
            if !list.contains(&n) {
                list.push(n);
            }
        }

        if let Some(list) = self.neighbors.get_mut(&survivor) {
            list.retain(|&x| x != dead);
            if list.is_empty() {
                self.neighbors.remove(&survivor);
            }
        }
    }
}

/// The texcoord slot a face uses for vertex `v`, [`INVALID`] when the face
/// does not reference `v`.
#[must_use]
pub fn texcoord_slot(face: &[u32; 3], face_texcoord: &[u32; 3], v: u32) -> u32 {
    for i in 0..3 {
        if face[i] == v {
            return face_texcoord[i];
        }
    }
    INVALID
}

#[inline]
fn uv_eq(a: Point2<f64>, b: Point2<f64>) -> bool {
    (a.x - b.x).abs() <= SEAM_EPSILON && (a.y - b.y).abs() <= SEAM_EPSILON
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::{octahedron, seamed_cube, uv_grid};

    fn detect_for(mesh: &mesh_types::TexturedMesh) -> (SeamTable, EdgeFlaps) {
        let flaps = EdgeFlaps::build(&mesh.faces).unwrap();
        let table = SeamTable::detect(&mesh.faces, &mesh.face_texcoords, &mesh.texcoords, &flaps);
        (table, flaps)
    }

    #[test]
    fn test_octahedron_has_no_seams() {
        let mesh = octahedron();
        let (table, _) = detect_for(&mesh);
        assert_eq!(table.edge_count(), 0);
        assert!(!table.is_seam_vertex(0));
    }

    #[test]
    fn test_grid_has_no_seams() {
        let mesh = uv_grid(4, 4);
        let (table, _) = detect_for(&mesh);
        assert_eq!(table.edge_count(), 0);
    }

    #[test]
    fn test_seamed_cube_ring_edges_are_seams() {
        let mesh = seamed_cube();
        let (table, _) = detect_for(&mesh);

        // Bottom ring, top ring and the vertical wrap edge are seams.
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
            assert!(table.is_seam_edge(a, b), "bottom ring edge ({a},{b})");
            assert!(table.is_seam_edge(a + 4, b + 4), "top ring edge");
        }
        assert!(table.is_seam_edge(0, 4), "strip wrap edge");

        // Face diagonals are not seams.
        assert!(!table.is_seam_edge(0, 2));
        assert!(!table.is_seam_edge(1, 5));
    }

    #[test]
    fn test_seamed_cube_junctions() {
        let mesh = seamed_cube();
        let (table, _) = detect_for(&mesh);

        // Vertices 0 and 4 sit where the wrap seam meets a ring seam:
        // three seam neighbors each.
        assert!(table.is_junction(0));
        assert!(table.is_junction(4));
        // A plain ring vertex has exactly two seam neighbors.
        assert_eq!(table.neighbors_of(1).len(), 2);
        assert!(!table.is_junction(1));
    }

    #[test]
    fn test_collapse_renames_chain() {
        let mut table = SeamTable::default();
        table.insert(1, 2);
        table.insert(2, 3);

        // Collapse 2 into 1: chain (1)-(2)-(3) becomes (1)-(3).
        table.collapse(1, 2);
        assert!(!table.is_seam_edge(1, 2));
        assert!(table.is_seam_edge(1, 3));
        assert!(!table.is_seam_vertex(2));
        assert_eq!(table.neighbors_of(1), &[3]);
        assert_eq!(table.neighbors_of(3), &[1]);
    }
}
