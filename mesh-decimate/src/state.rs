//! Owned per-run decimation context.
//!
//! Every run builds one [`DecimationState`] from the input mesh and
//! mutates it in place until compaction. Nothing here is shared between
//! runs; distinct meshes can decimate in parallel with zero shared state.

use crate::connectivity::{EdgeFlaps, INVALID};
use crate::quadric::{lift, Quadric, WedgeQuadrics};
use crate::seam::{texcoord_slot, SeamTable};
use crate::DecimateError;
use hashbrown::HashSet;
use mesh_types::TexturedMesh;
use nalgebra::{Point2, Point3};

/// Mutable working copy of the mesh plus all derived structures.
#[derive(Debug)]
pub struct DecimationState {
    /// Vertex positions, indexed by vertex id.
    pub positions: Vec<Point3<f64>>,
    /// Texture coordinates, indexed by texcoord slot.
    pub texcoords: Vec<Point2<f64>>,
    /// Face vertex indices; dead faces keep stale content and are skipped
    /// via `face_alive`.
    pub faces: Vec<[u32; 3]>,
    /// Per-face texcoord slots, parallel to `faces`.
    pub face_texcoords: Vec<[u32; 3]>,
    /// Edge-flap connectivity, maintained through collapses.
    pub flaps: EdgeFlaps,
    /// Seam edges and seam-chain adjacency.
    pub seams: SeamTable,
    /// Per-wedge error quadrics.
    pub wedges: WedgeQuadrics,
    /// Vertices incident to a boundary edge; never moved.
    pub boundary_vertex: Vec<bool>,
    /// Liveness per vertex.
    pub vertex_alive: Vec<bool>,
    /// Liveness per face.
    pub face_alive: Vec<bool>,
    /// Count of live vertices.
    pub live_vertices: usize,
    /// Count of live faces.
    pub live_faces: usize,
    /// Whether texcoords were synthesized because the input had none.
    pub synthetic_uvs: bool,
}

impl DecimationState {
    /// Build the full context for one run.
    ///
    /// A mesh without texture coordinates gets a synthetic all-zero UV
    /// per vertex so the 5D quadric math runs unchanged; the synthetic
    /// channel produces no seams and is dropped again at compaction.
    ///
    /// # Errors
    ///
    /// [`DecimateError::NonManifoldEdge`] when connectivity cannot be
    /// built.
    pub fn build(mesh: &TexturedMesh) -> Result<Self, DecimateError> {
        let positions = mesh.positions.clone();
        let faces = mesh.faces.clone();

        let synthetic_uvs = !mesh.has_texcoords();
        let (texcoords, face_texcoords) = if synthetic_uvs {
            (vec![Point2::origin(); positions.len()], faces.clone())
        } else {
            (mesh.texcoords.clone(), mesh.face_texcoords.clone())
        };

        let flaps = EdgeFlaps::build(&faces)?;
        let seams = SeamTable::detect(&faces, &face_texcoords, &texcoords, &flaps);
        let boundary_vertex = flaps.boundary_vertices(positions.len());

        let mut wedges = WedgeQuadrics::with_capacity(texcoords.len());
        for (face, ft) in faces.iter().zip(&face_texcoords) {
            let q = Quadric::from_face(
                lift(positions[face[0] as usize], texcoords[ft[0] as usize]),
                lift(positions[face[1] as usize], texcoords[ft[1] as usize]),
                lift(positions[face[2] as usize], texcoords[ft[2] as usize]),
            );
            for corner in 0..3 {
                wedges.accumulate(face[corner], ft[corner], &q);
            }
        }

        let live_vertices = positions.len();
        let live_faces = faces.len();
        Ok(Self {
            vertex_alive: vec![true; positions.len()],
            face_alive: vec![true; faces.len()],
            positions,
            texcoords,
            faces,
            face_texcoords,
            flaps,
            seams,
            wedges,
            boundary_vertex,
            live_vertices,
            live_faces,
            synthetic_uvs,
        })
    }

    /// The texcoord slot `face_id` uses for vertex `v`.
    #[inline]
    #[must_use]
    pub fn tc_of(&self, face_id: u32, v: u32) -> u32 {
        texcoord_slot(
            &self.faces[face_id as usize],
            &self.face_texcoords[face_id as usize],
            v,
        )
    }

    /// Live one-ring faces of `v`, found by flooding across edges that
    /// contain `v` starting from `start_face`.
    ///
    /// The flood carries an explicit visited set, so a (contract-
    /// violating) non-manifold neighborhood terminates instead of
    /// spinning.
    #[must_use]
    pub fn ring_faces(&self, v: u32, start_face: u32) -> Vec<u32> {
        let mut visited: HashSet<u32> = HashSet::new();
        let mut stack = vec![start_face];
        let mut ring = Vec::new();

        while let Some(f) = stack.pop() {
            if f == INVALID || !visited.insert(f) {
                continue;
            }
            if !self.face_alive[f as usize] {
                continue;
            }
            ring.push(f);
            for corner in 0..3 {
                let e = self.flaps.corner_edges[f as usize][corner];
                if e == INVALID {
                    continue;
                }
                let edge = &self.flaps.edges[e as usize];
                if edge.is_deleted() || !edge.has_vertex(v) {
                    continue;
                }
                for &g in &edge.face {
                    if g != INVALID && !visited.contains(&g) {
                        stack.push(g);
                    }
                }
            }
        }
        ring
    }

    /// The one-ring neighbor vertices of `v`, via [`Self::ring_faces`].
    #[must_use]
    pub fn ring_vertices(&self, v: u32, start_face: u32) -> Vec<u32> {
        let mut neighbors = Vec::new();
        for f in self.ring_faces(v, start_face) {
            for &w in &self.faces[f as usize] {
                if w != v && !neighbors.contains(&w) {
                    neighbors.push(w);
                }
            }
        }
        neighbors
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::{octahedron, uv_grid};

    #[test]
    fn test_build_octahedron() {
        let state = DecimationState::build(&octahedron()).unwrap();
        assert_eq!(state.live_vertices, 6);
        assert_eq!(state.live_faces, 8);
        assert!(!state.synthetic_uvs);
        assert_eq!(state.flaps.edges.len(), 12);
        assert!(state.boundary_vertex.iter().all(|&b| !b));
    }

    #[test]
    fn test_synthetic_uvs_for_bare_mesh() {
        let mut mesh = octahedron();
        mesh.texcoords.clear();
        mesh.face_texcoords.clear();

        let state = DecimationState::build(&mesh).unwrap();
        assert!(state.synthetic_uvs);
        assert_eq!(state.texcoords.len(), 6);
        assert_eq!(state.face_texcoords, state.faces);
        assert_eq!(state.seams.edge_count(), 0);
    }

    #[test]
    fn test_ring_faces_cover_the_fan() {
        let state = DecimationState::build(&octahedron()).unwrap();
        // Every octahedron vertex has valence 4.
        for v in 0..6u32 {
            let start = state
                .faces
                .iter()
                .position(|f| f.contains(&v))
                .unwrap();
            #[allow(clippy::cast_possible_truncation)]
            let ring = state.ring_faces(v, start as u32);
            assert_eq!(ring.len(), 4, "vertex {v}");
            assert_eq!(state.ring_vertices(v, start as u32).len(), 4);
        }
    }

    #[test]
    fn test_grid_boundary_flags() {
        let state = DecimationState::build(&uv_grid(3, 3)).unwrap();
        // On a 3x3 grid only the center vertex is interior.
        let interior: Vec<usize> = state
            .boundary_vertex
            .iter()
            .enumerate()
            .filter(|(_, &b)| !b)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(interior, vec![4]);
    }
}
