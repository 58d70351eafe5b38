//! Procedural test meshes.
//!
//! Small deterministic shapes used across tests and benches. Each shape
//! carries a complete set of texture coordinates so the seam-aware code
//! paths are exercised end to end.

use crate::TexturedMesh;
use nalgebra::{Point2, Point3};

/// A closed octahedron: 6 vertices, 8 faces, no seams, no boundary edges.
///
/// UVs are a planar projection of the xy plane, one texcoord per vertex,
/// so every edge sees identical UVs from both sides.
#[must_use]
pub fn octahedron() -> TexturedMesh {
    let positions = vec![
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];

    let texcoords = positions
        .iter()
        .map(|p| Point2::new(f64::midpoint(p.x, 1.0), f64::midpoint(p.y, 1.0)))
        .collect();

    // CCW when viewed from outside
    let faces = vec![
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    let face_texcoords = faces.clone();

    TexturedMesh::from_parts(positions, faces, texcoords, face_texcoords)
}

/// A flat `nx` x `ny` vertex grid in the z=0 plane, single UV chart.
///
/// UVs equal the xy coordinates, so the chart is an isometric copy of the
/// surface and carries no seams.
///
/// # Panics
///
/// Panics if `nx < 2` or `ny < 2`.
#[must_use]
pub fn uv_grid(nx: u32, ny: u32) -> TexturedMesh {
    assert!(nx >= 2 && ny >= 2, "grid needs at least 2x2 vertices");

    let mut mesh = TexturedMesh::with_capacity((nx * ny) as usize, (2 * (nx - 1) * (ny - 1)) as usize);

    for j in 0..ny {
        for i in 0..nx {
            let x = f64::from(i) / f64::from(nx - 1);
            let y = f64::from(j) / f64::from(ny - 1);
            mesh.positions.push(Point3::new(x, y, 0.0));
            mesh.texcoords.push(Point2::new(x, y));
        }
    }

    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let v00 = j * nx + i;
            let v10 = v00 + 1;
            let v01 = v00 + nx;
            let v11 = v01 + 1;
            // CCW viewed from +z
            mesh.faces.push([v00, v10, v11]);
            mesh.faces.push([v00, v11, v01]);
        }
    }
    mesh.face_texcoords = mesh.faces.clone();

    mesh
}

/// A unit cube whose sides form one UV chart (an unwrapped strip) while
/// the top and bottom faces sit on separate charts.
///
/// The strip closes on itself, so the vertical edge where it wraps is a
/// seam, as is the entire top and bottom ring. Vertices 0-3 form the
/// bottom ring (z=0), 4-7 the top ring (z=1).
#[must_use]
pub fn seamed_cube() -> TexturedMesh {
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];

    let mut texcoords = Vec::with_capacity(18);
    // Bottom chart: texcoords 0-3 for vertices 0-3
    texcoords.push(Point2::new(0.0, 0.0));
    texcoords.push(Point2::new(1.0, 0.0));
    texcoords.push(Point2::new(1.0, 1.0));
    texcoords.push(Point2::new(0.0, 1.0));
    // Top chart: texcoords 4-7 for vertices 4-7
    texcoords.push(Point2::new(0.0, 0.0));
    texcoords.push(Point2::new(1.0, 0.0));
    texcoords.push(Point2::new(1.0, 1.0));
    texcoords.push(Point2::new(0.0, 1.0));
    // Side strip chart: columns k=0..=4 at u=k/4, bottom (v=0) then top (v=1).
    // Column 0 and column 4 both map to the 0/4 vertex pair: the strip's
    // closing seam.
    for k in 0..=4u32 {
        let u = f64::from(k) / 4.0;
        texcoords.push(Point2::new(u, 0.0));
        texcoords.push(Point2::new(u, 1.0));
    }

    let sb = |k: u32| 8 + 2 * k;
    let st = |k: u32| 8 + 2 * k + 1;

    let faces = vec![
        // Bottom (z=0), normal -Z
        [0, 2, 1],
        [0, 3, 2],
        // Top (z=1), normal +Z
        [4, 5, 6],
        [4, 6, 7],
        // Front (y=0), strip columns 0-1
        [0, 1, 5],
        [0, 5, 4],
        // Right (x=1), strip columns 1-2
        [1, 2, 6],
        [1, 6, 5],
        // Back (y=1), strip columns 2-3
        [3, 7, 6],
        [3, 6, 2],
        // Left (x=0), strip columns 3-4
        [0, 4, 7],
        [0, 7, 3],
    ];

    let face_texcoords = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [sb(0), sb(1), st(1)],
        [sb(0), st(1), st(0)],
        [sb(1), sb(2), st(2)],
        [sb(1), st(2), st(1)],
        [sb(3), st(3), st(2)],
        [sb(3), st(2), sb(2)],
        [sb(4), st(4), st(3)],
        [sb(4), st(3), sb(3)],
    ];

    TexturedMesh::from_parts(positions, faces, texcoords, face_texcoords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn octahedron_shape() {
        let mesh = octahedron();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 8);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn octahedron_is_closed() {
        let mesh = octahedron();
        // Every edge must appear in exactly two faces.
        let mut counts = std::collections::HashMap::new();
        for face in &mesh.faces {
            for i in 0..3 {
                let a = face[i];
                let b = face[(i + 1) % 3];
                let key = (a.min(b), a.max(b));
                *counts.entry(key).or_insert(0u32) += 1;
            }
        }
        assert_eq!(counts.len(), 12);
        assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn grid_shape() {
        let mesh = uv_grid(3, 3);
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.face_count(), 8);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn grid_uv_matches_position() {
        let mesh = uv_grid(4, 5);
        for (p, t) in mesh.positions.iter().zip(&mesh.texcoords) {
            assert_relative_eq!(p.x, t.x);
            assert_relative_eq!(p.y, t.y);
        }
    }

    #[test]
    fn seamed_cube_shape() {
        let mesh = seamed_cube();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.texcoords.len(), 18);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn seamed_cube_has_uv_mismatch_on_ring_edges() {
        let mesh = seamed_cube();
        // The bottom face and the front face share edge (0, 1) but
        // reference different texcoord indices for it.
        let bottom_tcs = mesh.face_texcoords[0];
        let front_tcs = mesh.face_texcoords[4];
        assert!(bottom_tcs.iter().all(|t| *t < 4));
        assert!(front_tcs.iter().all(|t| *t >= 8));
    }
}
