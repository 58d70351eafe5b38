//! End-to-end behavior of the public decimation API.

use mesh_decimate::{decimate_mesh, DecimateParams, StopReason, Strictness};
use mesh_types::{octahedron, seamed_cube, uv_grid, TexturedMesh};

fn uv_signed_area(mesh: &TexturedMesh, face: usize) -> f64 {
    let ft = mesh.face_texcoords[face];
    let a = mesh.texcoords[ft[0] as usize];
    let b = mesh.texcoords[ft[1] as usize];
    let c = mesh.texcoords[ft[2] as usize];
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[test]
fn octahedron_reaches_four_vertices_in_two_collapses() {
    let result =
        decimate_mesh(&octahedron(), &DecimateParams::new().with_target_vertices(4)).unwrap();

    assert_eq!(result.original_vertices, 6);
    assert_eq!(result.final_vertices, 4);
    assert_eq!(result.final_faces, 4);
    assert_eq!(result.collapses, 2);
    assert_eq!(result.stop_reason, StopReason::TargetReached);
    assert_eq!(result.stop_reason.as_str(), "target_reached");

    // The output is a valid closed tetrahedron.
    assert!(result.mesh.validate().is_ok());
    assert_eq!(result.mesh.positions.len(), 4);
    assert_eq!(result.mesh.faces.len(), 4);
}

#[test]
fn counts_never_grow() {
    for (mesh, percent) in [
        (octahedron(), 50.0),
        (uv_grid(6, 6), 40.0),
        (seamed_cube(), 50.0),
    ] {
        let result =
            decimate_mesh(&mesh, &DecimateParams::new().with_target_percent(percent)).unwrap();
        assert!(result.final_vertices <= result.original_vertices);
        assert!(result.final_faces <= result.original_faces);
        assert!(result.mesh.validate().is_ok());
    }
}

#[test]
fn full_target_is_idempotent() {
    let mesh = uv_grid(4, 4);
    #[allow(clippy::cast_possible_truncation)]
    let params = DecimateParams::new().with_target_vertices(mesh.vertex_count() as u32);
    let result = decimate_mesh(&mesh, &params).unwrap();

    assert_eq!(result.collapses, 0);
    assert_eq!(result.mesh.positions, mesh.positions);
    assert_eq!(result.mesh.faces, mesh.faces);
    assert_eq!(result.mesh.texcoords, mesh.texcoords);
    assert_eq!(result.mesh.face_texcoords, mesh.face_texcoords);
}

#[test]
fn boundary_vertices_are_immutable() {
    // Every vertex of a 3x3 grid except the center touches the boundary,
    // so no edge is collapsible at all.
    let mesh = uv_grid(3, 3);
    let result =
        decimate_mesh(&mesh, &DecimateParams::new().with_target_vertices(4)).unwrap();

    assert_eq!(result.final_vertices, 9);
    assert_eq!(result.collapses, 0);
    assert_eq!(result.stop_reason, StopReason::AllInfiniteCost);
    assert_eq!(result.mesh.positions, mesh.positions);
}

#[test]
fn grid_decimation_produces_no_uv_foldover() {
    let mesh = uv_grid(7, 7);
    let result = decimate_mesh(
        &mesh,
        &DecimateParams::new()
            .with_target_percent(50.0)
            .with_strictness(Strictness::Equal),
    )
    .unwrap();

    assert!(result.collapses > 0, "interior of a 7x7 grid must reduce");
    // Every input triangle has positive UV area; no output triangle may
    // have flipped.
    for f in 0..result.mesh.face_count() {
        assert!(
            uv_signed_area(&result.mesh, f) > 0.0,
            "face {f} folded over in UV space"
        );
    }
}

#[test]
fn stricter_seam_rules_keep_more_vertices() {
    let mesh = seamed_cube();
    let loose = decimate_mesh(
        &mesh,
        &DecimateParams::new()
            .with_target_percent(50.0)
            .with_strictness(Strictness::Permissive),
    )
    .unwrap();
    let strict = decimate_mesh(
        &mesh,
        &DecimateParams::new()
            .with_target_percent(50.0)
            .with_strictness(Strictness::Equal),
    )
    .unwrap();

    assert!(strict.final_vertices >= loose.final_vertices);
}

#[test]
fn seam_junctions_survive_decimation() {
    // Vertices 0 and 4 of the seamed cube are chart junctions; whatever
    // else collapses, their positions must come through unchanged.
    let result = decimate_mesh(
        &seamed_cube(),
        &DecimateParams::new().with_target_percent(50.0),
    )
    .unwrap();

    for target in [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0]] {
        let found = result.mesh.positions.iter().any(|p| {
            (p.x - target[0]).abs() < 1e-12
                && (p.y - target[1]).abs() < 1e-12
                && (p.z - target[2]).abs() < 1e-12
        });
        assert!(found, "junction at {target:?} moved or vanished");
    }
}

#[test]
fn seam_uvs_stay_on_chart_boundaries() {
    // Every texcoord of the seamed cube starts on the border of its
    // chart's unit square, and only seam edges are collapsible, so every
    // solved placement must land back on a border segment.
    let result = decimate_mesh(
        &seamed_cube(),
        &DecimateParams::new().with_target_vertices(6),
    )
    .unwrap();

    assert!(result.collapses > 0, "ring seams of the cube must reduce");
    let on_border_line = |x: f64| x.abs() < 1e-6 || (x - 1.0).abs() < 1e-6;
    for (i, t) in result.mesh.texcoords.iter().enumerate() {
        assert!(
            (-1e-6..=1.0 + 1e-6).contains(&t.x) && (-1e-6..=1.0 + 1e-6).contains(&t.y),
            "texcoord {i} left the unit square: {t}"
        );
        assert!(
            on_border_line(t.x) || on_border_line(t.y),
            "texcoord {i} left its chart boundary: {t}"
        );
    }
}

/// The 7-vertex triangulated torus: each vertex is adjacent to all six
/// others, so every edge has five common one-ring neighbors.
fn seven_vertex_torus() -> TexturedMesh {
    let positions = (0..7u32)
        .map(|i| {
            let angle = f64::from(i) * std::f64::consts::TAU / 7.0;
            mesh_types::Point3::new(angle.cos(), angle.sin(), f64::from((i * 3) % 7) / 7.0)
        })
        .collect();

    let mut faces = Vec::with_capacity(14);
    for i in 0..7 {
        faces.push([i, (i + 1) % 7, (i + 3) % 7]);
        faces.push([i, (i + 2) % 7, (i + 3) % 7]);
    }
    TexturedMesh::from_parts(positions, faces, Vec::new(), Vec::new())
}

#[test]
fn torus_without_collapsible_edges_stops_on_empty_queue() {
    // Every candidate has a finite cost but fails the link condition, so
    // the queue drains without a single collapse.
    let result = decimate_mesh(
        &seven_vertex_torus(),
        &DecimateParams::new().with_target_vertices(4),
    )
    .unwrap();

    assert_eq!(result.collapses, 0);
    assert_eq!(result.final_vertices, 7);
    assert_eq!(result.final_faces, 14);
    assert_eq!(result.stop_reason, StopReason::EmptyQueue);
}

#[test]
fn min_vertices_floor_is_respected() {
    let result = decimate_mesh(
        &octahedron(),
        &DecimateParams::new()
            .with_target_vertices(1)
            .with_min_vertices(5),
    )
    .unwrap();

    assert_eq!(result.final_vertices, 5);
    assert_eq!(result.collapses, 1);
}

#[test]
fn mesh_without_texcoords_decimates() {
    let mut mesh = octahedron();
    mesh.texcoords.clear();
    mesh.face_texcoords.clear();

    let result =
        decimate_mesh(&mesh, &DecimateParams::new().with_target_vertices(4)).unwrap();
    assert_eq!(result.final_vertices, 4);
    assert!(result.mesh.texcoords.is_empty());
    assert!(result.mesh.face_texcoords.is_empty());
}

#[test]
fn invalid_mesh_is_rejected() {
    let mut mesh = octahedron();
    mesh.faces.push([0, 1, 99]);
    mesh.face_texcoords.push([0, 1, 2]);

    let err = decimate_mesh(&mesh, &DecimateParams::new()).unwrap_err();
    assert!(err.to_string().contains("invalid input mesh"));
}

#[test]
fn non_manifold_mesh_is_rejected() {
    let mut mesh = octahedron();
    // A third face on edge (0, 2).
    mesh.positions.push(mesh_types::Point3::new(2.0, 2.0, 2.0));
    mesh.texcoords.push(mesh_types::Point2::new(0.5, 0.5));
    mesh.faces.push([0, 2, 6]);
    mesh.face_texcoords.push([0, 2, 6]);

    let err = decimate_mesh(&mesh, &DecimateParams::new()).unwrap_err();
    assert!(err.to_string().contains("non-manifold"));
}

#[test]
fn result_display_mentions_stop_reason() {
    let result =
        decimate_mesh(&octahedron(), &DecimateParams::new().with_target_vertices(4)).unwrap();
    let text = result.to_string();
    assert!(text.contains("target_reached"));
    assert!(text.contains("collapses"));
}
