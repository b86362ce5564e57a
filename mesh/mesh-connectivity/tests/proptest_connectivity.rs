//! Property-based tests for mesh connectivity and one-ring traversal.
//!
//! Run with: cargo test -p mesh-connectivity -- proptest

use std::collections::{BTreeSet, HashSet};

use mesh_connectivity::primitives::{grid, icosphere};
use mesh_connectivity::{Face, TriMesh};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// A jittered grid: regular connectivity, irregular geometry.
fn arb_grid() -> impl Strategy<Value = TriMesh> {
    (2usize..8, 2usize..8).prop_flat_map(|(nx, ny)| {
        prop::collection::vec(prop::array::uniform3(-0.3..0.3f64), nx * ny).prop_map(
            move |jitter| {
                let base = grid(nx, ny, 1.0);
                let points: Vec<[f64; 3]> = base
                    .vertices()
                    .zip(&jitter)
                    .map(|((_, v), d)| {
                        [
                            v.position.x + d[0],
                            v.position.y + d[1],
                            v.position.z + d[2],
                        ]
                    })
                    .collect();
                let faces: Vec<[usize; 3]> = base.faces().map(|(_, f)| f.vertices).collect();
                TriMesh::from_faces(&points, &faces).unwrap_or_default()
            },
        )
    })
}

/// Grid with a random subset of faces removed (holes and ragged borders).
fn arb_holey_grid() -> impl Strategy<Value = TriMesh> {
    (3usize..7, 3usize..7).prop_flat_map(|(nx, ny)| {
        let face_count = 2 * (nx - 1) * (ny - 1);
        prop::collection::vec(prop::bool::weighted(0.8), face_count).prop_map(move |keep| {
            let base = grid(nx, ny, 1.0);
            let points: Vec<[f64; 3]> = base
                .vertices()
                .map(|(_, v)| [v.position.x, v.position.y, v.position.z])
                .collect();
            let faces: Vec<[usize; 3]> = base
                .faces()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|((_, f), _)| f.vertices)
                .collect();
            TriMesh::from_faces(&points, &faces).unwrap_or_default()
        })
    })
}

fn faces_touching(mesh: &TriMesh, v: usize) -> BTreeSet<usize> {
    mesh.faces()
        .filter(|(_, f)| f.contains(v))
        .map(|(i, _)| i)
        .collect()
}

fn neighbors_of(mesh: &TriMesh, v: usize) -> BTreeSet<usize> {
    mesh.faces()
        .filter(|(_, f)| f.contains(v))
        .flat_map(|(_, f)| f.vertices)
        .filter(|&u| u != v)
        .collect()
}

/// A vertex is a manifold fan if its faces form a single edge-connected strip.
fn is_single_fan(mesh: &TriMesh, v: usize) -> bool {
    let faces = faces_touching(mesh, v);
    let Some(&start) = faces.iter().next() else {
        return true;
    };
    let mut seen = HashSet::from([start]);
    let mut stack = vec![start];
    while let Some(f) = stack.pop() {
        let Some(face) = mesh.face_ref(f) else { continue };
        for n in face.neighbors.iter().flatten() {
            if faces.contains(n) && seen.insert(*n) {
                stack.push(*n);
            }
        }
    }
    seen.len() == faces.len()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Adjacency is symmetric and links faces that really share an edge.
    #[test]
    fn adjacency_is_symmetric(mesh in arb_grid()) {
        for (f, face) in mesh.faces() {
            for i in 0..3 {
                let Some(g) = face.neighbors[i] else { continue };
                let (a, b) = face.edge(i);
                let other: &Face = mesh.face_ref(g).unwrap_or(face);
                prop_assert!(other.contains(a) && other.contains(b));
                let j = other.edge_index(a, b);
                prop_assert!(j.is_some());
                prop_assert_eq!(j.and_then(|j| other.neighbors[j]), Some(f));
            }
        }
    }

    /// Rebuilding connectivity on an unchanged mesh changes nothing.
    #[test]
    fn connectivity_is_reentrant(mesh in arb_holey_grid()) {
        let mut rebuilt = mesh.clone();
        prop_assert!(rebuilt.build_connectivity().is_ok());

        let before: Vec<Face> = mesh.faces().map(|(_, f)| *f).collect();
        let after: Vec<Face> = rebuilt.faces().map(|(_, f)| *f).collect();
        prop_assert_eq!(before, after);

        let before: Vec<_> = mesh.vertices().map(|(_, v)| v.incident_face).collect();
        let after: Vec<_> = rebuilt.vertices().map(|(_, v)| v.incident_face).collect();
        prop_assert_eq!(before, after);
    }

    /// Every face around a manifold vertex is visited exactly once, open or closed.
    #[test]
    fn face_fan_visits_each_face_once(mesh in arb_holey_grid()) {
        for (v, _) in mesh.vertices() {
            if !is_single_fan(&mesh, v) {
                continue;
            }
            let walked: Vec<usize> = mesh.face_fan(v).iter().collect();
            let unique: BTreeSet<usize> = walked.iter().copied().collect();
            prop_assert_eq!(walked.len(), unique.len());
            prop_assert_eq!(unique, faces_touching(&mesh, v));
        }
    }

    /// The vertex fan reaches exactly the one-ring.
    #[test]
    fn vertex_fan_matches_one_ring(mesh in arb_holey_grid()) {
        for (v, _) in mesh.vertices() {
            if !is_single_fan(&mesh, v) {
                continue;
            }
            let ring: BTreeSet<usize> = mesh.vertex_fan(v).iter().map(|s| s.vertex).collect();
            prop_assert_eq!(ring, neighbors_of(&mesh, v));
        }
    }
}

#[test]
fn sphere_rings_have_full_context() {
    let mesh = icosphere(2);
    for (v, _) in mesh.vertices() {
        for step in mesh.vertex_fan(v).iter() {
            assert!(step.left_face.is_some() && step.right_face.is_some());
            assert!(step.prev_vertex.is_some() && step.next_vertex.is_some());
        }
    }
}
