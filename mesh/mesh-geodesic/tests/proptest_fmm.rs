//! Property-based tests for fast marching and path tracing.
//!
//! Run with: cargo test -p mesh-geodesic -- proptest

use mesh_connectivity::TriMesh;
use mesh_connectivity::primitives::grid;
use mesh_geodesic::{FastMarching, FmmConfig, GeodesicPath, UpdateMethod, VertexState};
use proptest::prelude::*;
use proptest::sample::Index;

// =============================================================================
// Strategies
// =============================================================================

/// A jittered grid: regular connectivity, irregular (non-planar) geometry.
fn arb_grid() -> impl Strategy<Value = TriMesh> {
    (3usize..9, 3usize..9).prop_flat_map(|(nx, ny)| {
        prop::collection::vec(prop::array::uniform3(-0.25..0.25f64), nx * ny).prop_map(
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

fn arb_method() -> impl Strategy<Value = UpdateMethod> {
    prop_oneof![Just(UpdateMethod::Quadratic), Just(UpdateMethod::Matrix)]
}

/// A mesh with one to three seeds.
fn arb_seeded() -> impl Strategy<Value = (TriMesh, Vec<usize>)> {
    (arb_grid(), prop::collection::vec(any::<Index>(), 1..4)).prop_map(|(mesh, picks)| {
        let n = mesh.vertex_count();
        let seeds = picks.iter().map(|i| i.index(n)).collect();
        (mesh, seeds)
    })
}

fn solve(mesh: &TriMesh, seeds: &[usize], method: UpdateMethod) -> Vec<f64> {
    let mut fmm = FastMarching::with_config(mesh, FmmConfig::default().with_method(method))
        .unwrap_or_else(|e| panic!("{e}"));
    fmm.add_seeds(seeds).unwrap_or_else(|e| panic!("{e}"));
    fmm.solve().unwrap_or_else(|e| panic!("{e}"));
    fmm.distances().to_vec()
}

fn edges(mesh: &TriMesh) -> impl Iterator<Item = (usize, usize)> + '_ {
    mesh.faces()
        .flat_map(|(_, f)| (0..3).map(move |i| f.edge(i)))
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Seeds read zero, everything else is reached with a positive distance.
    #[test]
    fn distances_are_nonnegative((mesh, seeds) in arb_seeded(), method in arb_method()) {
        let d = solve(&mesh, &seeds, method);
        for &s in &seeds {
            prop_assert!(d[s].abs() < f64::EPSILON);
        }
        for (v, &dv) in d.iter().enumerate() {
            prop_assert!(dv.is_finite(), "vertex {} unreached", v);
            prop_assert!(dv >= 0.0);
        }
    }

    /// Vertices are finalized in non-decreasing distance order.
    #[test]
    fn finalization_order_is_monotone((mesh, seeds) in arb_seeded(), method in arb_method()) {
        let mut order = Vec::new();
        {
            let mut fmm = FastMarching::with_config(&mesh, FmmConfig::default().with_method(method))
                .unwrap_or_else(|e| panic!("{e}"))
                .with_observer(|_, d| order.push(d));
            fmm.add_seeds(&seeds).unwrap_or_else(|e| panic!("{e}"));
            fmm.solve().unwrap_or_else(|e| panic!("{e}"));
        }
        for pair in order.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    /// The front never arrives later than walking one edge from a neighbor.
    #[test]
    fn edge_bound_holds((mesh, seeds) in arb_seeded(), method in arb_method()) {
        let d = solve(&mesh, &seeds, method);
        for (a, b) in edges(&mesh) {
            let len = mesh.edge_length(a, b).unwrap_or(f64::INFINITY);
            prop_assert!(d[b] <= d[a] + len + 1e-9, "edge {}-{}: {} vs {} + {}", a, b, d[b], d[a], len);
            prop_assert!(d[a] <= d[b] + len + 1e-9);
        }
    }

    /// Reset and re-solve reproduces the same field bit for bit.
    #[test]
    fn reset_is_idempotent((mesh, seeds) in arb_seeded()) {
        let mut fmm = FastMarching::new(&mesh).unwrap_or_else(|e| panic!("{e}"));
        fmm.add_seeds(&seeds).unwrap_or_else(|e| panic!("{e}"));
        let first_summary = fmm.solve().unwrap_or_else(|e| panic!("{e}"));
        let first = fmm.distances().to_vec();

        fmm.reset();
        fmm.add_seeds(&seeds).unwrap_or_else(|e| panic!("{e}"));
        let second_summary = fmm.solve().unwrap_or_else(|e| panic!("{e}"));

        prop_assert_eq!(first_summary, second_summary);
        prop_assert!(first.iter().zip(fmm.distances()).all(|(a, b)| a.to_bits() == b.to_bits()));
    }

    /// Excluded vertices that are not seeds are never reached.
    #[test]
    fn exclusions_are_respected(
        (mesh, seeds) in arb_seeded(),
        picks in prop::collection::vec(any::<Index>(), 0..6),
    ) {
        let n = mesh.vertex_count();
        let excluded: Vec<usize> = picks
            .iter()
            .map(|i| i.index(n))
            .filter(|v| !seeds.contains(v))
            .collect();

        let mut fmm = FastMarching::with_config(&mesh, FmmConfig::default().with_not_visited_value(-1.0))
            .unwrap_or_else(|e| panic!("{e}"))
            .with_exclusions(&excluded)
            .unwrap_or_else(|e| panic!("{e}"));
        fmm.add_seeds(&seeds).unwrap_or_else(|e| panic!("{e}"));
        fmm.solve().unwrap_or_else(|e| panic!("{e}"));

        let field = fmm.distance_field();
        for &v in &excluded {
            prop_assert_eq!(fmm.state(v), Some(VertexState::Far));
            prop_assert!(!field.is_reached(v));
            prop_assert!((field.distance(v) + 1.0).abs() < f64::EPSILON);
        }
    }

    /// Interpolated distance along a traced path never increases.
    #[test]
    fn traced_path_descends((mesh, seeds) in arb_seeded(), start in any::<Index>()) {
        let d = solve(&mesh, &seeds, UpdateMethod::Quadratic);
        let field = d.into();
        let start = start.index(mesh.vertex_count());

        let mut tracer = GeodesicPath::new(&mesh, &field).unwrap_or_else(|e| panic!("{e}"));
        let status = tracer.compute_path(start, 500).unwrap_or_else(|e| panic!("{e}"));
        let path = tracer.traced(status);

        prop_assert!(!path.is_empty());
        prop_assert!(path.len() <= 500);
        for pair in path.samples().windows(2) {
            prop_assert!(pair[1].distance <= pair[0].distance + 1e-9);
        }
        if path.reached_seed() {
            let end = path.samples().last().map_or(f64::INFINITY, |s| s.distance);
            prop_assert!(end.abs() < 1e-9);
        }
    }
}
