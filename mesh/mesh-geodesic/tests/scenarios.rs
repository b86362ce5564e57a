//! End-to-end behavior of fast marching and path tracing.
//!
//! Organized from the smallest hand-checkable meshes up to closed surfaces:
//!
//! - Exact values on tiny meshes
//! - Stop criteria, exclusions and weights
//! - Recovery from degenerate and non-manifold input
//! - Path tracing back to the seeds

// Allow test-specific patterns
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::cast_precision_loss)]

use approx::assert_relative_eq;
use mesh_connectivity::TriMesh;
use mesh_connectivity::primitives::{equilateral_triangle, grid, icosphere, unit_square};
use mesh_geodesic::{
    FastMarching, FmmConfig, GeodesicError, GeodesicPath, TraceStatus, TracedPath, UpdateMethod,
    VertexState, geodesic_distance,
};

const METHODS: [UpdateMethod; 2] = [UpdateMethod::Quadratic, UpdateMethod::Matrix];

fn config(method: UpdateMethod) -> FmmConfig {
    FmmConfig::default().with_method(method)
}

/// Regular grid sheared so that half of its triangles are obtuse.
fn sheared_grid(n: usize) -> TriMesh {
    let base = grid(n, n, 1.0);
    let points: Vec<[f64; 3]> = base
        .vertices()
        .map(|(_, v)| [0.8f64.mul_add(v.position.y, v.position.x), 0.6 * v.position.y, 0.0])
        .collect();
    let faces: Vec<[usize; 3]> = base.faces().map(|(_, f)| f.vertices).collect();
    TriMesh::from_faces(&points, &faces).unwrap()
}

// =============================================================================
// Exact values
// =============================================================================

mod exact_values {
    use super::*;

    #[test]
    fn unit_square_from_corner() {
        let mesh = unit_square();
        for method in METHODS {
            let field = geodesic_distance(&mesh, &[0], &config(method)).unwrap();
            assert_relative_eq!(field.distance(0), 0.0);
            assert_relative_eq!(field.distance(1), 1.0, epsilon = 1e-12);
            assert_relative_eq!(field.distance(2), 2.0_f64.sqrt(), epsilon = 1e-2);
            assert_relative_eq!(field.distance(3), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn equilateral_triangle_edges() {
        let mesh = equilateral_triangle();
        for method in METHODS {
            let field = geodesic_distance(&mesh, &[0], &config(method)).unwrap();
            assert_relative_eq!(field.distance(1), 1.0, epsilon = 1e-12);
            assert_relative_eq!(field.distance(2), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn straight_edges_are_exact_on_grid() {
        let mesh = grid(8, 8, 0.5);
        let field = geodesic_distance(&mesh, &[0], &FmmConfig::default()).unwrap();
        for i in 0..8 {
            assert_relative_eq!(field.distance(i), 0.5 * i as f64, epsilon = 1e-12);
            assert_relative_eq!(field.distance(i * 8), 0.5 * i as f64, epsilon = 1e-12);
        }
    }

    #[test]
    fn multiple_seeds_take_nearest() {
        let mesh = grid(9, 2, 1.0);
        let field = geodesic_distance(&mesh, &[0, 8], &FmmConfig::default()).unwrap();
        assert_relative_eq!(field.distance(4), 4.0, epsilon = 1e-12);
        assert_relative_eq!(field.distance(2), 2.0, epsilon = 1e-12);
        assert_relative_eq!(field.distance(7), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn close_to_euclidean_on_flat_grid() {
        let mesh = grid(15, 15, 1.0);
        let field = geodesic_distance(&mesh, &[112], &FmmConfig::default()).unwrap();
        let Some(center) = mesh.position(112) else {
            panic!("center vertex is set");
        };
        for (v, d) in field.iter() {
            let exact = (mesh.position(v).unwrap() - center).norm();
            assert!(d >= 0.0);
            assert!((d - exact).abs() <= 0.1 * exact + 1e-12, "vertex {v}: {d} vs {exact}");
        }
    }

    #[test]
    fn unfolding_handles_obtuse_triangles() {
        let mesh = sheared_grid(12);
        let seed = 6 * 12 + 6;
        let center = mesh.position(seed).unwrap();

        let mut fmm = FastMarching::new(&mesh).unwrap();
        fmm.add_seed(seed).unwrap();
        let summary = fmm.solve().unwrap();
        assert!(summary.unfolds > 0);

        let flat = geodesic_distance(&mesh, &[seed], &FmmConfig::without_unfolding()).unwrap();

        let (mut err_unfolded, mut err_flat) = (0.0, 0.0);
        for v in 0..mesh.vertex_count() {
            let exact = (mesh.position(v).unwrap() - center).norm();
            let d = fmm.distance(v);
            assert!((d - exact).abs() <= 0.15 * exact + 1e-12, "vertex {v}: {d} vs {exact}");
            err_unfolded += (d - exact).abs();
            err_flat += (flat.distance(v) - exact).abs();
        }
        assert!(err_unfolded < err_flat);
    }
}

// =============================================================================
// Stop criteria, exclusions, weights
// =============================================================================

mod hooks {
    use super::*;

    #[test]
    fn destination_stop_on_grid() {
        let mesh = grid(10, 10, 1.0);
        let cfg = FmmConfig::default().with_not_visited_value(-1.0);
        let mut fmm = FastMarching::with_config(&mesh, cfg)
            .unwrap()
            .with_destinations(&[99])
            .unwrap();
        fmm.add_seed(0).unwrap();
        let summary = fmm.solve().unwrap();

        // The far corner is the farthest vertex: everything nearer is finalized
        // first, so this stop cannot cut the solve short. A nearer destination
        // below leaves vertices unvisited.
        assert!(summary.stopped_early);
        assert_eq!(fmm.state(99), Some(VertexState::Dead));
        assert_eq!(summary.steps, summary.visited - 1);

        let arrival = fmm.distance(99);
        for v in 0..100 {
            match fmm.state(v) {
                Some(VertexState::Dead) => assert!(fmm.distance(v) <= arrival),
                _ => assert!(fmm.distance(v) >= arrival),
            }
        }

        let field = fmm.distance_field();
        for v in 0..100 {
            if fmm.state(v) == Some(VertexState::Far) {
                assert_relative_eq!(field.distance(v), -1.0);
            } else {
                assert!(field.distance(v) >= 0.0);
            }
        }
    }

    #[test]
    fn nearby_destination_leaves_far_vertices() {
        let mesh = grid(10, 10, 1.0);
        let mut fmm = FastMarching::new(&mesh)
            .unwrap()
            .with_destinations(&[22])
            .unwrap();
        fmm.add_seed(0).unwrap();
        let summary = fmm.solve().unwrap();

        assert!(summary.stopped_early);
        assert!(summary.visited < 100);
        assert_eq!(fmm.state(99), Some(VertexState::Far));
        assert!(fmm.distance_field().distance(99).is_infinite());

        // Resuming carries the front through the rest of the grid
        let resumed = fmm.solve().unwrap();
        assert!(!resumed.stopped_early);
        assert!(resumed.visited > summary.visited);
        assert_eq!(fmm.state(99), Some(VertexState::Dead));
    }

    #[test]
    fn long_open_fan_is_counted() {
        // Open sector of 22 triangles: its center needs more than 20 crossings
        let mut points = vec![[0.0, 0.0, 0.0]];
        for i in 0..=22 {
            let angle = 5.0 * std::f64::consts::PI / 3.0 * (i as f64) / 22.0;
            points.push([angle.cos(), angle.sin(), 0.0]);
        }
        let cells: Vec<[usize; 3]> = (1..=22).map(|i| [0, i, i + 1]).collect();
        let mesh = TriMesh::from_faces(&points, &cells).unwrap();

        let mut fmm = FastMarching::new(&mesh).unwrap();
        fmm.add_seed(0).unwrap();
        let summary = fmm.solve().unwrap();

        assert_eq!(summary.nonmanifold_fans, 1);
        assert_eq!(summary.visited, 1);
    }

    #[test]
    fn stop_radius_bounds_finalized_distances() {
        let mesh = grid(12, 12, 0.5);
        let radius = 2.0;
        let mut fmm = FastMarching::new(&mesh).unwrap().with_stop_radius(radius);
        fmm.add_seed(0).unwrap();
        let summary = fmm.solve().unwrap();

        assert!(summary.stopped_early);
        let beyond = (0..mesh.vertex_count())
            .filter(|&v| fmm.state(v) == Some(VertexState::Dead) && fmm.distance(v) > radius)
            .count();
        // Only the vertex that tripped the criterion lies past the radius
        assert_eq!(beyond, 1);
    }

    #[test]
    fn excluded_vertices_keep_sentinel() {
        let mesh = grid(9, 9, 1.0);
        // Wall across the grid at x = 4, with a gap at the top row
        let wall: Vec<usize> = (0..8).map(|j| j * 9 + 4).collect();
        let cfg = FmmConfig::default().with_not_visited_value(-1.0);

        let mut fmm = FastMarching::with_config(&mesh, cfg)
            .unwrap()
            .with_exclusions(&wall)
            .unwrap();
        fmm.add_seed(0).unwrap();
        fmm.solve().unwrap();
        let field = fmm.distance_field();

        for &v in &wall {
            assert_relative_eq!(field.distance(v), -1.0);
            assert_eq!(fmm.state(v), Some(VertexState::Far));
        }

        // The front has to go around the wall
        let open = geodesic_distance(&mesh, &[0], &FmmConfig::default()).unwrap();
        assert!(field.distance(8) > open.distance(8) + 1.0);
        assert!(field.is_reached(8));
    }

    #[test]
    fn seeds_bypass_exclusions() {
        let mesh = unit_square();
        let mut fmm = FastMarching::new(&mesh)
            .unwrap()
            .with_exclusions(&[0])
            .unwrap();
        fmm.add_seed(0).unwrap();
        fmm.solve().unwrap();
        assert_relative_eq!(fmm.distance(0), 0.0);
        assert_relative_eq!(fmm.distance(1), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn uniform_weight_scales_distances() {
        let mesh = icosphere(2);
        let plain = geodesic_distance(&mesh, &[0], &FmmConfig::default()).unwrap();

        let mut fmm = FastMarching::new(&mesh)
            .unwrap()
            .with_weights(vec![2.5; mesh.vertex_count()])
            .unwrap();
        fmm.add_seed(0).unwrap();
        fmm.solve().unwrap();

        for v in 0..mesh.vertex_count() {
            assert_relative_eq!(fmm.distance(v), 2.5 * plain.distance(v), epsilon = 1e-9);
        }
    }

    #[test]
    fn slow_region_delays_front() {
        let mesh = grid(10, 10, 1.0);
        let plain = geodesic_distance(&mesh, &[0], &FmmConfig::default()).unwrap();

        let mut fmm = FastMarching::new(&mesh)
            .unwrap()
            .with_weight_fn(|v| if (30..70).contains(&v) { 5.0 } else { 1.0 });
        fmm.add_seed(0).unwrap();
        fmm.solve().unwrap();

        // Bottom row is untouched, the far corner sits behind the slow band
        assert_relative_eq!(fmm.distance(9), plain.distance(9), max_relative = 0.01);
        assert!(fmm.distance(99) > plain.distance(99) + 5.0);
    }

    #[test]
    fn impassable_weight_blocks_vertex() {
        let mesh = unit_square();
        let mut fmm = FastMarching::new(&mesh)
            .unwrap()
            .with_weight_fn(|v| if v == 2 { f64::INFINITY } else { 1.0 });
        fmm.add_seed(0).unwrap();
        let summary = fmm.solve().unwrap();
        assert_eq!(summary.visited, 3);
        assert_eq!(fmm.state(2), Some(VertexState::Far));
    }

    #[test]
    fn admission_veto_sees_candidate_distance() {
        let mesh = grid(10, 10, 1.0);
        let mut fmm = FastMarching::new(&mesh)
            .unwrap()
            .with_admission_fn(|_, candidate| candidate < 3.0);
        fmm.add_seed(0).unwrap();
        fmm.solve().unwrap();

        for v in 0..100 {
            let d = fmm.distance(v);
            assert!(d < 3.0 || d.is_infinite());
        }
    }
}

// =============================================================================
// Lifecycle and errors
// =============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn reset_then_resolve_is_identical() {
        let mesh = icosphere(2);
        let mut fmm = FastMarching::new(&mesh).unwrap();
        fmm.add_seeds(&[0, 17]).unwrap();
        let first_summary = fmm.solve().unwrap();
        let first = fmm.distances().to_vec();

        fmm.reset();
        assert!(fmm.distances().iter().all(|d| d.is_infinite()));
        assert_eq!(fmm.state(0), Some(VertexState::Far));

        fmm.add_seeds(&[0, 17]).unwrap();
        let second_summary = fmm.solve().unwrap();

        assert_eq!(first, fmm.distances());
        assert_eq!(first_summary, second_summary);
    }

    #[test]
    fn no_seed_is_an_error() {
        let mesh = unit_square();
        assert_eq!(
            geodesic_distance(&mesh, &[], &FmmConfig::default()),
            Err(GeodesicError::NoSeed)
        );
    }

    #[test]
    fn invalid_seed_is_an_error() {
        let mesh = unit_square();
        assert!(matches!(
            geodesic_distance(&mesh, &[4], &FmmConfig::default()),
            Err(GeodesicError::InvalidVertex {
                index: 4,
                vertex_count: 4
            })
        ));
    }

    #[test]
    fn isolated_vertex_is_never_reached() {
        let points = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [3.0, 3.0, 0.0],
        ];
        let mesh = TriMesh::from_faces(&points, &[[0, 1, 2]]).unwrap();
        let mut fmm = FastMarching::new(&mesh).unwrap();
        fmm.add_seed(0).unwrap();
        let summary = fmm.solve().unwrap();

        assert_eq!(summary.visited, 3);
        assert_eq!(fmm.state(3), Some(VertexState::Far));

        // Seeding it directly is allowed and reaches nothing else
        fmm.reset();
        fmm.add_seed(3).unwrap();
        assert_eq!(fmm.solve().unwrap().visited, 1);
    }

    #[test]
    fn fan_hop_limit_is_counted_not_fatal() {
        let mut mesh = grid(3, 3, 1.0);
        mesh.set_max_fan_hops(2);
        let mut fmm = FastMarching::new(&mesh).unwrap();
        fmm.add_seed(4).unwrap();
        let summary = fmm.solve().unwrap();

        assert!(summary.nonmanifold_fans >= 1);
        assert_eq!(summary.visited, 1);
    }

    #[test]
    fn degenerate_triangle_falls_back() {
        // Collinear corners: the middle vertex sits on the segment
        let points = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
        ];
        let mesh = TriMesh::from_faces(&points, &[[0, 1, 2], [0, 2, 3]]).unwrap();
        let mut fmm = FastMarching::new(&mesh).unwrap();
        fmm.add_seed(0).unwrap();
        let summary = fmm.solve().unwrap();

        assert!(summary.degenerate_updates > 0);
        assert_relative_eq!(fmm.distance(1), 1.0, epsilon = 1e-12);
        assert_relative_eq!(fmm.distance(2), 2.0, epsilon = 1e-12);
        assert!(fmm.distance(3).is_finite());
    }

    #[test]
    fn stale_connectivity_is_rejected() {
        let mut mesh = unit_square();
        mesh.set_vertex_count(5);
        assert_eq!(
            FastMarching::new(&mesh).map(|_| ()),
            Err(GeodesicError::NotConnected)
        );
    }
}

// =============================================================================
// Path tracing
// =============================================================================

mod tracing_paths {
    use super::*;

    fn trace(mesh: &TriMesh, seed: usize, max_points: usize) -> (TracedPath, usize) {
        let field = geodesic_distance(mesh, &[seed], &FmmConfig::default()).unwrap();
        let (far, _) = field.farthest_vertex().unwrap();
        let mut tracer = GeodesicPath::new(mesh, &field).unwrap();
        let status = tracer.compute_path(far, max_points).unwrap();
        (tracer.traced(status), far)
    }

    #[test]
    fn closed_sphere_path_ends_at_seed() {
        let mesh = icosphere(3);
        let (path, _) = trace(&mesh, 0, 1000);

        assert_eq!(path.status(), TraceStatus::ReachedSeed);
        assert!(path.len() <= 1000);

        let end = path.samples().last().unwrap().position;
        let seed = mesh.position(0).unwrap();
        assert!((end - seed).norm() < 1e-9);

        // Antipodal path on the unit sphere is about pi long
        assert!(path.length() > 2.9 && path.length() < 3.5, "{}", path.length());
    }

    #[test]
    fn path_distances_never_increase() {
        for (mesh, seed) in [(icosphere(2), 7), (grid(12, 9, 0.3), 40)] {
            let (path, _) = trace(&mesh, seed, 1000);
            assert!(path.reached_seed());
            for pair in path.samples().windows(2) {
                assert!(pair[1].distance <= pair[0].distance + 1e-9);
            }
            assert!(path.samples().last().unwrap().distance <= 1e-9);
        }
    }

    #[test]
    fn path_length_tracks_field_value() {
        let mesh = grid(20, 20, 0.25);
        let (path, far) = trace(&mesh, 0, 500);
        let field = geodesic_distance(&mesh, &[0], &FmmConfig::default()).unwrap();

        assert!(path.reached_seed());
        assert_relative_eq!(path.length(), field.distance(far), max_relative = 0.05);
        assert_eq!(path.nearest_vertices().first(), Some(&far));
        assert_eq!(path.nearest_vertices().last(), Some(&0));
    }

    #[test]
    fn tracer_is_reusable() {
        let mesh = icosphere(2);
        let field = geodesic_distance(&mesh, &[0], &FmmConfig::default()).unwrap();
        let mut tracer = GeodesicPath::new(&mesh, &field).unwrap();

        let a = tracer.compute_path(20, 500).unwrap();
        let first = tracer.points().to_vec();
        let b = tracer.compute_path(20, 500).unwrap();

        assert_eq!(a, b);
        assert_eq!(first, tracer.points());
    }
}
