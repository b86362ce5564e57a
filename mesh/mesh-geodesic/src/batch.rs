//! Independent solves over one shared mesh.
//!
//! The mesh is only read during marching, so several seed sets can be
//! solved at once with rayon; every solve owns its own per-vertex state.

use mesh_connectivity::TriMesh;
use rayon::prelude::*;
use tracing::debug;

use crate::config::FmmConfig;
use crate::distance::DistanceField;
use crate::error::GeodesicResult;
use crate::fast_marching::geodesic_distance;

/// Solve every seed set in parallel.
///
/// Results come back in the order of `seed_sets`; a failing set does not
/// affect the others.
///
/// # Example
///
/// ```
/// use mesh_connectivity::primitives::icosphere;
/// use mesh_geodesic::{FmmConfig, solve_batch};
///
/// let mesh = icosphere(1);
/// let fields = solve_batch(&mesh, &[vec![0], vec![5, 7]], &FmmConfig::default());
/// assert_eq!(fields.len(), 2);
/// assert!(fields.iter().all(Result::is_ok));
/// ```
#[must_use]
pub fn solve_batch<S>(
    mesh: &TriMesh,
    seed_sets: &[S],
    config: &FmmConfig,
) -> Vec<GeodesicResult<DistanceField>>
where
    S: AsRef<[usize]> + Sync,
{
    debug!(sets = seed_sets.len(), "Solving seed sets in parallel");

    seed_sets
        .par_iter()
        .map(|seeds| geodesic_distance(mesh, seeds.as_ref(), config))
        .collect()
}

/// Solve every seed set in parallel, failing on the first error.
///
/// # Errors
///
/// Returns the first error in `seed_sets` order.
pub fn try_solve_batch<S>(
    mesh: &TriMesh,
    seed_sets: &[S],
    config: &FmmConfig,
) -> GeodesicResult<Vec<DistanceField>>
where
    S: AsRef<[usize]> + Sync,
{
    solve_batch(mesh, seed_sets, config).into_iter().collect()
}
