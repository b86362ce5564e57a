//! Polyline output of a traced geodesic.

use std::fmt;

use mesh_connectivity::{Point3, TriMesh};
use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{FmmConfig, TracerConfig};
use crate::distance::DistanceField;
use crate::error::GeodesicResult;
use crate::fast_marching::FastMarching;
use crate::path::{GeodesicPath, PathPoint, TraceStatus};

/// One vertex of a traced polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TracedSample {
    /// Cartesian position.
    pub position: Point3<f64>,
    /// Edge endpoints for first-order interpolation.
    pub vertices: (usize, usize),
    /// Weight of `vertices.0`.
    pub weight: f64,
    /// Closest mesh vertex, for zero-order interpolation.
    pub nearest_vertex: usize,
    /// Interpolated field value.
    pub distance: f64,
    /// Length of the polyline from the start up to this sample.
    pub arc_length: f64,
}

/// A traced geodesic as a polyline with per-sample mesh references.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TracedPath {
    samples: Vec<TracedSample>,
    status: TraceStatus,
}

impl TracedPath {
    /// Resolve edge points into positions and running length.
    ///
    /// Points whose endpoints are unset slots are skipped.
    #[must_use]
    pub fn from_points(
        mesh: &TriMesh,
        field: &DistanceField,
        points: &[PathPoint],
        status: TraceStatus,
    ) -> Self {
        let mut samples: Vec<TracedSample> = Vec::with_capacity(points.len());
        for point in points {
            let Some(position) = point.position(mesh) else {
                continue;
            };
            let arc_length = samples
                .last()
                .map_or(0.0, |prev| prev.arc_length + (position - prev.position).norm());
            samples.push(TracedSample {
                position,
                vertices: (point.v1, point.v2),
                weight: point.coord,
                nearest_vertex: point.nearest_vertex(),
                distance: point.interpolate(field),
                arc_length,
            });
        }
        Self { samples, status }
    }

    /// All samples, start first.
    #[must_use]
    pub fn samples(&self) -> &[TracedSample] {
        &self.samples
    }

    /// How tracing ended.
    #[must_use]
    pub const fn status(&self) -> TraceStatus {
        self.status
    }

    /// Whether the path ends on a seed.
    #[must_use]
    pub fn reached_seed(&self) -> bool {
        self.status == TraceStatus::ReachedSeed
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the path has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total polyline length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.arc_length)
    }

    /// Sample positions.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.samples.iter().map(|s| s.position).collect()
    }

    /// Closest mesh vertex per sample, consecutive repeats collapsed.
    #[must_use]
    pub fn nearest_vertices(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.samples.iter().map(|s| s.nearest_vertex).collect();
        ids.dedup();
        ids
    }

    /// `(v1, v2, weight of v1)` per sample.
    #[must_use]
    pub fn edge_weights(&self) -> Vec<(usize, usize, f64)> {
        self.samples
            .iter()
            .map(|s| (s.vertices.0, s.vertices.1, s.weight))
            .collect()
    }
}

impl fmt::Display for TracedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Geodesic path: {} points, length {:.4}, {:?}",
            self.samples.len(),
            self.length(),
            self.status
        )
    }
}

/// Solve from `seeds` until `end` is finalized, then trace back from `end`.
///
/// # Errors
///
/// Returns the solver's errors ([`NotConnected`], [`InvalidVertex`],
/// [`NoSeed`]) and [`InvalidVertex`] for a bad `end`.
///
/// [`NotConnected`]: crate::GeodesicError::NotConnected
/// [`InvalidVertex`]: crate::GeodesicError::InvalidVertex
/// [`NoSeed`]: crate::GeodesicError::NoSeed
///
/// # Example
///
/// ```
/// use mesh_connectivity::primitives::icosphere;
/// use mesh_geodesic::{FmmConfig, TracerConfig, trace_geodesic};
///
/// let mesh = icosphere(2);
/// let path = trace_geodesic(&mesh, &[0], 5, &FmmConfig::default(), TracerConfig::default(), 500)
///     .unwrap();
/// assert!(path.reached_seed());
/// ```
pub fn trace_geodesic(
    mesh: &TriMesh,
    seeds: &[usize],
    end: usize,
    fmm_config: &FmmConfig,
    tracer_config: TracerConfig,
    max_points: usize,
) -> GeodesicResult<TracedPath> {
    let mut fmm =
        FastMarching::with_config(mesh, fmm_config.clone())?.with_destinations(&[end])?;
    fmm.add_seeds(seeds)?;
    let summary = fmm.solve()?;
    let field = fmm.distance_field();

    let mut tracer = GeodesicPath::new(mesh, &field)?.with_config(tracer_config);
    let status = tracer.compute_path(end, max_points)?;
    let path = tracer.traced(status);

    info!(
        end,
        visited = summary.visited,
        points = path.len(),
        length = path.length(),
        ?status,
        "Geodesic traced"
    );
    Ok(path)
}
