//! Geodesic path tracing by descent on a distance field.
//!
//! The tracer walks from a start vertex toward the seeds of a solved
//! [`DistanceField`], one face at a time. Inside each face the field is
//! linear; the next path point is where the steepest-descent ray leaves
//! the face. When the gradient is flat or the ray does not cross the face
//! (at borders and on vertices), the path snaps to the lowest corner of
//! the face and re-anchors around it.
//!
//! Every point lies on a mesh edge and is stored as an edge parameter, so
//! consumers can interpolate any per-vertex attribute along the path.

use mesh_connectivity::{Point3, TriMesh, Vector2};
use tracing::debug;

use crate::config::TracerConfig;
use crate::distance::DistanceField;
use crate::eikonal::LENGTH_EPSILON;
use crate::error::{GeodesicError, GeodesicResult};
use crate::trace::TracedPath;

/// A path point on a mesh edge.
///
/// Its position is `coord * v1 + (1 - coord) * v2`, so a point sitting on
/// a vertex has `coord == 1` and that vertex in `v1`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathPoint {
    /// First edge endpoint.
    pub v1: usize,
    /// Second edge endpoint.
    pub v2: usize,
    /// Weight of `v1`, in `[0, 1]`.
    pub coord: f64,
    /// Face the path continues through from this point.
    pub face: Option<usize>,
}

impl PathPoint {
    /// A point sitting exactly on `vertex`; `other` names the edge it was
    /// reached along (or will leave by).
    #[must_use]
    pub const fn at_vertex(vertex: usize, other: usize, face: Option<usize>) -> Self {
        Self {
            v1: vertex,
            v2: other,
            coord: 1.0,
            face,
        }
    }

    /// Cartesian position.
    #[must_use]
    pub fn position(&self, mesh: &TriMesh) -> Option<Point3<f64>> {
        let p1 = mesh.position(self.v1)?;
        let p2 = mesh.position(self.v2)?;
        Some(Point3::from(
            p1.coords * self.coord + p2.coords * (1.0 - self.coord),
        ))
    }

    /// The endpoint with the larger weight.
    #[must_use]
    pub fn nearest_vertex(&self) -> usize {
        if self.coord >= 0.5 { self.v1 } else { self.v2 }
    }

    /// The vertex this point coincides with, within `tolerance` of an endpoint.
    #[must_use]
    pub fn as_vertex(&self, tolerance: f64) -> Option<usize> {
        if self.v1 == self.v2 || self.coord >= 1.0 - tolerance {
            Some(self.v1)
        } else if self.coord <= tolerance {
            Some(self.v2)
        } else {
            None
        }
    }

    /// Linearly interpolated field value.
    #[must_use]
    pub fn interpolate(&self, field: &DistanceField) -> f64 {
        if self.v1 == self.v2 || self.coord >= 1.0 {
            return field.arrival(self.v1);
        }
        if self.coord <= 0.0 {
            return field.arrival(self.v2);
        }
        self.coord
            .mul_add(field.arrival(self.v1), (1.0 - self.coord) * field.arrival(self.v2))
    }
}

/// Outcome of one [`GeodesicPath::add_new_point`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    /// A point was added and the path can go on.
    Continue,
    /// The path arrived at a seed.
    ReachedSeed,
    /// No descent direction left (local minimum, unreached region or an
    /// unusable face).
    Stalled,
}

/// Outcome of [`GeodesicPath::compute_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraceStatus {
    /// The path ends at a seed.
    ReachedSeed,
    /// Tracing stopped before a seed.
    Stalled,
    /// The point budget ran out.
    PointLimit,
}

/// Steepest-descent tracer over a distance field.
///
/// # Example
///
/// ```
/// use mesh_connectivity::primitives::grid;
/// use mesh_geodesic::{FmmConfig, GeodesicPath, TraceStatus, geodesic_distance};
///
/// let mesh = grid(5, 5, 1.0);
/// let field = geodesic_distance(&mesh, &[0], &FmmConfig::default()).unwrap();
///
/// let mut tracer = GeodesicPath::new(&mesh, &field).unwrap();
/// let status = tracer.compute_path(24, 100).unwrap();
/// assert_eq!(status, TraceStatus::ReachedSeed);
/// assert_eq!(tracer.points().last().map(|p| p.v1), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct GeodesicPath<'a> {
    mesh: &'a TriMesh,
    field: &'a DistanceField,
    config: TracerConfig,
    points: Vec<PathPoint>,
    current_face: Option<usize>,
    previous_face: Option<usize>,
}

impl<'a> GeodesicPath<'a> {
    /// Create a tracer with default tolerances.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::SizeMismatch`] if the field does not have
    /// one value per vertex slot, and [`GeodesicError::NotConnected`] for a
    /// stale mesh.
    pub fn new(mesh: &'a TriMesh, field: &'a DistanceField) -> GeodesicResult<Self> {
        if !mesh.is_connected() {
            return Err(GeodesicError::NotConnected);
        }
        if field.len() != mesh.vertex_count() {
            return Err(GeodesicError::SizeMismatch {
                expected: mesh.vertex_count(),
                found: field.len(),
            });
        }

        Ok(Self {
            mesh,
            field,
            config: TracerConfig::default(),
            points: Vec::new(),
            current_face: None,
            previous_face: None,
        })
    }

    /// Replace the tolerances.
    #[must_use]
    pub const fn with_config(mut self, config: TracerConfig) -> Self {
        self.config = config;
        self
    }

    /// Points traced so far, start first.
    #[must_use]
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    /// Face the next step will descend through.
    #[must_use]
    pub const fn current_face(&self) -> Option<usize> {
        self.current_face
    }

    /// Drop all points.
    pub fn reset(&mut self) {
        self.points.clear();
        self.current_face = None;
        self.previous_face = None;
    }

    /// Start a new path at `start`.
    ///
    /// The first face is chosen on the side of the steepest spoke that
    /// descends faster.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::InvalidVertex`] if the slot is out of range
    /// or unset.
    pub fn init_path(&mut self, start: usize) -> GeodesicResult<()> {
        self.reset();
        if self.mesh.vertex_ref(start).is_none() {
            return Err(GeodesicError::InvalidVertex {
                index: start,
                vertex_count: self.mesh.vertex_count(),
            });
        }

        if let Some((toward, face)) = self.anchor(start, false) {
            self.points
                .push(PathPoint::at_vertex(start, toward, Some(face)));
            self.current_face = Some(face);
        } else {
            self.points.push(PathPoint::at_vertex(start, start, None));
        }

        debug!(
            start,
            distance = self.field.arrival(start),
            face = ?self.current_face,
            "Path initialized"
        );
        Ok(())
    }

    /// Extend the path by one segment.
    pub fn add_new_point(&mut self) -> PathStep {
        let Some(&last) = self.points.last() else {
            return PathStep::Stalled;
        };
        if self.is_seed_point(&last) {
            return PathStep::ReachedSeed;
        }
        let Some(mut face) = self.current_face else {
            return PathStep::Stalled;
        };

        // At most one re-anchor around a vertex per call
        for _ in 0..2 {
            let Some(corners) = self.mesh.face_vertices(face) else {
                return PathStep::Stalled;
            };

            if let Some(seed) = corners
                .into_iter()
                .find(|&c| self.field.arrival(c) <= self.config.seed_tolerance)
            {
                let other = corners.into_iter().find(|&c| c != seed).unwrap_or(seed);
                self.points.push(PathPoint::at_vertex(seed, other, Some(face)));
                return PathStep::ReachedSeed;
            }

            if let Some((point, exit)) = self.descend(face, &last) {
                self.points.push(point);
                if let Some(next) = exit {
                    self.previous_face = Some(face);
                    self.current_face = Some(next);
                }
                return if self.is_seed_point(&point) {
                    PathStep::ReachedSeed
                } else {
                    PathStep::Continue
                };
            }

            let Some(lowest) = corners
                .into_iter()
                .filter(|&c| self.field.arrival(c).is_finite())
                .min_by(|&a, &b| self.field.arrival(a).total_cmp(&self.field.arrival(b)))
            else {
                return PathStep::Stalled;
            };

            if last.as_vertex(self.config.coord_tolerance) != Some(lowest) {
                return self.snap_to(lowest, face);
            }

            // Already on the lowest corner: leave through a face holding a lower spoke
            match self.anchor(lowest, true) {
                Some((_, next)) if self.previous_face == Some(next) && !self.moved() => {
                    debug!(
                        vertex = lowest,
                        face = next,
                        "Path returned to previous face without progress"
                    );
                    return PathStep::Stalled;
                }
                Some((_, next)) if next != face => {
                    self.previous_face = Some(face);
                    self.current_face = Some(next);
                    face = next;
                }
                _ => {
                    debug!(vertex = lowest, "Path stalled at local minimum");
                    return PathStep::Stalled;
                }
            }
        }

        PathStep::Stalled
    }

    /// Trace from `start` until a seed, a stall or `max_points` points.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::InvalidVertex`] for a bad start vertex.
    pub fn compute_path(&mut self, start: usize, max_points: usize) -> GeodesicResult<TraceStatus> {
        self.init_path(start)?;
        if self.points.last().is_some_and(|p| self.is_seed_point(p)) {
            return Ok(TraceStatus::ReachedSeed);
        }

        while self.points.len() < max_points {
            match self.add_new_point() {
                PathStep::Continue => {}
                PathStep::ReachedSeed => {
                    debug!(points = self.points.len(), "Path reached seed");
                    return Ok(TraceStatus::ReachedSeed);
                }
                PathStep::Stalled => {
                    debug!(points = self.points.len(), "Path stalled");
                    return Ok(TraceStatus::Stalled);
                }
            }
        }

        debug!(max_points, "Path point limit reached");
        Ok(TraceStatus::PointLimit)
    }

    /// Positions, edge weights and arc length of the traced points.
    #[must_use]
    pub fn traced(&self, status: TraceStatus) -> TracedPath {
        TracedPath::from_points(self.mesh, self.field, &self.points, status)
    }

    /// Whether the last point lies elsewhere than the one before it.
    fn moved(&self) -> bool {
        let [.., before, last] = self.points.as_slice() else {
            return true;
        };
        let tol = self.config.coord_tolerance;
        if let (Some(a), Some(b)) = (before.as_vertex(tol), last.as_vertex(tol)) {
            return a != b;
        }
        let same_edge = if (before.v1, before.v2) == (last.v1, last.v2) {
            Some(last.coord)
        } else if (before.v1, before.v2) == (last.v2, last.v1) {
            Some(1.0 - last.coord)
        } else {
            None
        };
        same_edge.is_none_or(|coord| (coord - before.coord).abs() > tol)
    }

    fn is_seed_point(&self, point: &PathPoint) -> bool {
        point.interpolate(self.field) <= self.config.seed_tolerance
    }

    /// Lowest spoke around `vertex` and the face on its steeper side.
    ///
    /// With `strictly_lower`, only spokes below `vertex` itself qualify.
    fn anchor(&self, vertex: usize, strictly_lower: bool) -> Option<(usize, usize)> {
        let field = self.field;
        let ceiling = if strictly_lower {
            field.arrival(vertex)
        } else {
            f64::INFINITY
        };

        let best = self
            .mesh
            .vertex_fan(vertex)
            .iter()
            .filter(|s| field.arrival(s.vertex) < ceiling)
            .min_by(|a, b| field.arrival(a.vertex).total_cmp(&field.arrival(b.vertex)))?;

        let side = |v: Option<usize>| v.map_or(f64::INFINITY, |v| field.arrival(v));
        let face = match (best.left_face, best.right_face) {
            (Some(left), Some(right)) => {
                if side(best.prev_vertex) <= side(best.next_vertex) {
                    left
                } else {
                    right
                }
            }
            (left, right) => left.or(right)?,
        };

        Some((best.vertex, face))
    }

    /// Jump straight to corner `vertex` of `face` and re-anchor around it.
    fn snap_to(&mut self, vertex: usize, face: usize) -> PathStep {
        let Some((toward, next)) = self.anchor(vertex, true) else {
            self.points.push(PathPoint::at_vertex(vertex, vertex, Some(face)));
            debug!(vertex, "Path snapped into local minimum");
            return PathStep::Stalled;
        };

        self.points
            .push(PathPoint::at_vertex(vertex, toward, Some(next)));
        self.previous_face = Some(face);
        self.current_face = Some(next);
        PathStep::Continue
    }

    /// Follow the field gradient of `face` from `from` to the face border.
    ///
    /// Returns the crossing and the face beyond the crossed edge.
    fn descend(&self, face: usize, from: &PathPoint) -> Option<(PathPoint, Option<usize>)> {
        let corners = self.mesh.face_vertices(face)?;
        let [q0, q1, q2] = self.mesh.face_positions(face)?;
        let d = corners.map(|c| self.field.arrival(c));
        if d.iter().any(|x| !x.is_finite()) {
            return None;
        }

        // Local frame with q0 at the origin and q1 on the x axis
        let e1 = q1 - q0;
        let l1 = e1.norm();
        if l1 <= LENGTH_EPSILON {
            return None;
        }
        let ex = e1 / l1;
        let e2 = q2 - q0;
        let x2 = e2.dot(&ex);
        let perp = e2 - ex * x2;
        let y2 = perp.norm();
        if y2 <= LENGTH_EPSILON {
            return None;
        }
        let ey = perp / y2;

        let gx = (d[1] - d[0]) / l1;
        let gy = gx.mul_add(-x2, d[2] - d[0]) / y2;
        let grad = Vector2::new(gx, gy);
        let slope = grad.norm();
        if slope <= self.config.flat_gradient_tolerance {
            return None;
        }
        let dir = -grad / slope;

        let rel = from.position(self.mesh)? - q0;
        let origin = Vector2::new(rel.dot(&ex), rel.dot(&ey));
        let flat = [Vector2::zeros(), Vector2::new(l1, 0.0), Vector2::new(x2, y2)];

        let longest = l1.max(e2.norm()).max((q2 - q1).norm());
        let reach = self.config.step_factor * longest;
        let min_step = self.config.coord_tolerance * longest;
        let tol = self.config.coord_tolerance;

        let mut best: Option<(f64, usize, f64)> = None;
        for j in 0..3 {
            let a = flat[(j + 1) % 3];
            let edge = flat[(j + 2) % 3] - a;
            let denom = cross(&dir, &edge);
            if denom.abs() <= LENGTH_EPSILON * edge.norm() {
                continue;
            }

            let to_a = a - origin;
            let s = cross(&to_a, &edge) / denom;
            let lambda = cross(&to_a, &dir) / denom;
            if s <= min_step || s > reach || lambda < -tol || lambda > 1.0 + tol {
                continue;
            }
            if best.is_none_or(|(best_s, _, _)| s < best_s) {
                best = Some((s, j, lambda));
            }
        }

        let (_, j, lambda) = best?;
        let lambda = lambda.clamp(0.0, 1.0);
        let exit = self.mesh.face_ref(face)?.neighbors[j];

        Some((
            PathPoint {
                v1: corners[(j + 1) % 3],
                v2: corners[(j + 2) % 3],
                coord: 1.0 - lambda,
                face: Some(exit.unwrap_or(face)),
            },
            exit,
        ))
    }
}

#[inline]
fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x.mul_add(b.y, -(a.y * b.x))
}
