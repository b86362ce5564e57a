//! Fast marching front propagation.
//!
//! The solver keeps every vertex in one of three states. Seeds start
//! [`Dead`](VertexState::Dead) at distance zero; their neighbors enter the
//! [`NarrowBand`](VertexState::NarrowBand) with tentative distances. Each
//! step finalizes the narrow-band vertex with the smallest distance and
//! re-solves the local Eikonal equation for the non-finalized corners of
//! every face around it.
//!
//! Per-vertex state lives in the solver, not in the mesh, so any number of
//! solvers can share one [`TriMesh`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use mesh_connectivity::{FanError, TriMesh};
use tracing::{debug, info, warn};

use crate::config::FmmConfig;
use crate::distance::DistanceField;
use crate::eikonal::{self, UpdateKind};
use crate::error::{GeodesicError, GeodesicResult};
use crate::summary::SolveSummary;
use crate::unfold::unfold;

/// Propagation state of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexState {
    /// Not reached by the front.
    Far,
    /// Tentative distance, waiting in the priority queue.
    NarrowBand,
    /// Final distance; never changes again.
    Dead,
}

type WeightFn<'a> = Box<dyn Fn(usize) -> f64 + 'a>;
type StopFn<'a> = Box<dyn Fn(usize, f64) -> bool + 'a>;
type AdmitFn<'a> = Box<dyn Fn(usize, f64) -> bool + 'a>;
type ObserverFn<'a> = Box<dyn FnMut(usize, f64) + 'a>;

/// Local propagation cost per unit length.
enum Weighting<'a> {
    Uniform,
    PerVertex(Vec<f64>),
    Custom(WeightFn<'a>),
}

/// Narrow-band entry. Ordering is reversed for a min-heap; stale entries
/// (superseded by a later decrease) are skipped on pop.
#[derive(Debug, Clone, Copy)]
struct BandEntry {
    vertex: usize,
    distance: f64,
}

impl PartialEq for BandEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BandEntry {}

impl PartialOrd for BandEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BandEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// Fast marching solver over a borrowed mesh.
///
/// # Example
///
/// ```
/// use mesh_connectivity::primitives::unit_square;
/// use mesh_geodesic::FastMarching;
///
/// let mesh = unit_square();
/// let mut fmm = FastMarching::new(&mesh).unwrap();
/// fmm.add_seed(0).unwrap();
/// let summary = fmm.solve().unwrap();
///
/// assert_eq!(summary.visited, 4);
/// assert!((fmm.distance(1) - 1.0).abs() < 1e-12);
/// assert!((fmm.distance(2) - 2.0_f64.sqrt()).abs() < 1e-12);
/// ```
pub struct FastMarching<'a> {
    mesh: &'a TriMesh,
    config: FmmConfig,

    distance: Vec<f64>,
    state: Vec<VertexState>,
    band: BinaryHeap<BandEntry>,
    seeds: Vec<usize>,

    weighting: Weighting<'a>,
    stops: Vec<StopFn<'a>>,
    admissions: Vec<AdmitFn<'a>>,
    observer: Option<ObserverFn<'a>>,

    stopped: bool,
    /// Vertex finalized by the last stopping step, relaxed on resume.
    deferred: Option<usize>,
    steps: usize,
    unfolds: usize,
    degenerate_updates: usize,
    nonmanifold_fans: usize,
}

impl fmt::Debug for FastMarching<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastMarching")
            .field("vertices", &self.distance.len())
            .field("config", &self.config)
            .field("seeds", &self.seeds)
            .field("band", &self.band.len())
            .field("steps", &self.steps)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl<'a> FastMarching<'a> {
    /// Create a solver with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::NotConnected`] if the mesh was edited after
    /// its connectivity was built.
    pub fn new(mesh: &'a TriMesh) -> GeodesicResult<Self> {
        Self::with_config(mesh, FmmConfig::default())
    }

    /// Create a solver with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::NotConnected`] if the mesh was edited after
    /// its connectivity was built.
    pub fn with_config(mesh: &'a TriMesh, config: FmmConfig) -> GeodesicResult<Self> {
        if !mesh.is_connected() {
            return Err(GeodesicError::NotConnected);
        }

        let n = mesh.vertex_count();
        Ok(Self {
            mesh,
            config,
            distance: vec![f64::INFINITY; n],
            state: vec![VertexState::Far; n],
            band: BinaryHeap::new(),
            seeds: Vec::new(),
            weighting: Weighting::Uniform,
            stops: Vec::new(),
            admissions: Vec::new(),
            observer: None,
            stopped: false,
            deferred: None,
            steps: 0,
            unfolds: 0,
            degenerate_updates: 0,
            nonmanifold_fans: 0,
        })
    }

    /// Use one propagation cost per vertex slot.
    ///
    /// Larger weights slow the front down; the computed value is the
    /// weighted arrival time rather than a plain length.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::SizeMismatch`] if `weights` does not have one
    /// entry per vertex slot, and [`GeodesicError::InvalidWeight`] for a
    /// non-finite or non-positive entry.
    pub fn with_weights(mut self, weights: Vec<f64>) -> GeodesicResult<Self> {
        if weights.len() != self.distance.len() {
            return Err(GeodesicError::SizeMismatch {
                expected: self.distance.len(),
                found: weights.len(),
            });
        }
        if let Some((vertex, &value)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w > 0.0))
        {
            return Err(GeodesicError::InvalidWeight { vertex, value });
        }

        self.weighting = Weighting::PerVertex(weights);
        Ok(self)
    }

    /// Compute the propagation cost of a vertex on demand.
    ///
    /// A vertex whose cost is not finite and positive is never entered.
    #[must_use]
    pub fn with_weight_fn(mut self, weight: impl Fn(usize) -> f64 + 'a) -> Self {
        self.weighting = Weighting::Custom(Box::new(weight));
        self
    }

    /// Stop once a vertex farther than `radius` is finalized.
    #[must_use]
    pub fn with_stop_radius(self, radius: f64) -> Self {
        self.with_stop_fn(move |_, distance| distance > radius)
    }

    /// Stop as soon as any of `targets` is finalized.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::InvalidVertex`] for an index past the last
    /// vertex slot.
    pub fn with_destinations(self, targets: &[usize]) -> GeodesicResult<Self> {
        let mask = self.vertex_mask(targets)?;
        Ok(self.with_stop_fn(move |vertex, _| mask[vertex]))
    }

    /// Stop when `stop(vertex, distance)` holds for a freshly finalized vertex.
    ///
    /// Criteria accumulate; the first one to fire ends the solve.
    #[must_use]
    pub fn with_stop_fn(mut self, stop: impl Fn(usize, f64) -> bool + 'a) -> Self {
        self.stops.push(Box::new(stop));
        self
    }

    /// Never enter any of `excluded` into the narrow band.
    ///
    /// Seeds are placed regardless.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::InvalidVertex`] for an index past the last
    /// vertex slot.
    pub fn with_exclusions(self, excluded: &[usize]) -> GeodesicResult<Self> {
        let mask = self.vertex_mask(excluded)?;
        Ok(self.with_admission_fn(move |vertex, _| !mask[vertex]))
    }

    /// Veto narrow-band entries: `admit(vertex, candidate)` must return
    /// `true` for the front to improve `vertex`.
    #[must_use]
    pub fn with_admission_fn(mut self, admit: impl Fn(usize, f64) -> bool + 'a) -> Self {
        self.admissions.push(Box::new(admit));
        self
    }

    /// Observe every vertex popped from the narrow band, in order.
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(usize, f64) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// The solver configuration.
    #[must_use]
    pub const fn config(&self) -> &FmmConfig {
        &self.config
    }

    /// The mesh being marched over.
    #[must_use]
    pub const fn mesh(&self) -> &'a TriMesh {
        self.mesh
    }

    /// Seeds added since the last reset, in insertion order.
    #[must_use]
    pub fn seeds(&self) -> &[usize] {
        &self.seeds
    }

    /// Whether the last step hit a stop criterion or nothing is left to do.
    ///
    /// A stopped solver can still be resumed with [`step_once`](Self::step_once)
    /// or [`solve`](Self::solve).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stopped || (self.band.is_empty() && self.deferred.is_none())
    }

    /// Forget all propagation state. Hooks and configuration are kept.
    pub fn reset(&mut self) {
        self.distance.fill(f64::INFINITY);
        self.state.fill(VertexState::Far);
        self.band.clear();
        self.seeds.clear();
        self.stopped = false;
        self.deferred = None;
        self.steps = 0;
        self.unfolds = 0;
        self.degenerate_updates = 0;
        self.nonmanifold_fans = 0;
    }

    /// Place a seed at `vertex` and relax its neighbors.
    ///
    /// Seeding an already finalized vertex is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::InvalidVertex`] if the slot is out of range
    /// or unset.
    pub fn add_seed(&mut self, vertex: usize) -> GeodesicResult<()> {
        if self.mesh.vertex_ref(vertex).is_none() {
            return Err(GeodesicError::InvalidVertex {
                index: vertex,
                vertex_count: self.mesh.vertex_count(),
            });
        }
        if self.state[vertex] == VertexState::Dead {
            debug!(vertex, "Seed already finalized, ignoring");
            return Ok(());
        }

        self.distance[vertex] = 0.0;
        self.state[vertex] = VertexState::Dead;
        self.seeds.push(vertex);
        self.relax_around(vertex);
        Ok(())
    }

    /// Place several seeds.
    ///
    /// # Errors
    ///
    /// Stops at the first invalid vertex; seeds before it stay placed.
    pub fn add_seeds(&mut self, vertices: &[usize]) -> GeodesicResult<()> {
        vertices.iter().try_for_each(|&v| self.add_seed(v))
    }

    /// Finalize one vertex.
    ///
    /// Returns `true` when propagation is over: the band is empty or a stop
    /// criterion fired on the vertex just finalized. After a stop, the next
    /// call relaxes around that vertex and carries on with the band.
    pub fn step_once(&mut self) -> bool {
        self.stopped = false;
        if let Some(p) = self.deferred.take() {
            self.relax_around(p);
        }
        let Some(p) = self.pop_min() else {
            return true;
        };

        let d = self.distance[p];
        if let Some(observer) = self.observer.as_mut() {
            observer(p, d);
        }
        self.state[p] = VertexState::Dead;
        self.steps += 1;

        if self.stops.iter().any(|stop| stop(p, d)) {
            debug!(vertex = p, distance = d, "Stop criterion reached");
            self.stopped = true;
            self.deferred = Some(p);
            return true;
        }

        self.relax_around(p);
        false
    }

    /// Run to completion or until a stop criterion fires.
    ///
    /// # Errors
    ///
    /// Returns [`GeodesicError::NoSeed`] if no seed was added.
    pub fn solve(&mut self) -> GeodesicResult<SolveSummary> {
        if self.seeds.is_empty() {
            return Err(GeodesicError::NoSeed);
        }

        info!(
            vertices = self.mesh.vertex_count(),
            seeds = self.seeds.len(),
            method = ?self.config.method,
            "Starting fast marching"
        );

        while !self.step_once() {}

        let summary = self.summary();
        info!(
            visited = summary.visited,
            max_distance = summary.max_distance,
            steps = summary.steps,
            stopped_early = summary.stopped_early,
            "Fast marching complete"
        );
        if summary.nonmanifold_fans > 0 {
            warn!(
                count = summary.nonmanifold_fans,
                "Front did not propagate past some non-manifold vertices"
            );
        }

        Ok(summary)
    }

    /// Statistics for the current state.
    #[must_use]
    pub fn summary(&self) -> SolveSummary {
        let (visited, max_distance) = self
            .state
            .iter()
            .zip(&self.distance)
            .filter(|(s, _)| **s == VertexState::Dead)
            .fold((0, 0.0_f64), |(n, max), (_, &d)| (n + 1, max.max(d)));

        SolveSummary {
            seeds: self.seeds.len(),
            visited,
            max_distance,
            stopped_early: self.stopped,
            steps: self.steps,
            unfolds: self.unfolds,
            degenerate_updates: self.degenerate_updates,
            nonmanifold_fans: self.nonmanifold_fans,
        }
    }

    /// Current distance of a vertex; `f64::INFINITY` when not reached or
    /// out of range.
    #[inline]
    #[must_use]
    pub fn distance(&self, vertex: usize) -> f64 {
        self.distance.get(vertex).copied().unwrap_or(f64::INFINITY)
    }

    /// Current state of a vertex.
    #[inline]
    #[must_use]
    pub fn state(&self, vertex: usize) -> Option<VertexState> {
        self.state.get(vertex).copied()
    }

    /// Raw distances, `f64::INFINITY` for unreached vertices.
    #[must_use]
    pub fn distances(&self) -> &[f64] {
        &self.distance
    }

    /// Distances with the configured sentinel for unreached vertices.
    #[must_use]
    pub fn distance_field(&self) -> DistanceField {
        self.distances_with_sentinel(self.config.not_visited_value)
    }

    /// Distances with an explicit sentinel for unreached vertices.
    ///
    /// Narrow-band vertices of an early-stopped solve carry their
    /// tentative value.
    #[must_use]
    pub fn distances_with_sentinel(&self, sentinel: f64) -> DistanceField {
        let values = self
            .state
            .iter()
            .zip(&self.distance)
            .map(|(s, &d)| if *s == VertexState::Far { sentinel } else { d })
            .collect();
        DistanceField::with_sentinel(values, sentinel)
    }

    fn vertex_mask(&self, vertices: &[usize]) -> GeodesicResult<Vec<bool>> {
        let n = self.distance.len();
        let mut mask = vec![false; n];
        for &v in vertices {
            let slot = mask.get_mut(v).ok_or(GeodesicError::InvalidVertex {
                index: v,
                vertex_count: n,
            })?;
            *slot = true;
        }
        Ok(mask)
    }

    fn pop_min(&mut self) -> Option<usize> {
        while let Some(BandEntry { vertex, distance }) = self.band.pop() {
            // Skip finalized vertices and superseded entries
            if self.state[vertex] != VertexState::NarrowBand || distance > self.distance[vertex] {
                continue;
            }
            return Some(vertex);
        }
        None
    }

    fn weight_at(&self, vertex: usize) -> Option<f64> {
        let w = match &self.weighting {
            Weighting::Uniform => return Some(1.0),
            Weighting::PerVertex(weights) => weights[vertex],
            Weighting::Custom(weight) => weight(vertex),
        };
        (w.is_finite() && w > 0.0).then_some(w)
    }

    fn relax_around(&mut self, p: usize) {
        let mesh = self.mesh;
        let wedges = match mesh.face_fan(p).try_wedges() {
            Ok(wedges) => wedges,
            Err(FanError::Isolated(_)) => return,
            Err(err) => {
                self.nonmanifold_fans += 1;
                warn!(vertex = p, %err, "Skipping relaxation around vertex");
                return;
            }
        };

        for wedge in wedges {
            for (v, w) in [(wedge.from, wedge.to), (wedge.to, wedge.from)] {
                if self.state[v] != VertexState::Dead {
                    self.relax(v, p, w, wedge.face);
                }
            }
        }
    }

    /// Update `v` from the finalized vertex `p` across the face `(v, p, w)`.
    fn relax(&mut self, v: usize, p: usize, w: usize, face: usize) {
        let Some(weight) = self.weight_at(v) else {
            return;
        };

        let candidate = if self.state[w] == VertexState::Far {
            self.mesh
                .edge_length(p, v)
                .map_or(f64::INFINITY, |len| {
                    eikonal::one_point(self.distance[p], len, weight)
                })
        } else {
            self.face_update(v, p, w, face, weight)
        };

        if candidate.is_nan() || candidate >= self.distance[v] {
            return;
        }
        if !self.admissions.iter().all(|admit| admit(v, candidate)) {
            return;
        }

        self.distance[v] = candidate;
        self.state[v] = VertexState::NarrowBand;
        self.band.push(BandEntry {
            vertex: v,
            distance: candidate,
        });
    }

    /// Two-corner update at `v` from `p` and `w`, unfolding obtuse angles.
    fn face_update(&mut self, v: usize, p: usize, w: usize, face: usize, weight: f64) -> f64 {
        let mesh = self.mesh;
        let (Some(pv), Some(pp), Some(pw)) = (mesh.position(v), mesh.position(p), mesh.position(w))
        else {
            return f64::INFINITY;
        };

        let e1 = pp - pv;
        let e2 = pw - pv;
        let (len1, len2) = (e1.norm(), e2.norm());
        let cos = e1.dot(&e2) / (len1 * len2);
        let (d1, d2) = (self.distance[p], self.distance[w]);
        let method = self.config.method;

        if self.config.unfolding && cos < 0.0 {
            let found = unfold(mesh, face, v, p, w, self.config.max_unfold_steps)
                .filter(|u| self.state[u.vertex] != VertexState::Far);
            if let Some(u) = found {
                self.unfolds += 1;
                let d3 = self.distance[u.vertex];
                let near = eikonal::two_point(method, d1, d3, len1, u.length, u.cos1, weight);
                let far = eikonal::two_point(method, d3, d2, u.length, len2, u.cos2, weight);
                self.count_degenerate(near.kind);
                self.count_degenerate(far.kind);
                return near.distance.min(far.distance);
            }
        }

        let candidate = eikonal::two_point(method, d1, d2, len1, len2, cos, weight);
        self.count_degenerate(candidate.kind);
        candidate.distance
    }

    fn count_degenerate(&mut self, kind: UpdateKind) {
        if kind == UpdateKind::Degenerate {
            self.degenerate_updates += 1;
        }
    }
}

/// Distances from `seeds` to every reachable vertex in one call.
///
/// # Errors
///
/// Returns [`GeodesicError::NotConnected`] for a stale mesh,
/// [`GeodesicError::InvalidVertex`] for a bad seed and
/// [`GeodesicError::NoSeed`] if `seeds` is empty.
///
/// # Example
///
/// ```
/// use mesh_connectivity::primitives::grid;
/// use mesh_geodesic::{FmmConfig, geodesic_distance};
///
/// let mesh = grid(3, 2, 1.0);
/// let field = geodesic_distance(&mesh, &[0], &FmmConfig::default()).unwrap();
/// assert!((field.distance(2) - 2.0).abs() < 1e-12);
/// ```
pub fn geodesic_distance(
    mesh: &TriMesh,
    seeds: &[usize],
    config: &FmmConfig,
) -> GeodesicResult<DistanceField> {
    let mut fmm = FastMarching::with_config(mesh, config.clone())?;
    fmm.add_seeds(seeds)?;
    fmm.solve()?;
    Ok(fmm.distance_field())
}
