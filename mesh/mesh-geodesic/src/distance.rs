//! Distance field representation.
//!
//! Stores per-vertex distance values extracted from a fast marching solve.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-vertex distance field.
///
/// Vertices the front never reached carry the field's sentinel
/// ([`not_visited_value`](Self::not_visited_value)), `f64::INFINITY` unless
/// configured otherwise. Vertices still in the narrow band when a solve
/// stopped early carry their tentative value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceField {
    distances: Vec<f64>,
    not_visited: f64,
}

impl DistanceField {
    /// Create a field of `vertex_count` unreached vertices.
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        Self {
            distances: vec![f64::INFINITY; vertex_count],
            not_visited: f64::INFINITY,
        }
    }

    /// Wrap raw distances; non-finite values mean "not reached".
    #[must_use]
    pub const fn from_distances(distances: Vec<f64>) -> Self {
        Self {
            distances,
            not_visited: f64::INFINITY,
        }
    }

    /// Wrap distances whose unreached entries hold `sentinel`.
    #[must_use]
    pub const fn with_sentinel(distances: Vec<f64>, sentinel: f64) -> Self {
        Self {
            distances,
            not_visited: sentinel,
        }
    }

    /// Sentinel used for unreached vertices.
    #[inline]
    #[must_use]
    pub const fn not_visited_value(&self) -> f64 {
        self.not_visited
    }

    /// Stored value for a vertex, sentinel included.
    ///
    /// Returns the sentinel if the index is out of bounds.
    #[inline]
    #[must_use]
    pub fn distance(&self, vertex: usize) -> f64 {
        self.distances.get(vertex).copied().unwrap_or(self.not_visited)
    }

    /// Whether the front reached this vertex.
    #[inline]
    #[must_use]
    #[allow(clippy::float_cmp)] // sentinel is compared bit-for-bit
    pub fn is_reached(&self, vertex: usize) -> bool {
        self.distances
            .get(vertex)
            .is_some_and(|&d| d.is_finite() && d != self.not_visited)
    }

    /// Distance for arithmetic: unreached vertices read as `f64::INFINITY`
    /// whatever the sentinel.
    #[inline]
    #[must_use]
    pub fn arrival(&self, vertex: usize) -> f64 {
        if self.is_reached(vertex) {
            self.distances[vertex]
        } else {
            f64::INFINITY
        }
    }

    /// Number of vertex slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Whether the field has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Raw values, sentinel included.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.distances
    }

    /// Consume and return the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.distances
    }

    /// Iterate over (vertex index, stored value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.distances.iter().copied().enumerate()
    }

    /// Iterate over reached vertices only.
    pub fn iter_reached(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.iter().filter(|&(v, _)| self.is_reached(v))
    }

    /// Count of reached vertices.
    #[must_use]
    pub fn reached_count(&self) -> usize {
        self.iter_reached().count()
    }

    /// Largest reached distance, `0.0` if nothing was reached.
    #[must_use]
    pub fn max_distance(&self) -> f64 {
        self.iter_reached().map(|(_, d)| d).fold(0.0, f64::max)
    }

    /// The reached vertex farthest from the seeds.
    #[must_use]
    pub fn farthest_vertex(&self) -> Option<(usize, f64)> {
        self.iter_reached()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }

    /// Scale reached distances into `[0, 1]`; unreached entries keep the sentinel.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let max = self.max_distance();
        if max <= 0.0 {
            return self.clone();
        }

        let distances = self
            .iter()
            .map(|(v, d)| if self.is_reached(v) { d / max } else { d })
            .collect();

        Self {
            distances,
            not_visited: self.not_visited,
        }
    }
}

impl From<Vec<f64>> for DistanceField {
    fn from(distances: Vec<f64>) -> Self {
        Self::from_distances(distances)
    }
}
