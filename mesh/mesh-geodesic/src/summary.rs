//! Solve statistics.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Statistics from a fast marching solve.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveSummary {
    /// Number of seed vertices.
    pub seeds: usize,

    /// Number of finalized vertices, seeds included.
    pub visited: usize,

    /// Largest finalized distance.
    pub max_distance: f64,

    /// Whether the last step ended on a stop criterion rather than an empty band.
    pub stopped_early: bool,

    /// Number of vertices popped from the narrow band.
    pub steps: usize,

    /// Two-corner updates that used an unfolded vertex.
    pub unfolds: usize,

    /// Updates that hit a collapsed edge or collinear corners.
    pub degenerate_updates: usize,

    /// Finalized vertices whose face fan could not be walked.
    pub nonmanifold_fans: usize,
}

impl SolveSummary {
    /// Fraction of `vertex_count` that was finalized.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // vertex counts are far below 2^52
    pub fn coverage(&self, vertex_count: usize) -> f64 {
        if vertex_count == 0 {
            return 0.0;
        }
        self.visited as f64 / vertex_count as f64
    }
}

impl fmt::Display for SolveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fast marching: {} vertices finalized from {} seeds in {} steps, max distance {:.4}",
            self.visited, self.seeds, self.steps, self.max_distance
        )?;
        if self.stopped_early {
            write!(f, " (stopped early)")?;
        }
        if self.unfolds > 0 || self.degenerate_updates > 0 || self.nonmanifold_fans > 0 {
            write!(
                f,
                " [{} unfolds, {} degenerate, {} non-manifold]",
                self.unfolds, self.degenerate_updates, self.nonmanifold_fans
            )?;
        }
        Ok(())
    }
}
