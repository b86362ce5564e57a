//! Solver and tracer configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default bound on how many faces an obtuse-angle unfolding may cross.
pub const DEFAULT_MAX_UNFOLD_STEPS: usize = 50;

/// Local update rule used to propagate the front across a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UpdateMethod {
    /// Kimmel-Sethian quadratic with the upwind acceptance test.
    #[default]
    Quadratic,
    /// Gradient form built on the inverse Gram matrix of the edge directions.
    Matrix,
}

/// Parameters for [`FastMarching`](crate::FastMarching).
///
/// # Example
///
/// ```
/// use mesh_geodesic::{FmmConfig, UpdateMethod};
///
/// let config = FmmConfig::default()
///     .with_method(UpdateMethod::Matrix)
///     .with_not_visited_value(-1.0);
/// assert!(config.unfolding);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FmmConfig {
    /// Two-corner update rule.
    pub method: UpdateMethod,

    /// Unfold neighboring faces when the angle at the updated vertex is obtuse.
    pub unfolding: bool,

    /// Maximum number of faces crossed while searching for an unfolded vertex.
    pub max_unfold_steps: usize,

    /// Value reported for vertices the front never reached.
    pub not_visited_value: f64,
}

impl Default for FmmConfig {
    fn default() -> Self {
        Self {
            method: UpdateMethod::Quadratic,
            unfolding: true,
            max_unfold_steps: DEFAULT_MAX_UNFOLD_STEPS,
            not_visited_value: f64::INFINITY,
        }
    }
}

impl FmmConfig {
    /// Create config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain per-triangle updates, no unfolding. Slightly less accurate on
    /// meshes with obtuse triangles.
    #[must_use]
    pub fn without_unfolding() -> Self {
        Self {
            unfolding: false,
            ..Self::default()
        }
    }

    /// Set the update rule.
    #[must_use]
    pub const fn with_method(mut self, method: UpdateMethod) -> Self {
        self.method = method;
        self
    }

    /// Enable or disable obtuse-angle unfolding.
    #[must_use]
    pub const fn with_unfolding(mut self, unfolding: bool) -> Self {
        self.unfolding = unfolding;
        self
    }

    /// Set the unfolding depth bound.
    #[must_use]
    pub const fn with_max_unfold_steps(mut self, steps: usize) -> Self {
        self.max_unfold_steps = steps;
        self
    }

    /// Set the sentinel reported for unreached vertices.
    #[must_use]
    pub const fn with_not_visited_value(mut self, value: f64) -> Self {
        self.not_visited_value = value;
        self
    }
}

/// Parameters for [`GeodesicPath`](crate::GeodesicPath).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TracerConfig {
    /// Length of the descent ray, as a multiple of the longest edge of the
    /// current face.
    pub step_factor: f64,

    /// Distances at or below this count as a seed.
    pub seed_tolerance: f64,

    /// Relative tolerance on edge parameters and on "already at this vertex".
    pub coord_tolerance: f64,

    /// Gradients shorter than this are treated as flat.
    pub flat_gradient_tolerance: f64,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            step_factor: 2.0,
            seed_tolerance: 1e-9,
            coord_tolerance: 1e-6,
            flat_gradient_tolerance: 1e-12,
        }
    }
}

impl TracerConfig {
    /// Create config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the seed tolerance.
    #[must_use]
    pub const fn with_seed_tolerance(mut self, tolerance: f64) -> Self {
        self.seed_tolerance = tolerance;
        self
    }

    /// Set the descent ray length factor.
    #[must_use]
    pub const fn with_step_factor(mut self, factor: f64) -> Self {
        self.step_factor = factor;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FmmConfig::default();
        assert_eq!(config.method, UpdateMethod::Quadratic);
        assert!(config.unfolding);
        assert_eq!(config.max_unfold_steps, 50);
        assert!(config.not_visited_value.is_infinite());

        assert!(!FmmConfig::without_unfolding().unfolding);
    }

    #[test]
    fn builders_chain() {
        let config = FmmConfig::new()
            .with_method(UpdateMethod::Matrix)
            .with_unfolding(false)
            .with_max_unfold_steps(3)
            .with_not_visited_value(-1.0);
        assert_eq!(config.method, UpdateMethod::Matrix);
        assert!(!config.unfolding);
        assert_eq!(config.max_unfold_steps, 3);
        assert!((config.not_visited_value + 1.0).abs() < f64::EPSILON);

        let tracer = TracerConfig::new().with_seed_tolerance(1e-3).with_step_factor(3.0);
        assert!((tracer.seed_tolerance - 1e-3).abs() < f64::EPSILON);
        assert!((tracer.step_factor - 3.0).abs() < f64::EPSILON);
    }
}
