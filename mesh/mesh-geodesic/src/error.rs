//! Error types for geodesic distance computation and path tracing.

use mesh_connectivity::TopologyError;
use thiserror::Error;

/// Result type for geodesic operations.
pub type GeodesicResult<T> = Result<T, GeodesicError>;

/// Errors that can occur during fast marching or path tracing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeodesicError {
    /// The mesh failed to build its connectivity.
    #[error("invalid mesh topology: {0}")]
    InvalidTopology(#[from] TopologyError),

    /// The mesh was edited after its adjacency was built.
    #[error("mesh connectivity is stale, call build_connectivity first")]
    NotConnected,

    /// A solve was requested before any seed was added.
    #[error("no seed vertex was added before solving")]
    NoSeed,

    /// Invalid vertex index.
    #[error("invalid vertex index: {index} (mesh has {vertex_count} vertices)")]
    InvalidVertex {
        /// The invalid index.
        index: usize,
        /// Total number of vertex slots in the mesh.
        vertex_count: usize,
    },

    /// A per-vertex weight is not a finite positive number.
    #[error("invalid weight {value} at vertex {vertex}: weights must be finite and positive")]
    InvalidWeight {
        /// Vertex carrying the weight.
        vertex: usize,
        /// The offending value.
        value: f64,
    },

    /// A per-vertex array does not have one entry per vertex slot.
    #[error("expected {expected} per-vertex values, got {found}")]
    SizeMismatch {
        /// Number of vertex slots in the mesh.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },
}
