//! Error types for mesh store construction and traversal.

use thiserror::Error;

/// Result type for mesh store operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Invalid mesh topology.
///
/// Every variant aborts the requested operation and is surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// An input cell did not have exactly three vertices.
    #[error("cell {cell} has {len} vertices, only triangles are supported")]
    NonTriangleCell {
        /// Index of the offending cell.
        cell: usize,
        /// Number of vertices in the cell.
        len: usize,
    },

    /// Vertex index outside the declared vertex count.
    #[error("vertex index {index} out of range (mesh declares {count} vertices)")]
    VertexOutOfRange {
        /// The invalid index.
        index: usize,
        /// Declared vertex count.
        count: usize,
    },

    /// Face index outside the declared face count.
    #[error("face index {index} out of range (mesh declares {count} faces)")]
    FaceOutOfRange {
        /// The invalid index.
        index: usize,
        /// Declared face count.
        count: usize,
    },

    /// A vertex slot was never assigned.
    #[error("vertex slot {0} is unset")]
    UnsetVertex(usize),

    /// A face slot was never assigned.
    #[error("face slot {0} is unset")]
    UnsetFace(usize),

    /// A face references the same vertex more than once.
    #[error("face {face} references vertex {vertex} more than once")]
    RepeatedVertex {
        /// The degenerate face.
        face: usize,
        /// The repeated vertex.
        vertex: usize,
    },

    /// Face adjacency is not symmetric, usually an edge shared by three or more faces.
    #[error("face {face} lists {neighbor} as a neighbor but the link is not reciprocated")]
    AsymmetricAdjacency {
        /// Face holding the one-sided link.
        face: usize,
        /// Face it points to.
        neighbor: usize,
    },
}

/// Failure to walk the one-ring of a vertex.
///
/// Iterators recover from these by producing an empty sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FanError {
    /// The walk exceeded the hop bound without closing or reaching a boundary.
    #[error("fan around vertex {vertex} exceeds {max_hops} hops, treating it as non-manifold")]
    NonManifold {
        /// Center of the fan.
        vertex: usize,
        /// The hop bound that was exceeded.
        max_hops: usize,
    },

    /// The vertex has no incident face (or does not exist).
    #[error("vertex {0} has no incident face")]
    Isolated(usize),
}
