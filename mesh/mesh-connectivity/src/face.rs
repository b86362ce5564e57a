//! Triangle faces and the opposite-vertex indexing convention.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle of a [`TriMesh`](crate::TriMesh).
///
/// Edges and neighbors follow the *opposite-vertex* convention: edge `i`
/// is the edge that does not touch `vertices[i]`, and `neighbors[i]` is the
/// face on the other side of that edge (`None` on a mesh boundary).
///
/// ```text
///            v0
///           /  \
///   edge 2 /    \ edge 1
///         /      \
///       v1 ------ v2
///          edge 0
/// ```
///
/// # Example
///
/// ```
/// use mesh_connectivity::Face;
///
/// let f = Face::new([3, 5, 8]);
/// assert_eq!(f.edge(0), (5, 8));
/// assert_eq!(f.local_index(8), Some(2));
/// assert_eq!(f.third_vertex(3, 8), Some(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Face {
    /// Vertex indices into the owning mesh.
    pub vertices: [usize; 3],

    /// Neighbor face across the edge opposite each vertex.
    pub neighbors: [Option<usize>; 3],
}

impl Face {
    /// Create a face with no neighbors.
    #[inline]
    #[must_use]
    pub const fn new(vertices: [usize; 3]) -> Self {
        Self {
            vertices,
            neighbors: [None; 3],
        }
    }

    /// Endpoints of the edge opposite local vertex `i` (`i` taken modulo 3).
    #[inline]
    #[must_use]
    pub const fn edge(&self, i: usize) -> (usize, usize) {
        (self.vertices[(i + 1) % 3], self.vertices[(i + 2) % 3])
    }

    /// Local position (0, 1 or 2) of a mesh vertex in this face.
    #[inline]
    #[must_use]
    pub fn local_index(&self, vertex: usize) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }

    /// Whether the face uses the given vertex.
    #[inline]
    #[must_use]
    pub fn contains(&self, vertex: usize) -> bool {
        self.vertices.contains(&vertex)
    }

    /// The vertex that is neither `a` nor `b`.
    ///
    /// Returns `None` if `a` or `b` is not a vertex of this face.
    #[must_use]
    pub fn third_vertex(&self, a: usize, b: usize) -> Option<usize> {
        if a == b || !self.contains(a) || !self.contains(b) {
            return None;
        }
        self.vertices.iter().copied().find(|&v| v != a && v != b)
    }

    /// Neighbor across the edge opposite the given mesh vertex.
    ///
    /// `None` both at a boundary and when `vertex` is not in this face.
    #[inline]
    #[must_use]
    pub fn neighbor_opposite(&self, vertex: usize) -> Option<usize> {
        self.local_index(vertex).and_then(|i| self.neighbors[i])
    }

    /// Local index of the edge with endpoints `a` and `b`, in either order.
    #[must_use]
    pub fn edge_index(&self, a: usize, b: usize) -> Option<usize> {
        self.third_vertex(a, b).and_then(|c| self.local_index(c))
    }

    /// Number of boundary edges of this face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.neighbors.iter().filter(|n| n.is_none()).count()
    }
}
