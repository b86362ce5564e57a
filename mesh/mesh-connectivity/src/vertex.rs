//! Mesh vertices.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A vertex of a [`TriMesh`](crate::TriMesh).
///
/// Besides its geometry, a vertex stores a single back-reference to one
/// incident face. That one face is enough to start a walk around the whole
/// vertex star (see [`TriMesh::face_fan`](crate::TriMesh::face_fan)).
///
/// # Example
///
/// ```
/// use mesh_connectivity::{Point3, Vertex};
///
/// let v = Vertex::new(4, Point3::new(1.0, 2.0, 3.0));
/// assert_eq!(v.id, 4);
/// assert!(v.incident_face.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,

    /// Unit normal. Zero until [`TriMesh::compute_normals`](crate::TriMesh::compute_normals) runs.
    pub normal: Vector3<f64>,

    /// Unique identifier, by convention the slot index.
    pub id: usize,

    /// Any face touching this vertex, `None` for an isolated vertex.
    ///
    /// Maintained by [`TriMesh::build_connectivity`](crate::TriMesh::build_connectivity).
    pub incident_face: Option<usize>,
}

impl Vertex {
    /// Create a vertex with no normal and no incident face.
    #[inline]
    #[must_use]
    pub fn new(id: usize, position: Point3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            id,
            incident_face: None,
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    #[must_use]
    pub fn from_coords(id: usize, x: f64, y: f64, z: f64) -> Self {
        Self::new(id, Point3::new(x, y, z))
    }

    /// Whether the vertex touches at least one face.
    #[inline]
    #[must_use]
    pub const fn is_isolated(&self) -> bool {
        self.incident_face.is_none()
    }
}
