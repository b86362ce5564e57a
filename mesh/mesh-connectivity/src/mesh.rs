//! Fixed-capacity triangle mesh store.

use nalgebra::{Point3, Vector3};

use crate::error::{TopologyError, TopologyResult};
use crate::fan::MAX_FAN_HOPS;
use crate::{Face, Vertex};

/// Arena of vertices and faces linked by index.
///
/// Capacity is declared up front with [`set_vertex_count`](Self::set_vertex_count)
/// and [`set_face_count`](Self::set_face_count); elements are then assigned
/// by index. Assignment never grows the arena. Slots that were never
/// assigned read back as `None`.
///
/// Face adjacency and vertex back-references are derived data: they are
/// rebuilt from scratch by [`build_connectivity`](Self::build_connectivity),
/// which must run again after any vertex or face assignment.
///
/// # Example
///
/// ```
/// use mesh_connectivity::{Face, TriMesh, Vertex};
///
/// let mut mesh = TriMesh::new();
/// mesh.set_vertex_count(3);
/// mesh.set_face_count(1);
/// mesh.set_vertex(0, Vertex::from_coords(0, 0.0, 0.0, 0.0)).unwrap();
/// mesh.set_vertex(1, Vertex::from_coords(1, 1.0, 0.0, 0.0)).unwrap();
/// mesh.set_vertex(2, Vertex::from_coords(2, 0.0, 1.0, 0.0)).unwrap();
/// mesh.set_face(0, Face::new([0, 1, 2])).unwrap();
/// mesh.build_connectivity().unwrap();
///
/// assert!(mesh.is_connected());
/// assert_eq!(mesh.boundary_edge_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct TriMesh {
    pub(crate) vertices: Vec<Option<Vertex>>,
    pub(crate) faces: Vec<Option<Face>>,
    pub(crate) connected: bool,
    pub(crate) max_fan_hops: usize,
}

impl Default for TriMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl TriMesh {
    /// Create an empty store with zero capacity.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            connected: false,
            max_fan_hops: MAX_FAN_HOPS,
        }
    }

    /// Create a store with the given number of empty vertex and face slots.
    #[must_use]
    pub fn with_counts(vertex_count: usize, face_count: usize) -> Self {
        let mut mesh = Self::new();
        mesh.set_vertex_count(vertex_count);
        mesh.set_face_count(face_count);
        mesh
    }

    /// Build a connected mesh from points and triangle cells.
    ///
    /// Each cell must list exactly three vertex indices. Vertex normals are
    /// computed once connectivity is in place.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::NonTriangleCell`] for a cell that is not a
    /// triangle, and any error of [`build_connectivity`](Self::build_connectivity).
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_connectivity::TriMesh;
    ///
    /// let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
    /// let cells = [vec![0, 1, 2], vec![0, 2, 3]];
    /// let mesh = TriMesh::from_triangles(&points, &cells).unwrap();
    ///
    /// assert_eq!(mesh.face_count(), 2);
    /// assert_eq!(mesh.face_ref(0).and_then(|f| f.neighbors[1]), Some(1));
    ///
    /// let quad = [vec![0, 1, 2, 3]];
    /// assert!(TriMesh::from_triangles(&points, &quad).is_err());
    /// ```
    pub fn from_triangles<C: AsRef<[usize]>>(
        points: &[[f64; 3]],
        cells: &[C],
    ) -> TopologyResult<Self> {
        let mut mesh = Self::with_counts(points.len(), cells.len());

        for (i, &[x, y, z]) in points.iter().enumerate() {
            mesh.set_vertex(i, Vertex::from_coords(i, x, y, z))?;
        }

        for (i, cell) in cells.iter().enumerate() {
            let &[a, b, c] = cell.as_ref() else {
                return Err(TopologyError::NonTriangleCell {
                    cell: i,
                    len: cell.as_ref().len(),
                });
            };
            mesh.set_face(i, Face::new([a, b, c]))?;
        }

        mesh.build_connectivity()?;
        mesh.compute_normals();
        Ok(mesh)
    }

    /// Build a connected mesh from points and fixed-size triangles.
    ///
    /// # Errors
    ///
    /// See [`from_triangles`](Self::from_triangles).
    pub fn from_faces(points: &[[f64; 3]], faces: &[[usize; 3]]) -> TopologyResult<Self> {
        Self::from_triangles(points, faces)
    }

    /// Declare the number of vertex slots.
    ///
    /// New slots are empty; shrinking drops trailing vertices.
    pub fn set_vertex_count(&mut self, count: usize) {
        self.vertices.resize(count, None);
        self.connected = false;
    }

    /// Declare the number of face slots.
    ///
    /// New slots are empty; shrinking drops trailing faces.
    pub fn set_face_count(&mut self, count: usize) {
        self.faces.resize(count, None);
        self.connected = false;
    }

    /// Declared number of vertex slots.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Declared number of face slots.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the store has no vertices or no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Assign vertex slot `index`.
    ///
    /// # Errors
    ///
    /// [`TopologyError::VertexOutOfRange`] if `index` is not below the declared count.
    pub fn set_vertex(&mut self, index: usize, vertex: Vertex) -> TopologyResult<()> {
        let count = self.vertices.len();
        let slot = self
            .vertices
            .get_mut(index)
            .ok_or(TopologyError::VertexOutOfRange { index, count })?;
        *slot = Some(vertex);
        self.connected = false;
        Ok(())
    }

    /// Assign face slot `index`.
    ///
    /// # Errors
    ///
    /// [`TopologyError::FaceOutOfRange`] if `index` is not below the declared count.
    pub fn set_face(&mut self, index: usize, face: Face) -> TopologyResult<()> {
        let count = self.faces.len();
        let slot = self
            .faces
            .get_mut(index)
            .ok_or(TopologyError::FaceOutOfRange { index, count })?;
        *slot = Some(face);
        self.connected = false;
        Ok(())
    }

    /// Read vertex slot `index`; `Ok(None)` if it was never assigned.
    ///
    /// # Errors
    ///
    /// [`TopologyError::VertexOutOfRange`] if `index` is not below the declared count.
    pub fn vertex(&self, index: usize) -> TopologyResult<Option<&Vertex>> {
        self.vertices
            .get(index)
            .map(Option::as_ref)
            .ok_or(TopologyError::VertexOutOfRange {
                index,
                count: self.vertices.len(),
            })
    }

    /// Read face slot `index`; `Ok(None)` if it was never assigned.
    ///
    /// # Errors
    ///
    /// [`TopologyError::FaceOutOfRange`] if `index` is not below the declared count.
    pub fn face(&self, index: usize) -> TopologyResult<Option<&Face>> {
        self.faces
            .get(index)
            .map(Option::as_ref)
            .ok_or(TopologyError::FaceOutOfRange {
                index,
                count: self.faces.len(),
            })
    }

    /// Vertex lookup that treats out-of-range and unset slots alike.
    #[inline]
    #[must_use]
    pub fn vertex_ref(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index).and_then(Option::as_ref)
    }

    /// Face lookup that treats out-of-range and unset slots alike.
    #[inline]
    #[must_use]
    pub fn face_ref(&self, index: usize) -> Option<&Face> {
        self.faces.get(index).and_then(Option::as_ref)
    }

    /// Iterate over assigned vertices as `(slot, vertex)` pairs.
    pub fn vertices(&self) -> impl Iterator<Item = (usize, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (i, v)))
    }

    /// Iterate over assigned faces as `(slot, face)` pairs.
    pub fn faces(&self) -> impl Iterator<Item = (usize, &Face)> {
        self.faces
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.as_ref().map(|f| (i, f)))
    }

    /// Whether adjacency is up to date with the last topology edit.
    #[inline]
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Hop bound used by the one-ring iterators.
    #[inline]
    #[must_use]
    pub const fn max_fan_hops(&self) -> usize {
        self.max_fan_hops
    }

    /// Override the hop bound used by the one-ring iterators.
    ///
    /// Vertices whose star spans more face crossings than this are treated
    /// as non-manifold.
    pub fn set_max_fan_hops(&mut self, hops: usize) {
        self.max_fan_hops = hops;
    }

    /// Position of a vertex.
    #[inline]
    #[must_use]
    pub fn position(&self, vertex: usize) -> Option<Point3<f64>> {
        self.vertex_ref(vertex).map(|v| v.position)
    }

    /// Vertex indices of a face.
    #[inline]
    #[must_use]
    pub fn face_vertices(&self, face: usize) -> Option<[usize; 3]> {
        self.face_ref(face).map(|f| f.vertices)
    }

    /// Neighbor faces of a face, in opposite-vertex order.
    #[inline]
    #[must_use]
    pub fn face_neighbors(&self, face: usize) -> Option<[Option<usize>; 3]> {
        self.face_ref(face).map(|f| f.neighbors)
    }

    /// Euclidean distance between two vertices.
    #[must_use]
    pub fn edge_length(&self, a: usize, b: usize) -> Option<f64> {
        Some((self.position(b)? - self.position(a)?).norm())
    }

    /// Corner positions of a face.
    #[must_use]
    pub fn face_positions(&self, face: usize) -> Option<[Point3<f64>; 3]> {
        let [a, b, c] = self.face_vertices(face)?;
        Some([self.position(a)?, self.position(b)?, self.position(c)?])
    }

    /// Unnormalized face normal (length is twice the face area).
    #[must_use]
    pub fn face_normal_unnormalized(&self, face: usize) -> Option<Vector3<f64>> {
        let [p0, p1, p2] = self.face_positions(face)?;
        Some((p1 - p0).cross(&(p2 - p0)))
    }

    /// Unit face normal; `None` for a degenerate face.
    #[must_use]
    pub fn face_normal(&self, face: usize) -> Option<Vector3<f64>> {
        let n = self.face_normal_unnormalized(face)?;
        let len_sq = n.norm_squared();
        (len_sq > f64::EPSILON).then(|| n / len_sq.sqrt())
    }

    /// Total surface area of all assigned faces.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        (0..self.faces.len())
            .filter_map(|f| self.face_normal_unnormalized(f))
            .map(|n| n.norm() * 0.5)
            .sum()
    }

    /// Number of face edges without a neighbor.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.faces().map(|(_, f)| f.boundary_edge_count()).sum()
    }
}
