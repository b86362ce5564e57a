//! One-ring traversal: faces around a vertex and vertices around a vertex.
//!
//! Both walks rotate around a center vertex by repeatedly crossing the edge
//! opposite the current *direction vertex* into the neighboring face. They
//! do not rely on a consistent face orientation, only on symmetric
//! adjacency as produced by [`TriMesh::build_connectivity`].
//!
//! A closed star ends when the walk returns to its first face. An open star
//! (boundary vertex) is first rewound backwards to its boundary face so the
//! forward walk covers it from one boundary edge to the other.

use tracing::warn;

use crate::TriMesh;
use crate::error::FanError;

/// Default bound on face crossings while walking a single vertex star.
pub const MAX_FAN_HOPS: usize = 20;

/// One face of a vertex star, seen from its center.
///
/// `from` and `to` are the two non-center corners of the face in rotation
/// order: the walk entered through the spoke `center-from` and leaves
/// through the spoke `center-to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wedge {
    /// Face index.
    pub face: usize,
    /// Spoke vertex shared with the previous face of the rotation.
    pub from: usize,
    /// Spoke vertex shared with the next face of the rotation.
    pub to: usize,
}

/// One step of a vertex-around-vertex rotation.
///
/// `left_face` and `prev_vertex` come from the face preceding the spoke in
/// the rotation, `right_face` and `next_vertex` from the face following it.
/// At the ends of an open star the missing side is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanStep {
    /// Neighboring vertex at the end of the current spoke.
    pub vertex: usize,
    /// Face before the spoke.
    pub left_face: Option<usize>,
    /// Face after the spoke.
    pub right_face: Option<usize>,
    /// Neighbor vertex one step back in the rotation.
    pub prev_vertex: Option<usize>,
    /// Neighbor vertex one step ahead in the rotation.
    pub next_vertex: Option<usize>,
}

/// Resolved starting point of a rotation.
#[derive(Debug, Clone, Copy)]
struct FanStart {
    first: Wedge,
    /// Wedge preceding `first` when the star is closed.
    last: Option<Wedge>,
}

/// Wedge of `face` entered through spoke `from`.
fn wedge_entering(mesh: &TriMesh, face: usize, center: usize, from: usize) -> Option<Wedge> {
    let to = mesh.face_ref(face)?.third_vertex(center, from)?;
    Some(Wedge { face, from, to })
}

/// Wedge of `face` left through spoke `to`.
fn wedge_leaving(mesh: &TriMesh, face: usize, center: usize, to: usize) -> Option<Wedge> {
    let from = mesh.face_ref(face)?.third_vertex(center, to)?;
    Some(Wedge { face, from, to })
}

fn resolve_start(mesh: &TriMesh, center: usize) -> Result<FanStart, FanError> {
    let non_manifold = FanError::NonManifold {
        vertex: center,
        max_hops: mesh.max_fan_hops,
    };

    let start_face = mesh
        .vertex_ref(center)
        .and_then(|v| v.incident_face)
        .ok_or(FanError::Isolated(center))?;
    let face = mesh.face_ref(start_face).ok_or(non_manifold)?;
    let k = face.local_index(center).ok_or(non_manifold)?;
    let start = Wedge {
        face: start_face,
        from: face.vertices[(k + 1) % 3],
        to: face.vertices[(k + 2) % 3],
    };

    // Rewind: leave each face through its `from` spoke, i.e. across the edge opposite `to`
    let mut current = start;
    let mut last = None;
    let mut hops = 0usize;
    loop {
        let back = mesh
            .face_ref(current.face)
            .and_then(|f| f.neighbor_opposite(current.to));

        match back {
            None => {
                check_forward_extent(mesh, center, current, non_manifold)?;
                return Ok(FanStart { first: current, last: None });
            }
            Some(prev) if prev == start_face => {
                return Ok(FanStart {
                    first: start,
                    last: last.or(Some(current)),
                });
            }
            Some(prev) => {
                hops += 1;
                if hops > mesh.max_fan_hops {
                    return Err(non_manifold);
                }
                current = wedge_leaving(mesh, prev, center, current.from).ok_or(non_manifold)?;
                if last.is_none() {
                    last = Some(current);
                }
            }
        }
    }
}

/// Walk an open star forward from its boundary face to the far boundary.
///
/// Rewinding only counts the faces behind the incident face, so the whole
/// star is measured here before any face is handed out.
fn check_forward_extent(
    mesh: &TriMesh,
    center: usize,
    first: Wedge,
    non_manifold: FanError,
) -> Result<(), FanError> {
    let mut current = first;
    let mut hops = 0usize;
    while let Some(next) = mesh
        .face_ref(current.face)
        .and_then(|f| f.neighbor_opposite(current.from))
    {
        if next == first.face {
            break;
        }
        hops += 1;
        if hops > mesh.max_fan_hops {
            return Err(non_manifold);
        }
        current = wedge_entering(mesh, next, center, current.to).ok_or(non_manifold)?;
    }
    Ok(())
}

/// Restartable view over the faces around a vertex.
///
/// Every call to [`iter`](Self::iter) or [`wedges`](Self::wedges) begins a
/// fresh, finite walk. A star needing more than
/// [`TriMesh::max_fan_hops`] crossings is treated as non-manifold: the
/// fallible variants report [`FanError::NonManifold`], the infallible ones
/// log a warning and yield nothing.
///
/// # Example
///
/// ```
/// use mesh_connectivity::primitives::unit_square;
///
/// let mesh = unit_square();
/// // Vertex 0 is shared by both triangles of the square
/// let faces: Vec<usize> = mesh.face_fan(0).iter().collect();
/// assert_eq!(faces.len(), 2);
/// assert_eq!(mesh.face_fan(0).is_closed(), Ok(false));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FaceFan<'a> {
    mesh: &'a TriMesh,
    center: usize,
}

impl<'a> FaceFan<'a> {
    /// The vertex this fan rotates around.
    #[must_use]
    pub const fn center(&self) -> usize {
        self.center
    }

    /// Begin a walk over the wedges of the star.
    ///
    /// # Errors
    ///
    /// [`FanError::Isolated`] if the vertex has no incident face,
    /// [`FanError::NonManifold`] if walking the star takes more than the hop
    /// bound, in either direction.
    pub fn try_wedges(&self) -> Result<WedgeIter<'a>, FanError> {
        let start = resolve_start(self.mesh, self.center)?;
        Ok(WedgeIter {
            mesh: self.mesh,
            center: self.center,
            first_face: start.first.face,
            next: Some(start.first),
            hops: 0,
            closed: start.last.is_some(),
            last: start.last,
        })
    }

    /// Begin a walk over the wedges, empty on failure.
    #[must_use]
    pub fn wedges(&self) -> WedgeIter<'a> {
        self.try_wedges().unwrap_or_else(|err| {
            if matches!(err, FanError::NonManifold { .. }) {
                warn!(vertex = self.center, %err, "Skipping vertex star");
            }
            WedgeIter::empty(self.mesh, self.center)
        })
    }

    /// Begin a walk over face indices.
    ///
    /// # Errors
    ///
    /// See [`try_wedges`](Self::try_wedges).
    pub fn try_iter(&self) -> Result<FaceFanIter<'a>, FanError> {
        self.try_wedges().map(|wedges| FaceFanIter { wedges })
    }

    /// Begin a walk over face indices, empty on failure.
    #[must_use]
    pub fn iter(&self) -> FaceFanIter<'a> {
        FaceFanIter {
            wedges: self.wedges(),
        }
    }

    /// Whether the star is closed (interior vertex) rather than open (boundary vertex).
    ///
    /// # Errors
    ///
    /// See [`try_wedges`](Self::try_wedges).
    pub fn is_closed(&self) -> Result<bool, FanError> {
        resolve_start(self.mesh, self.center).map(|start| start.last.is_some())
    }
}

impl<'a> IntoIterator for FaceFan<'a> {
    type Item = usize;
    type IntoIter = FaceFanIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward walk over the wedges of one vertex star.
#[derive(Debug, Clone)]
pub struct WedgeIter<'a> {
    mesh: &'a TriMesh,
    center: usize,
    first_face: usize,
    next: Option<Wedge>,
    hops: usize,
    closed: bool,
    last: Option<Wedge>,
}

impl<'a> WedgeIter<'a> {
    const fn empty(mesh: &'a TriMesh, center: usize) -> Self {
        Self {
            mesh,
            center,
            first_face: usize::MAX,
            next: None,
            hops: 0,
            closed: false,
            last: None,
        }
    }

    /// Whether this walk goes around a closed star.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Iterator for WedgeIter<'_> {
    type Item = Wedge;

    fn next(&mut self) -> Option<Wedge> {
        let current = self.next.take()?;

        // Leave through the `to` spoke, i.e. across the edge opposite `from`
        let ahead = self
            .mesh
            .face_ref(current.face)
            .and_then(|f| f.neighbor_opposite(current.from));

        self.next = match ahead {
            Some(face) if face != self.first_face => {
                self.hops += 1;
                if self.hops > self.mesh.max_fan_hops {
                    warn!(
                        vertex = self.center,
                        max_hops = self.mesh.max_fan_hops,
                        "Vertex star exceeds hop bound, truncating walk"
                    );
                    None
                } else {
                    wedge_entering(self.mesh, face, self.center, current.to)
                }
            }
            _ => None,
        };

        Some(current)
    }
}

impl std::iter::FusedIterator for WedgeIter<'_> {}

/// Face indices around a vertex.
#[derive(Debug, Clone)]
pub struct FaceFanIter<'a> {
    wedges: WedgeIter<'a>,
}

impl Iterator for FaceFanIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.wedges.next().map(|w| w.face)
    }
}

impl std::iter::FusedIterator for FaceFanIter<'_> {}

/// Restartable view over the neighbors of a vertex.
///
/// Yields one [`FanStep`] per spoke. A closed star of `n` faces has `n`
/// spokes, an open one has `n + 1`.
///
/// # Example
///
/// ```
/// use mesh_connectivity::primitives::unit_square;
///
/// let mesh = unit_square();
/// let ring: Vec<usize> = mesh.vertex_fan(0).iter().map(|s| s.vertex).collect();
/// assert_eq!(ring.len(), 3);
/// assert!(ring.contains(&1) && ring.contains(&2) && ring.contains(&3));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct VertexFan<'a> {
    faces: FaceFan<'a>,
}

impl<'a> VertexFan<'a> {
    /// The vertex this fan rotates around.
    #[must_use]
    pub const fn center(&self) -> usize {
        self.faces.center
    }

    /// Begin a walk over the spokes.
    ///
    /// # Errors
    ///
    /// See [`FaceFan::try_wedges`].
    pub fn try_iter(&self) -> Result<VertexFanIter<'a>, FanError> {
        self.faces.try_wedges().map(VertexFanIter::new)
    }

    /// Begin a walk over the spokes, empty on failure.
    #[must_use]
    pub fn iter(&self) -> VertexFanIter<'a> {
        VertexFanIter::new(self.faces.wedges())
    }
}

impl<'a> IntoIterator for VertexFan<'a> {
    type Item = FanStep;
    type IntoIter = VertexFanIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Spokes around a vertex.
#[derive(Debug, Clone)]
pub struct VertexFanIter<'a> {
    wedges: WedgeIter<'a>,
    prev: Option<Wedge>,
    done: bool,
}

impl<'a> VertexFanIter<'a> {
    fn new(wedges: WedgeIter<'a>) -> Self {
        Self {
            prev: wedges.last,
            wedges,
            done: false,
        }
    }
}

impl Iterator for VertexFanIter<'_> {
    type Item = FanStep;

    fn next(&mut self) -> Option<FanStep> {
        if self.done {
            return None;
        }

        if let Some(w) = self.wedges.next() {
            let step = FanStep {
                vertex: w.from,
                left_face: self.prev.map(|p| p.face),
                right_face: Some(w.face),
                prev_vertex: self.prev.map(|p| p.from),
                next_vertex: Some(w.to),
            };
            self.prev = Some(w);
            return Some(step);
        }

        self.done = true;
        if self.wedges.closed {
            return None;
        }

        // Trailing spoke of an open star
        self.prev.map(|p| FanStep {
            vertex: p.to,
            left_face: Some(p.face),
            right_face: None,
            prev_vertex: Some(p.from),
            next_vertex: None,
        })
    }
}

impl std::iter::FusedIterator for VertexFanIter<'_> {}

impl TriMesh {
    /// Faces around `vertex`.
    #[must_use]
    pub const fn face_fan(&self, vertex: usize) -> FaceFan<'_> {
        FaceFan {
            mesh: self,
            center: vertex,
        }
    }

    /// Neighboring vertices around `vertex`.
    #[must_use]
    pub const fn vertex_fan(&self, vertex: usize) -> VertexFan<'_> {
        VertexFan {
            faces: self.face_fan(vertex),
        }
    }

    /// Number of faces around `vertex` (0 for isolated or non-manifold vertices).
    #[must_use]
    pub fn valence(&self, vertex: usize) -> usize {
        self.face_fan(vertex).iter().count()
    }
}
