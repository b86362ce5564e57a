//! Face adjacency construction.

use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::TriMesh;
use crate::error::{TopologyError, TopologyResult};

impl TriMesh {
    /// Rebuild face neighbors and vertex back-references from scratch.
    ///
    /// For every edge of every face, the neighbor across it is the unique
    /// other face incident to both edge endpoints, or `None` on a boundary.
    /// Every vertex is linked to one incident face (`None` if isolated).
    ///
    /// The result only depends on the assigned vertices and faces, so
    /// running it twice yields identical adjacency. On error the store is
    /// left untouched and stays marked as not connected.
    ///
    /// # Errors
    ///
    /// - [`TopologyError::UnsetVertex`] / [`TopologyError::UnsetFace`] for a
    ///   slot that was declared but never assigned
    /// - [`TopologyError::VertexOutOfRange`] for a face referencing a
    ///   vertex beyond the declared count
    /// - [`TopologyError::RepeatedVertex`] for a face using a vertex twice
    /// - [`TopologyError::AsymmetricAdjacency`] when an edge is shared by
    ///   more than two faces
    pub fn build_connectivity(&mut self) -> TopologyResult<()> {
        let vertex_count = self.vertices.len();

        if let Some(slot) = self.vertices.iter().position(Option::is_none) {
            return Err(TopologyError::UnsetVertex(slot));
        }

        let mut corners: Vec<[usize; 3]> = Vec::with_capacity(self.faces.len());
        for (face_idx, slot) in self.faces.iter().enumerate() {
            let face = slot.as_ref().ok_or(TopologyError::UnsetFace(face_idx))?;
            for (k, &v) in face.vertices.iter().enumerate() {
                if v >= vertex_count {
                    return Err(TopologyError::VertexOutOfRange {
                        index: v,
                        count: vertex_count,
                    });
                }
                if face.vertices[..k].contains(&v) {
                    return Err(TopologyError::RepeatedVertex {
                        face: face_idx,
                        vertex: v,
                    });
                }
            }
            corners.push(face.vertices);
        }

        // Temporary vertex -> incident faces map
        let mut incident: HashMap<usize, Vec<usize>> = HashMap::with_capacity(vertex_count);
        for (face_idx, tri) in corners.iter().enumerate() {
            for &v in tri {
                incident.entry(v).or_default().push(face_idx);
            }
        }

        let neighbors: Vec<[Option<usize>; 3]> = corners
            .iter()
            .enumerate()
            .map(|(face_idx, tri)| {
                std::array::from_fn(|i| {
                    let a = tri[(i + 1) % 3];
                    let b = tri[(i + 2) % 3];
                    incident.get(&a).and_then(|faces| {
                        faces
                            .iter()
                            .copied()
                            .find(|&other| other != face_idx && corners[other].contains(&b))
                    })
                })
            })
            .collect();

        check_symmetry(&corners, &neighbors)?;

        for (slot, links) in self.faces.iter_mut().zip(&neighbors) {
            if let Some(face) = slot {
                face.neighbors = *links;
            }
        }

        let mut isolated = 0usize;
        for (v, slot) in self.vertices.iter_mut().enumerate() {
            if let Some(vertex) = slot {
                vertex.incident_face = incident.get(&v).and_then(|faces| faces.first().copied());
                if vertex.incident_face.is_none() {
                    isolated += 1;
                }
            }
        }

        self.connected = true;

        debug!(
            vertices = vertex_count,
            faces = corners.len(),
            boundary_edges = self.boundary_edge_count(),
            isolated_vertices = isolated,
            "Built mesh connectivity"
        );

        Ok(())
    }
}

/// Verify that every neighbor link is reciprocated across the same edge.
fn check_symmetry(corners: &[[usize; 3]], neighbors: &[[Option<usize>; 3]]) -> TopologyResult<()> {
    for (face, links) in neighbors.iter().enumerate() {
        for (i, link) in links.iter().enumerate() {
            let Some(other) = *link else { continue };
            let a = corners[face][(i + 1) % 3];
            let b = corners[face][(i + 2) % 3];

            let back = corners[other]
                .iter()
                .position(|&v| v != a && v != b)
                .and_then(|j| neighbors[other][j]);

            if back != Some(face) {
                warn!(face, neighbor = other, "Asymmetric face adjacency");
                return Err(TopologyError::AsymmetricAdjacency {
                    face,
                    neighbor: other,
                });
            }
        }
    }
    Ok(())
}
