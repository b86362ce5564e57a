//! Vertex normal estimation.

use nalgebra::Vector3;

use crate::TriMesh;

impl TriMesh {
    /// Recompute unit vertex normals as area-weighted averages of face normals.
    ///
    /// Vertices without a usable incident face get a zero normal.
    pub fn compute_normals(&mut self) {
        let mut sums = vec![Vector3::<f64>::zeros(); self.vertices.len()];

        for (face, f) in self.faces() {
            let Some(n) = self.face_normal_unnormalized(face) else {
                continue;
            };
            for &v in &f.vertices {
                if let Some(sum) = sums.get_mut(v) {
                    *sum += n;
                }
            }
        }

        for (slot, sum) in self.vertices.iter_mut().zip(sums) {
            if let Some(vertex) = slot {
                let len = sum.norm();
                vertex.normal = if len > f64::EPSILON {
                    sum / len
                } else {
                    Vector3::zeros()
                };
            }
        }
    }
}
