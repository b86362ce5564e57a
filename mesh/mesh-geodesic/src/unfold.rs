//! Obtuse-angle unfolding.
//!
//! When the angle at the updated vertex `P` of triangle `(P, V1, V2)` is
//! obtuse, the two-corner update is not causal and the front would be
//! approximated by an edge path. Unfolding flattens the strip of faces
//! beyond edge `V1V2` into the plane of the triangle and walks it until it
//! finds a vertex inside the cone spanned by `P→V1` and `P→V2`. That vertex
//! splits the obtuse angle into two acute virtual triangles.

use mesh_connectivity::{TriMesh, Vector2};

use crate::eikonal::LENGTH_EPSILON;

/// A vertex found inside the obtuse cone, expressed in the unfolded plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Unfolded {
    /// Mesh vertex that landed in the cone.
    pub vertex: usize,
    /// Distance from `P` in the unfolded plane.
    pub length: f64,
    /// Cosine of the angle between `P→vertex` and `P→V1`.
    pub cos1: f64,
    /// Cosine of the angle between `P→vertex` and `P→V2`.
    pub cos2: f64,
}

/// Search the faces beyond `v1v2` for a vertex inside the cone at `p`.
///
/// `face` is the triangle `(p, v1, v2)`. Returns `None` at a mesh boundary,
/// after `max_steps` faces, if the strip wraps back to `p`, or if the
/// angle at `p` is not obtuse.
pub(crate) fn unfold(
    mesh: &TriMesh,
    face: usize,
    p: usize,
    v1: usize,
    v2: usize,
    max_steps: usize,
) -> Option<Unfolded> {
    let origin = mesh.position(p)?;
    let e1 = mesh.position(v1)? - origin;
    let e2 = mesh.position(v2)? - origin;
    let (r1, r2) = (e1.norm(), e2.norm());
    if r1 <= LENGTH_EPSILON || r2 <= LENGTH_EPSILON {
        return None;
    }

    let cos = e1.dot(&e2) / (r1 * r2);
    if cos >= 0.0 {
        return None;
    }
    let sin = cos.mul_add(-cos, 1.0).max(0.0).sqrt();

    // Unit cone edges; the cone is {x : x·axis1 >= 0 and x·axis2 >= 0}
    let axis1 = Vector2::new(1.0, 0.0);
    let axis2 = Vector2::new(cos, sin);

    let mut x1 = axis1 * r1;
    let mut x2 = axis2 * r2;
    let mut behind = Vector2::zeros();
    let (mut pv1, mut pv2) = (v1, v2);
    let mut current = mesh.face_ref(face)?.neighbor_opposite(p);

    for _ in 0..max_steps {
        let g = mesh.face_ref(current?)?;
        let w = g.third_vertex(pv1, pv2)?;
        if w == p {
            return None;
        }

        let x = place(mesh, (pv1, x1), (pv2, x2), w, behind)?;
        let s1 = x.dot(&axis1);
        let s2 = x.dot(&axis2);

        if s1 >= 0.0 && s2 >= 0.0 {
            let length = x.norm();
            if length <= LENGTH_EPSILON {
                return None;
            }
            return Some(Unfolded {
                vertex: w,
                length,
                cos1: s1 / length,
                cos2: s2 / length,
            });
        }

        if s1 < 0.0 && s2 >= 0.0 {
            // Landed on the V2 side: the cone now passes through edge (pv1, w)
            current = g.neighbor_opposite(pv2);
            behind = x2;
            pv2 = w;
            x2 = x;
        } else if s2 < 0.0 && s1 >= 0.0 {
            current = g.neighbor_opposite(pv1);
            behind = x1;
            pv1 = w;
            x1 = x;
        } else {
            return None;
        }
    }

    None
}

/// Planar position of `w` across edge `(a, b)`, on the side away from `behind`.
fn place(
    mesh: &TriMesh,
    (a, xa): (usize, Vector2<f64>),
    (b, xb): (usize, Vector2<f64>),
    w: usize,
    behind: Vector2<f64>,
) -> Option<Vector2<f64>> {
    let la = mesh.edge_length(a, w)?;
    let lb = mesh.edge_length(b, w)?;

    let edge = xb - xa;
    let lab = edge.norm();
    if lab <= LENGTH_EPSILON {
        return None;
    }
    let along_dir = edge / lab;
    let normal = Vector2::new(-along_dir.y, along_dir.x);

    let along = (la * la - lb * lb + lab * lab) / (2.0 * lab);
    let height = along.mul_add(-along, la * la).max(0.0).sqrt();

    let side = if normal.dot(&(behind - xa)) > 0.0 {
        -1.0
    } else {
        1.0
    };

    Some(xa + along_dir * along + normal * (side * height))
}
