//! Small procedural meshes for tests, examples and benchmarks.
//!
//! All generators return fully connected meshes with normals. They cannot
//! produce invalid topology; an empty mesh would only be returned if that
//! invariant were broken.

// Grid sizes are small, index arithmetic does not overflow
#![allow(clippy::cast_precision_loss)]

use hashbrown::HashMap;

use crate::TriMesh;

/// Unit square in the XY plane split along the diagonal 0-2.
///
/// Vertices: `(0,0)`, `(1,0)`, `(1,1)`, `(0,1)`; faces `[0,1,2]`, `[0,2,3]`.
#[must_use]
pub fn unit_square() -> TriMesh {
    let points = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ];
    TriMesh::from_faces(&points, &[[0, 1, 2], [0, 2, 3]]).unwrap_or_default()
}

/// A single equilateral triangle with unit edges.
#[must_use]
pub fn equilateral_triangle() -> TriMesh {
    let h = 3.0_f64.sqrt() / 2.0;
    let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, h, 0.0]];
    TriMesh::from_faces(&points, &[[0, 1, 2]]).unwrap_or_default()
}

/// Regular `nx` × `ny` vertex grid in the XY plane.
///
/// Vertex `(i, j)` has index `j * nx + i` and sits at
/// `(i * spacing, j * spacing, 0)`. Each cell is split along its
/// `(i, j)`-`(i + 1, j + 1)` diagonal.
///
/// # Example
///
/// ```
/// use mesh_connectivity::primitives::grid;
///
/// let mesh = grid(10, 10, 0.1);
/// assert_eq!(mesh.vertex_count(), 100);
/// assert_eq!(mesh.face_count(), 162);
/// ```
#[must_use]
pub fn grid(nx: usize, ny: usize, spacing: f64) -> TriMesh {
    if nx < 2 || ny < 2 {
        return TriMesh::new();
    }

    let points: Vec<[f64; 3]> = (0..ny)
        .flat_map(|j| (0..nx).map(move |i| [i as f64 * spacing, j as f64 * spacing, 0.0]))
        .collect();

    let mut faces = Vec::with_capacity(2 * (nx - 1) * (ny - 1));
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let v00 = j * nx + i;
            let v10 = v00 + 1;
            let v01 = v00 + nx;
            let v11 = v01 + 1;
            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    TriMesh::from_faces(&points, &faces).unwrap_or_default()
}

/// Closed unit cube from `(0,0,0)` to `(1,1,1)`, outward CCW winding.
#[must_use]
pub fn unit_cube() -> TriMesh {
    let points = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let faces = [
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    TriMesh::from_faces(&points, &faces).unwrap_or_default()
}

/// Unit-radius icosphere with outward CCW winding.
///
/// Level 0 is the icosahedron (12 vertices, 20 faces); each level splits
/// every triangle into four and projects the new vertices onto the sphere.
/// All triangles are acute.
///
/// # Example
///
/// ```
/// use mesh_connectivity::primitives::icosphere;
///
/// let mesh = icosphere(2);
/// assert_eq!(mesh.face_count(), 320);
/// assert_eq!(mesh.boundary_edge_count(), 0);
/// ```
#[must_use]
pub fn icosphere(subdivisions: u32) -> TriMesh {
    let phi = f64::midpoint(1.0, 5.0_f64.sqrt());
    let a = 1.0;
    let b = 1.0 / phi;

    let mut points: Vec<[f64; 3]> = [
        [0.0, b, -a],
        [b, a, 0.0],
        [-b, a, 0.0],
        [0.0, b, a],
        [0.0, -b, a],
        [-a, 0.0, b],
        [0.0, -b, -a],
        [a, 0.0, -b],
        [a, 0.0, b],
        [-a, 0.0, -b],
        [b, -a, 0.0],
        [-b, -a, 0.0],
    ]
    .into_iter()
    .map(project_to_sphere)
    .collect();

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 2, 1],
        [3, 1, 2],
        [3, 5, 4],
        [3, 4, 8],
        [0, 7, 6],
        [0, 6, 9],
        [4, 11, 10],
        [6, 10, 11],
        [2, 9, 5],
        [11, 5, 9],
        [1, 8, 7],
        [10, 7, 8],
        [3, 2, 5],
        [3, 8, 1],
        [0, 9, 2],
        [0, 1, 7],
        [6, 11, 9],
        [6, 7, 10],
        [4, 5, 11],
        [4, 10, 8],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut split = Vec::with_capacity(faces.len() * 4);

        for &[v0, v1, v2] in &faces {
            let m01 = midpoint(v0, v1, &mut points, &mut midpoints);
            let m12 = midpoint(v1, v2, &mut points, &mut midpoints);
            let m20 = midpoint(v2, v0, &mut points, &mut midpoints);

            split.push([v0, m01, m20]);
            split.push([v1, m12, m01]);
            split.push([v2, m20, m12]);
            split.push([m01, m12, m20]);
        }

        faces = split;
    }

    TriMesh::from_faces(&points, &faces).unwrap_or_default()
}

fn project_to_sphere([x, y, z]: [f64; 3]) -> [f64; 3] {
    let len = z.mul_add(z, x.mul_add(x, y * y)).sqrt();
    [x / len, y / len, z / len]
}

fn midpoint(
    a: usize,
    b: usize,
    points: &mut Vec<[f64; 3]>,
    cache: &mut HashMap<(usize, usize), usize>,
) -> usize {
    let key = if a < b { (a, b) } else { (b, a) };
    if let Some(&idx) = cache.get(&key) {
        return idx;
    }

    let (pa, pb) = (points[a], points[b]);
    let mid = project_to_sphere([
        f64::midpoint(pa[0], pb[0]),
        f64::midpoint(pa[1], pb[1]),
        f64::midpoint(pa[2], pb[2]),
    ]);

    let idx = points.len();
    points.push(mid);
    cache.insert(key, idx);
    idx
}
