//! Local Eikonal update kernels.
//!
//! Every kernel answers the same question: given a triangle `(C, A, B)`
//! where `A` and `B` already carry arrival times, what is the arrival time
//! at `C` for a front travelling with local cost `weight` per unit length?
//!
//! Lengths are measured from the updated vertex `C`: `len1 = |C - A|`,
//! `len2 = |C - B|`, and `cos` is the cosine of the angle at `C`.

// Standard notation for the quadratic update
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

use crate::config::UpdateMethod;

/// Edges shorter than this are treated as collapsed.
pub const LENGTH_EPSILON: f64 = 1e-12;

/// Tolerance on `1 - cos²` below which corners count as collinear.
pub const ANGLE_EPSILON: f64 = 1e-12;

/// How a candidate distance was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Causal solution of the two-corner update.
    TwoPoint,
    /// The two-corner solution was not upwind; nearest single corner used.
    OnePoint,
    /// Zero-length edge or collinear corners; nearest single corner used.
    Degenerate,
}

/// A candidate arrival time for one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Proposed distance.
    pub distance: f64,
    /// Which branch produced it.
    pub kind: UpdateKind,
}

/// Arrival time through a single known corner.
#[inline]
#[must_use]
pub fn one_point(known: f64, length: f64, weight: f64) -> f64 {
    weight.mul_add(length, known)
}

/// Arrival time at `C` from two known corners.
///
/// Falls back to the best single-corner update when the two-corner
/// solution is not causal (the characteristic would enter `C` from outside
/// the triangle) or the configuration is degenerate.
///
/// # Example
///
/// ```
/// use mesh_geodesic::UpdateMethod;
/// use mesh_geodesic::eikonal::two_point;
///
/// // Right angle at C, plane wave arriving at 45 degrees
/// let h = std::f64::consts::FRAC_1_SQRT_2;
/// let c = two_point(UpdateMethod::Quadratic, 1.0 - h, 1.0 - h, 1.0, 1.0, 0.0, 1.0);
/// assert!((c.distance - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn two_point(
    method: UpdateMethod,
    d1: f64,
    d2: f64,
    len1: f64,
    len2: f64,
    cos: f64,
    weight: f64,
) -> Candidate {
    let fallback = one_point(d1, len1, weight).min(one_point(d2, len2, weight));

    if len1 <= LENGTH_EPSILON
        || len2 <= LENGTH_EPSILON
        || !cos.is_finite()
        || cos.mul_add(-cos, 1.0) <= ANGLE_EPSILON
    {
        return Candidate {
            distance: fallback,
            kind: UpdateKind::Degenerate,
        };
    }

    let solved = match method {
        UpdateMethod::Quadratic => quadratic_update(d1, d2, len1, len2, cos, weight),
        UpdateMethod::Matrix => matrix_update(d1, d2, len1, len2, cos, weight),
    };

    match solved {
        Some(t) if t.is_finite() => Candidate {
            distance: t,
            kind: UpdateKind::TwoPoint,
        },
        _ => Candidate {
            distance: fallback,
            kind: UpdateKind::OnePoint,
        },
    }
}

/// Kimmel-Sethian quadratic in the increment over the earlier corner.
///
/// Returns `None` when no root is causal.
#[must_use]
pub fn quadratic_update(
    d1: f64,
    d2: f64,
    len1: f64,
    len2: f64,
    cos: f64,
    weight: f64,
) -> Option<f64> {
    if cos < -ANGLE_EPSILON {
        return None;
    }
    let cos = cos.max(0.0);

    // A is the earlier corner at distance b from C, B the later one at distance a
    let (d_a, d_b, b, a) = if d1 <= d2 {
        (d1, d2, len1, len2)
    } else {
        (d2, d1, len2, len1)
    };

    let u = d_b - d_a;
    let sin2 = cos.mul_add(-cos, 1.0);

    let f2 = (2.0 * a * b).mul_add(-cos, a.mul_add(a, b * b));
    let f1 = b * u * a.mul_add(cos, -b);
    let f0 = b * b * (weight * weight * a * a).mul_add(-sin2, u * u);

    if f2 <= ANGLE_EPSILON * a.mul_add(a, b * b) {
        return None;
    }
    let disc = f1.mul_add(f1, -(f0 * f2));
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();

    let causal = |t: f64| {
        if t <= u || t <= 0.0 {
            return false;
        }
        let r = b * (t - u) / t;
        a * cos < r && (cos <= ANGLE_EPSILON || r < a / cos)
    };

    [(-f1 - root) / f2, (-f1 + root) / f2]
        .into_iter()
        .filter(|&t| causal(t))
        .reduce(f64::min)
        .map(|t| d_a + t)
}

/// Gradient form: solve `|∇T| = weight` for the linear interpolant over
/// the triangle, using the inverse Gram matrix of the unit edge directions.
///
/// Returns `None` when no root is both `≥ max(d1, d2)` and upwind.
#[must_use]
pub fn matrix_update(
    d1: f64,
    d2: f64,
    len1: f64,
    len2: f64,
    cos: f64,
    weight: f64,
) -> Option<f64> {
    let det = cos.mul_add(-cos, 1.0);
    if det <= ANGLE_EPSILON {
        return None;
    }

    let q11 = 1.0 / det;
    let q12 = -cos / det;
    let q22 = q11;

    let d = [d1 / len1, d2 / len2];
    let l = [1.0 / len1, 1.0 / len2];

    let qd = [q11.mul_add(d[0], q12 * d[1]), q12.mul_add(d[0], q22 * d[1])];
    let ql = [q11.mul_add(l[0], q12 * l[1]), q12.mul_add(l[0], q22 * l[1])];

    let e2 = l[0].mul_add(ql[0], l[1] * ql[1]);
    let e1 = -l[0].mul_add(qd[0], l[1] * qd[1]);
    let e0 = d[0].mul_add(qd[0], d[1] * qd[1]) - weight * weight;

    if e2 <= ANGLE_EPSILON {
        return None;
    }
    let disc = e1.mul_add(e1, -(e0 * e2));
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let floor = d1.max(d2);

    let causal = |t: f64| t >= floor && qd[0] <= t * ql[0] && qd[1] <= t * ql[1];

    [(-e1 - root) / e2, (-e1 + root) / e2]
        .into_iter()
        .filter(|&t| causal(t))
        .reduce(f64::min)
}
