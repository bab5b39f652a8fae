//! Ray-triangle intersection (Möller–Trumbore, double-sided).

use facepaint_mesh::Triangle;

use crate::Ray;

/// Barycentric hit on a triangle.
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Parameter along the ray.
    pub t: f64,
    /// Barycentric weight of `v[1]`.
    pub u: f64,
    /// Barycentric weight of `v[2]`.
    pub v: f64,
}

const EPSILON: f64 = 1e-12;

/// Intersect a ray with a triangle from either side.
///
/// Returns `None` for parallel rays, degenerate triangles, misses, and
/// hits behind the ray origin. Edges count as inside.
pub fn intersect_triangle(ray: &Ray, tri: &Triangle) -> Option<TriangleHit> {
    let e1 = tri.v[1] - tri.v[0];
    let e2 = tri.v[2] - tri.v[0];
    let dir = ray.direction.as_ref();

    let p = dir.cross(&e2);
    let det = e1.dot(&p);
    if det.abs() < EPSILON * e1.norm() * e2.norm() {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray.origin - tri.v[0];
    let u = s.dot(&p) * inv_det;
    if !(-EPSILON..=1.0 + EPSILON).contains(&u) {
        return None;
    }

    let q = s.cross(&e1);
    let v = dir.dot(&q) * inv_det;
    if v < -EPSILON || u + v > 1.0 + EPSILON {
        return None;
    }

    let t = e2.dot(&q) * inv_det;
    if t < 0.0 {
        return None;
    }

    Some(TriangleHit { t, u, v })
}
