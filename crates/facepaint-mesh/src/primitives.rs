//! Closed primitive meshes with outward winding.

use std::f64::consts::PI;

use facepaint_math::{basis_from_normal, Dir3, Point3};

use crate::{Triangle, TriangleMesh};

/// Axis-aligned box spanning `min`..`max` (12 triangles).
pub fn make_box(min: Point3, max: Point3) -> TriangleMesh {
    let p = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];
    const FACES: [[usize; 3]; 12] = [
        [0, 2, 1], [0, 3, 2], // -Z
        [4, 5, 6], [4, 6, 7], // +Z
        [0, 1, 5], [0, 5, 4], // -Y
        [2, 3, 7], [2, 7, 6], // +Y
        [0, 4, 7], [0, 7, 3], // -X
        [1, 2, 6], [1, 6, 5], // +X
    ];
    FACES
        .iter()
        .map(|f| Triangle::new(p[f[0]], p[f[1]], p[f[2]]))
        .collect()
}

/// Capped cylinder centered on `center` with its axis along `axis`.
///
/// `segments` is clamped to at least 3.
pub fn make_cylinder(
    center: Point3,
    axis: &Dir3,
    radius: f64,
    height: f64,
    segments: u32,
) -> TriangleMesh {
    let segments = segments.max(3) as usize;
    let (u, v) = basis_from_normal(axis);
    let half = axis.into_inner() * (height * 0.5);
    let bottom_center = center - half;
    let top_center = center + half;

    let ring: Vec<_> = (0..segments)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / segments as f64;
            (u.into_inner() * theta.cos() + v.into_inner() * theta.sin()) * radius
        })
        .collect();

    let mut triangles = Vec::with_capacity(segments * 4);
    for i in 0..segments {
        let j = (i + 1) % segments;
        let b0 = bottom_center + ring[i];
        let b1 = bottom_center + ring[j];
        let t0 = top_center + ring[i];
        let t1 = top_center + ring[j];

        triangles.push(Triangle::new(b0, b1, t1));
        triangles.push(Triangle::new(b0, t1, t0));
        triangles.push(Triangle::new(top_center, t0, t1));
        triangles.push(Triangle::new(bottom_center, b1, b0));
    }
    TriangleMesh::new(triangles)
}
