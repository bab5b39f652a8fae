//! Ray-plane intersection (closed-form).

use facepaint_math::Plane;

use crate::Ray;

/// Intersect a ray with a plane.
///
/// Returns the ray parameter `t` if the ray crosses the plane at `t >= 0`,
/// or `None` if the ray is parallel to the plane or points away from it.
pub fn intersect_plane(ray: &Ray, plane: &Plane) -> Option<f64> {
    let normal = plane.normal.as_ref();
    let denom = ray.direction.as_ref().dot(normal);

    // Ray is parallel to plane
    if denom.abs() < 1e-12 {
        return None;
    }

    let t = (plane.origin - ray.origin).dot(normal) / denom;

    // Intersection is behind ray origin
    if t < 0.0 {
        return None;
    }

    Some(t)
}
