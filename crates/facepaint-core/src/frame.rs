//! The active drawing plane.

use facepaint_math::{basis_from_normal, Dir3, Plane, Point2, Point3};
use facepaint_raytrace::intersect::intersect_plane;
use facepaint_raytrace::Ray;
use serde::Serialize;

use crate::detect::FlatRegion;
use crate::error::{AnnotateError, Result};

/// Smallest and largest half extent of the drawing region (mesh units).
pub const HALF_EXTENT_RANGE: (f64, f64) = (16.0, 400.0);

/// Half extent for a mesh of the given size.
///
/// `clamp(max(0.75 * max_dimension, requested), 16, 400)`.
pub fn resolve_half_extent(mesh_max_dimension: f64, requested: f64) -> f64 {
    (0.75 * mesh_max_dimension)
        .max(requested)
        .clamp(HALF_EXTENT_RANGE.0, HALF_EXTENT_RANGE.1)
}

/// Local 2D coordinate system on a plane, bounded to a square region.
///
/// `(axis_u, axis_v, normal)` is a right-handed orthonormal basis derived
/// only from `normal`, so re-picking the same face always yields the same
/// axes. A frame is never edited in place; build a new one instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaneFrame {
    /// Origin of the local coordinates.
    pub origin: Point3,
    /// Plane normal.
    pub normal: Dir3,
    /// `normal` oriented away from the mesh center.
    pub inset_normal: Dir3,
    /// Local X axis.
    pub axis_u: Dir3,
    /// Local Y axis.
    pub axis_v: Dir3,
    /// Half side length of the square drawing region.
    pub half_extent: f64,
}

impl PlaneFrame {
    /// Build a frame on the plane through `origin` with `normal`.
    pub fn build(normal: Dir3, origin: Point3, mesh_center: &Point3, half_extent: f64) -> Self {
        let inset_normal = if normal.dot(&(origin - mesh_center)) >= 0.0 {
            normal
        } else {
            -normal
        };
        let (axis_u, axis_v) = basis_from_normal(&normal);
        Self {
            origin,
            normal,
            inset_normal,
            axis_u,
            axis_v,
            half_extent,
        }
    }

    /// Build a frame on a detected flat region.
    pub fn from_region(region: &FlatRegion, mesh_center: &Point3, half_extent: f64) -> Self {
        Self::build(region.normal, region.origin, mesh_center, half_extent)
    }

    /// Build a frame from three picked surface points.
    ///
    /// The normal follows `(b - a) × (c - a)` and the origin is `a`.
    pub fn from_picked_points(
        a: &Point3,
        b: &Point3,
        c: &Point3,
        mesh_center: &Point3,
        half_extent: f64,
    ) -> Result<Self> {
        let plane = Plane::from_points(a, b, c).ok_or(AnnotateError::DegenerateReferenceTriangle)?;
        Ok(Self::build(plane.normal, plane.origin, mesh_center, half_extent))
    }

    /// The same frame with a different half extent.
    pub fn with_half_extent(&self, half_extent: f64) -> Self {
        Self {
            half_extent,
            ..*self
        }
    }

    /// The frame's plane.
    pub fn plane(&self) -> Plane {
        Plane {
            origin: self.origin,
            normal: self.normal,
        }
    }

    /// Local coordinates of `point` (its projection onto the plane).
    pub fn to_local(&self, point: &Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(self.axis_u.as_ref()), d.dot(self.axis_v.as_ref()))
    }

    /// World position of local coordinates.
    pub fn to_world(&self, local: &Point2) -> Point3 {
        self.origin + self.axis_u.into_inner() * local.x + self.axis_v.into_inner() * local.y
    }

    /// True if `local` lies inside the square region (boundary included).
    pub fn contains_local(&self, local: &Point2) -> bool {
        local.x.abs() <= self.half_extent && local.y.abs() <= self.half_extent
    }

    /// Local coordinates of `point`, or `PointOutsidePlaneRegion`.
    pub fn checked_local(&self, point: &Point3) -> Result<Point2> {
        let local = self.to_local(point);
        if !self.contains_local(&local) {
            return Err(AnnotateError::PointOutsidePlaneRegion {
                x: local.x,
                y: local.y,
                half_extent: self.half_extent,
            });
        }
        Ok(local)
    }

    /// Where a pointer ray meets the drawing region.
    ///
    /// A ray parallel to or pointing away from the plane is a
    /// `ProjectionMiss`; a crossing outside the square is
    /// `PointOutsidePlaneRegion`.
    pub fn pointer_point(&self, ray: &Ray) -> Result<Point3> {
        let t = intersect_plane(ray, &self.plane()).ok_or(AnnotateError::ProjectionMiss)?;
        let point = ray.at(t);
        self.checked_local(&point)?;
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use facepaint_math::Vec3;

    #[test]
    fn test_half_extent_clamp() {
        assert_eq!(resolve_half_extent(4.0, 0.0), 16.0);
        assert!((resolve_half_extent(40.0, 0.0) - 30.0).abs() < 1e-12);
        assert!((resolve_half_extent(40.0, 100.0) - 100.0).abs() < 1e-12);
        assert_eq!(resolve_half_extent(2000.0, 0.0), 400.0);
    }

    #[test]
    fn test_inset_normal_points_away_from_center() {
        let center = Point3::origin();
        let up = Vec3::z_axis();
        let top = PlaneFrame::build(up, Point3::new(0.0, 0.0, 5.0), &center, 16.0);
        assert_relative_eq!(top.inset_normal.into_inner(), Vec3::z(), epsilon = 1e-12);

        // Normal picked with inward winding is flipped for the inset
        let bottom = PlaneFrame::build(up, Point3::new(0.0, 0.0, -5.0), &center, 16.0);
        assert_relative_eq!(bottom.normal.into_inner(), Vec3::z(), epsilon = 1e-12);
        assert_relative_eq!(bottom.inset_normal.into_inner(), -Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_axes_independent_of_picked_points() {
        let center = Point3::origin();
        let a = PlaneFrame::from_picked_points(
            &Point3::new(0.0, 0.0, 3.0),
            &Point3::new(1.0, 0.0, 3.0),
            &Point3::new(0.0, 1.0, 3.0),
            &center,
            16.0,
        )
        .unwrap();
        let b = PlaneFrame::from_picked_points(
            &Point3::new(2.0, 5.0, 3.0),
            &Point3::new(4.0, 6.0, 3.0),
            &Point3::new(1.0, 8.0, 3.0),
            &center,
            16.0,
        )
        .unwrap();
        assert_relative_eq!(a.axis_u.into_inner(), b.axis_u.into_inner(), epsilon = 1e-12);
        assert_relative_eq!(a.axis_v.into_inner(), b.axis_v.into_inner(), epsilon = 1e-12);
        assert_eq!(b.origin, Point3::new(2.0, 5.0, 3.0));
    }

    #[test]
    fn test_picked_points_degenerate() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let err =
            PlaneFrame::from_picked_points(&p, &p, &Point3::new(0.0, 0.0, 0.0), &p, 16.0).unwrap_err();
        assert!(matches!(err, AnnotateError::DegenerateReferenceTriangle));
    }

    #[test]
    fn test_local_round_trip_and_bounds() {
        let n = Dir3::new_normalize(Vec3::new(1.0, 2.0, 2.0));
        let frame = PlaneFrame::build(n, Point3::new(1.0, 1.0, 1.0), &Point3::origin(), 16.0);
        let local = Point2::new(3.5, -7.0);
        let world = frame.to_world(&local);
        assert!(frame.plane().signed_distance(&world).abs() < 1e-12);
        assert_relative_eq!(frame.to_local(&world), local, epsilon = 1e-12);
        assert!(frame.checked_local(&world).is_ok());

        let outside = frame.to_world(&Point2::new(16.5, 0.0));
        assert!(matches!(
            frame.checked_local(&outside),
            Err(AnnotateError::PointOutsidePlaneRegion { .. })
        ));
        assert!(frame.with_half_extent(20.0).checked_local(&outside).is_ok());
    }

    #[test]
    fn test_pointer_point() {
        let frame = PlaneFrame::build(Vec3::z_axis(), Point3::new(0.0, 0.0, 5.0), &Point3::origin(), 16.0);

        let ray = Ray::new(Point3::new(3.0, -2.0, 50.0), Vec3::new(0.0, 0.0, -1.0));
        let p = frame.pointer_point(&ray).unwrap();
        assert_relative_eq!(p, Point3::new(3.0, -2.0, 5.0), epsilon = 1e-9);

        let away = Ray::new(Point3::new(3.0, -2.0, 50.0), Vec3::z());
        assert!(matches!(frame.pointer_point(&away), Err(AnnotateError::ProjectionMiss)));

        let wide = Ray::new(Point3::new(20.0, 0.0, 50.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(matches!(
            frame.pointer_point(&wide),
            Err(AnnotateError::PointOutsidePlaneRegion { .. })
        ));
    }
}
