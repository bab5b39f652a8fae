//! Plane-to-surface projection.
//!
//! A plane point is pushed onto the real mesh surface with two probe rays
//! along the frame's inset normal, one from each side. The hit nearest to
//! the plane point wins, and the mark normal comes from the hit triangle
//! rather than the frame, so marks follow curvature near the flat region.

use std::sync::Arc;

use facepaint_math::{Dir3, Point3};
use facepaint_mesh::TriangleMesh;
use facepaint_raytrace::{Bvh, Ray, RayHit};
use serde::Serialize;
use tracing::{instrument, trace};

use crate::error::{AnnotateError, Result};
use crate::frame::PlaneFrame;

/// Probe rays start this many mesh max-dimensions away from the plane.
const PROBE_DISTANCE_FACTOR: f64 = 2.2;

/// A point on the mesh surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfacePoint {
    /// Position on the surface.
    pub point: Point3,
    /// Face normal of the hit triangle, oriented away from the mesh center.
    pub normal: Dir3,
    /// Index of the hit triangle.
    pub triangle: usize,
}

/// Projects plane points onto one mesh.
///
/// Holds the mesh's BVH plus its bounding center and size; rebuild it
/// whenever the mesh changes.
#[derive(Debug, Clone)]
pub struct SurfaceProjector {
    bvh: Bvh,
    center: Point3,
    max_dimension: f64,
}

impl SurfaceProjector {
    /// Index `mesh` for projection.
    #[instrument(skip(mesh), fields(triangles = mesh.num_triangles()))]
    pub fn new(mesh: Arc<TriangleMesh>) -> Result<Self> {
        if mesh.is_empty() {
            return Err(AnnotateError::EmptyMesh);
        }
        let center = mesh.bounding_center();
        let max_dimension = mesh.max_dimension();
        Ok(Self {
            bvh: Bvh::build(mesh),
            center,
            max_dimension,
        })
    }

    /// The indexed mesh.
    pub fn mesh(&self) -> &Arc<TriangleMesh> {
        self.bvh.mesh()
    }

    /// Bounding-box center of the mesh.
    pub fn center(&self) -> Point3 {
        self.center
    }

    /// Largest bounding-box edge of the mesh.
    pub fn max_dimension(&self) -> f64 {
        self.max_dimension
    }

    /// Project a point on `frame` onto the mesh surface.
    ///
    /// Fails with `PointOutsidePlaneRegion` outside the frame's square and
    /// with `ProjectionMiss` when neither probe ray hits the mesh.
    pub fn project(&self, plane_point: &Point3, frame: &PlaneFrame) -> Result<SurfacePoint> {
        frame.checked_local(plane_point)?;

        let dir = frame.inset_normal;
        let offset = dir.into_inner() * (PROBE_DISTANCE_FACTOR * self.max_dimension.max(1.0));

        // From the inside traveling outward, and from the outside traveling inward
        let rays = [
            Ray::from_dir(plane_point - offset, dir),
            Ray::from_dir(plane_point + offset, -dir),
        ];

        let best = rays
            .iter()
            .filter_map(|ray| self.bvh.trace_closest(ray))
            .min_by(|a, b| {
                let da = (a.point - plane_point).norm_squared();
                let db = (b.point - plane_point).norm_squared();
                da.total_cmp(&db)
            });

        match best {
            Some(hit) => Ok(self.surface_point(hit)),
            None => {
                trace!(x = plane_point.x, y = plane_point.y, z = plane_point.z, "probe missed mesh");
                Err(AnnotateError::ProjectionMiss)
            }
        }
    }

    /// Orient the hit normal away from the mesh center at the hit triangle.
    fn surface_point(&self, hit: RayHit) -> SurfacePoint {
        let outward = self
            .bvh
            .mesh()
            .triangle(hit.triangle)
            .map(|tri| hit.normal.dot(&(tri.centroid() - self.center)) >= 0.0)
            .unwrap_or(true);
        SurfacePoint {
            point: hit.point,
            normal: if outward { hit.normal } else { -hit.normal },
            triangle: hit.triangle,
        }
    }
}
