//! Rays, ray-box slab tests and hit records.

use facepaint_math::{Dir3, Point3, Vec3};
use facepaint_mesh::Aabb3;

/// A half-line from `origin` along a unit `direction`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Start of the ray.
    pub origin: Point3,
    /// Unit direction.
    pub direction: Dir3,
    /// Per-axis reciprocal of `direction`; infinite on axis-parallel rays.
    inv_direction: Vec3,
}

impl Ray {
    /// Ray from `origin` along `direction`, which is normalized here.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        let direction = Dir3::new_normalize(direction);
        Self {
            origin,
            direction,
            inv_direction: direction.map(f64::recip),
        }
    }

    /// Ray from `origin` along an already normalized direction.
    pub fn from_dir(origin: Point3, direction: Dir3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: direction.map(f64::recip),
        }
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction.into_inner() * t
    }

    /// Slab test against a box.
    ///
    /// Returns the entry and exit distances, with entry clamped to 0 when
    /// the origin is inside. Boxes are closed: a ray parallel to a slab hits
    /// when its origin lies inside the slab or on either face.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;
        for axis in 0..3 {
            if self.direction[axis] == 0.0 {
                let o = self.origin[axis];
                if o < aabb.min[axis] || o > aabb.max[axis] {
                    return None;
                }
                continue;
            }
            let t0 = (aabb.min[axis] - self.origin[axis]) * self.inv_direction[axis];
            let t1 = (aabb.max[axis] - self.origin[axis]) * self.inv_direction[axis];
            t_enter = t_enter.max(t0.min(t1));
            t_exit = t_exit.min(t0.max(t1));
        }
        (t_exit >= t_enter && t_exit >= 0.0).then(|| (t_enter.max(0.0), t_exit))
    }
}

/// Closest intersection of a ray with a mesh.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Parameter along the ray where intersection occurs.
    pub t: f64,
    /// 3D intersection point.
    pub point: Point3,
    /// Geometric normal of the hit triangle, from its winding.
    pub normal: Dir3,
    /// Index of the hit triangle in the mesh.
    pub triangle: usize,
}
