#![warn(missing_docs)]

//! Math types for the facepaint annotation kernel.
//!
//! Thin wrappers around nalgebra providing the domain types used across
//! the workspace: points, vectors, unit directions, rotations, affine
//! transforms, planes, and tolerance constants.

use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, UnitQuaternion, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D plane-local coordinates.
pub type Point2 = nalgebra::Point2<f64>;

/// A rigid rotation about the origin.
pub type Rotation = UnitQuaternion<f64>;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Frame transform mapping local X/Y/Z onto `x`/`y`/`z` and the local
    /// origin onto `origin`.
    pub fn from_frame(origin: &Point3, x: &Dir3, y: &Dir3, z: &Dir3) -> Self {
        let basis = Matrix3::from_columns(&[x.into_inner(), y.into_inner(), z.into_inner()]);
        let mut m = basis.to_homogeneous();
        m[(0, 3)] = origin.x;
        m[(1, 3)] = origin.y;
        m[(2, 3)] = origin.z;
        Self { matrix: m }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation, applies rotation/scale).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// An infinite plane through `origin` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// A point on the plane.
    pub origin: Point3,
    /// Unit normal of the plane.
    pub normal: Dir3,
}

impl Plane {
    /// Create a plane from a point and a normal (normalized here).
    pub fn new(origin: Point3, normal: Vec3) -> Self {
        Self {
            origin,
            normal: Dir3::new_normalize(normal),
        }
    }

    /// Plane through three points with normal `(b - a) × (c - a)`.
    ///
    /// Returns `None` when the points are coincident or collinear.
    pub fn from_points(a: &Point3, b: &Point3, c: &Point3) -> Option<Self> {
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        let scale = (b - a).norm().max((c - a).norm()).max(1.0);
        if len <= Tolerance::DEFAULT.linear * scale * scale {
            return None;
        }
        Some(Self {
            origin: *a,
            normal: Dir3::new_unchecked(n / len),
        })
    }

    /// Signed plane offset `normal · origin`.
    pub fn offset(&self) -> f64 {
        self.normal.dot(&self.origin.coords)
    }

    /// Signed distance from `p` to the plane (positive on the normal side).
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&(p - self.origin))
    }

    /// Orthogonal projection of `p` onto the plane.
    pub fn project_point(&self, p: &Point3) -> Point3 {
        p - self.normal.into_inner() * self.signed_distance(p)
    }
}

/// The minimal rotation taking world +Z onto `normal`.
///
/// When `normal` is antiparallel to +Z the rotation is a half turn about
/// world +Y, so the result is always well defined.
pub fn rotation_from_z(normal: &Dir3) -> Rotation {
    UnitQuaternion::rotation_between(&Vec3::z(), normal.as_ref()).unwrap_or_else(|| {
        UnitQuaternion::from_axis_angle(&Vec3::y_axis(), std::f64::consts::PI)
    })
}

/// Deterministic in-plane axes for a plane with the given normal.
///
/// World X and Y are carried by [`rotation_from_z`], so `(u, v, normal)`
/// is a right-handed orthonormal basis that depends on nothing but the
/// normal.
pub fn basis_from_normal(normal: &Dir3) -> (Dir3, Dir3) {
    let q = rotation_from_z(normal);
    let u = Dir3::new_normalize(q * Vec3::x());
    let v = Dir3::new_normalize(normal.cross(u.as_ref()));
    (u, v)
}

/// In-plane axes for `normal` that keep `hint` as the first axis when
/// possible.
///
/// `hint` is projected onto the plane orthogonal to `normal`; if it is
/// (nearly) parallel to the normal, [`basis_from_normal`] is used instead.
pub fn tangent_basis(normal: &Dir3, hint: &Vec3) -> (Dir3, Dir3) {
    let projected = hint - normal.into_inner() * hint.dot(normal.as_ref());
    match Dir3::try_new(projected, 1e-9) {
        Some(u) => {
            let v = Dir3::new_normalize(normal.cross(u.as_ref()));
            (u, v)
        }
        None => basis_from_normal(normal),
    }
}

/// Rotation whose columns are the given orthonormal basis vectors.
///
/// Maps world X/Y/Z onto `x`/`y`/`z`.
pub fn rotation_from_basis(x: &Dir3, y: &Dir3, z: &Dir3) -> Rotation {
    let m = Matrix3::from_columns(&[x.into_inner(), y.into_inner(), z.into_inner()]);
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(m))
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-9 mm linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-9,
        angular: 1e-9,
    };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
