//! Two-reference rigid re-orientation.
//!
//! The user marks a bottom face and a front face. The resulting rotation
//! sends the bottom normal to -Y and the front normal (made orthogonal to
//! the bottom) to +Z, so the part stands upright facing the viewer.

use facepaint_math::{rotation_from_basis, Dir3, Plane, Point3, Rotation, Vec3};
use facepaint_mesh::TriangleMesh;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::annotation::AnnotationSet;
use crate::error::{AnnotateError, Result};

/// Squared length below which the projected front normal is unusable.
const AMBIGUITY_EPSILON: f64 = 1e-8;

/// Which reference slot a pick fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// The face the part should rest on.
    Bottom,
    /// The face that should point at the viewer.
    Front,
}

/// An outward surface normal captured from three picked points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reference {
    /// Outward unit normal.
    pub normal: Dir3,
    /// First picked point.
    pub origin: Point3,
}

impl Reference {
    /// Build a reference from three surface points.
    ///
    /// The normal points away from `mesh_center` whatever the pick order.
    pub fn from_points(a: &Point3, b: &Point3, c: &Point3, mesh_center: &Point3) -> Result<Self> {
        let plane = Plane::from_points(a, b, c).ok_or(AnnotateError::DegenerateReferenceTriangle)?;
        let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
        let normal = if plane.normal.dot(&(centroid - mesh_center)) >= 0.0 {
            plane.normal
        } else {
            -plane.normal
        };
        Ok(Self {
            normal,
            origin: *a,
        })
    }
}

/// Rotation taking `bottom` to -Y and `front` to +Z.
///
/// `front` is first made orthogonal to `bottom`; fails with
/// `AlignmentAmbiguous` if nothing is left of it.
pub fn compute_alignment(bottom: &Vec3, front: &Vec3) -> Result<Rotation> {
    let down = Dir3::try_new(*bottom, 1e-12).ok_or(AnnotateError::AlignmentAmbiguous)?;
    let up = -down;

    let projected = front - down.into_inner() * front.dot(down.as_ref());
    if projected.norm_squared() < AMBIGUITY_EPSILON {
        return Err(AnnotateError::AlignmentAmbiguous);
    }
    let front = Dir3::new_normalize(projected);
    let right = Dir3::new_normalize(up.cross(front.as_ref()));

    // The basis maps canonical axes onto (right, up, front); undo it
    Ok(rotation_from_basis(&right, &up, &front).inverse())
}

/// Rotate the mesh and every mark about the world origin, in place.
#[instrument(skip_all, fields(triangles = mesh.num_triangles(), marks = marks.len()))]
pub fn apply_alignment(mesh: &mut TriangleMesh, marks: &mut AnnotationSet, rotation: &Rotation) {
    mesh.rotate(rotation);
    marks.rotate_all(rotation);
    debug!(angle = rotation.angle(), "applied alignment");
}
