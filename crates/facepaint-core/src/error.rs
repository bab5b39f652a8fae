//! Error types for surface annotation.

use facepaint_mesh::MeshError;
use thiserror::Error;

/// Errors that can occur while annotating a mesh.
///
/// Every geometric failure is local to the operation that raised it; the
/// session stays usable afterwards.
#[derive(Error, Debug)]
pub enum AnnotateError {
    /// No near-planar cluster reached the minimum area.
    #[error("no flat surface found")]
    NoFlatSurfaceFound,

    /// The query point lies outside the frame's square region.
    #[error("point ({x:.3}, {y:.3}) is outside the drawing region (half extent {half_extent:.3})")]
    PointOutsidePlaneRegion {
        /// Local U coordinate of the rejected point.
        x: f64,
        /// Local V coordinate of the rejected point.
        y: f64,
        /// Half extent of the active frame.
        half_extent: f64,
    },

    /// Neither probe ray hit the mesh.
    #[error("projection missed the mesh")]
    ProjectionMiss,

    /// The front reference is (nearly) parallel to the bottom reference.
    #[error("front reference is parallel to bottom reference")]
    AlignmentAmbiguous,

    /// Three picked points are collinear or coincident.
    #[error("picked points are collinear or coincident")]
    DegenerateReferenceTriangle,

    /// Mesh has no usable triangles.
    #[error("mesh is empty")]
    EmptyMesh,

    /// An operation needs a drawing frame but none is active.
    #[error("no active drawing frame")]
    NoActiveFrame,

    /// A sample arrived while no stroke was open.
    #[error("no active stroke")]
    NoActiveStroke,

    /// Invalid user settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Mesh decoding or encoding failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl AnnotateError {
    /// True for the per-operation geometric failures a caller can recover
    /// from by re-picking, re-sampling, or simply ignoring the sample.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnnotateError::NoFlatSurfaceFound
                | AnnotateError::PointOutsidePlaneRegion { .. }
                | AnnotateError::ProjectionMiss
                | AnnotateError::AlignmentAmbiguous
                | AnnotateError::DegenerateReferenceTriangle
        )
    }
}

/// Result type for annotation operations.
pub type Result<T> = std::result::Result<T, AnnotateError>;
