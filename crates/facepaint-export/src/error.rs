//! Error types for annotation export.

use facepaint_mesh::MeshError;
use thiserror::Error;

/// Errors from building inset solids or writing a package.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Base mesh has no triangles.
    #[error("base mesh is empty")]
    EmptyMesh,

    /// A mark color is not `#rrggbb`.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// 3MF generation error.
    #[error("3MF error: {0}")]
    ThreeMf(String),

    /// Mesh error.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
