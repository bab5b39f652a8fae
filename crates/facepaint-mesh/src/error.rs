//! Error types for mesh loading.

use thiserror::Error;

/// Errors that can occur while decoding or building a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Mesh has no triangles.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Binary STL payload shorter than its header or declared count.
    #[error("binary STL truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required by the header.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// ASCII STL could not be parsed.
    #[error("invalid ASCII STL at line {line}: {reason}")]
    InvalidAscii {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// Index buffer refers past the end of the vertex buffer.
    #[error("index {index} out of range (vertex count = {vertex_count})")]
    IndexOutOfRange {
        /// Offending index.
        index: u32,
        /// Number of vertices available.
        vertex_count: usize,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
