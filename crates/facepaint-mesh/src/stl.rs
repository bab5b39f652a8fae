//! STL decoding (ASCII and binary) and binary STL encoding.
//!
//! Binary STL format:
//! - 80-byte header (arbitrary text)
//! - u32 triangle count (little-endian)
//! - For each triangle: 3×f32 normal + 3×(3×f32 vertex) + u16 attribute = 50 bytes
//!
//! Stored facet normals are ignored on read; normals are always derived
//! from the vertex winding.

use std::path::Path;

use facepaint_math::{Point3, Vec3};
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::{Triangle, TriangleMesh};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Decode an STL payload, detecting ASCII vs binary.
pub fn parse_stl(data: &[u8]) -> Result<TriangleMesh> {
    let mesh = if is_ascii_stl(data) {
        parse_ascii_stl(data)?
    } else {
        parse_binary_stl(data)?
    };
    if mesh.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    debug!(triangles = mesh.num_triangles(), "decoded STL");
    Ok(mesh)
}

/// Read and decode an STL file.
pub fn read_stl(path: impl AsRef<Path>) -> Result<TriangleMesh> {
    let data = std::fs::read(path)?;
    parse_stl(&data)
}

/// ASCII STL starts with `solid ` and mentions `facet` early on.
///
/// Binary files may also start with "solid" in their header, so the
/// keyword check is required.
fn is_ascii_stl(data: &[u8]) -> bool {
    if !data.starts_with(b"solid") {
        return false;
    }
    let check_len = data.len().min(1024);
    data[..check_len].windows(5).any(|w| w == b"facet")
}

fn parse_binary_stl(data: &[u8]) -> Result<TriangleMesh> {
    if data.len() < HEADER_LEN + 4 {
        return Err(MeshError::Truncated {
            expected: HEADER_LEN + 4,
            actual: data.len(),
        });
    }

    let count = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    let expected = HEADER_LEN + 4 + count * FACET_LEN;
    if data.len() < expected {
        return Err(MeshError::Truncated {
            expected,
            actual: data.len(),
        });
    }

    let read_f32 = |offset: usize| -> f64 {
        f32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
            as f64
    };

    let triangles = (0..count)
        .map(|i| {
            // Skip the 12-byte stored normal
            let base = HEADER_LEN + 4 + i * FACET_LEN + 12;
            let vertex = |k: usize| {
                let o = base + k * 12;
                Point3::new(read_f32(o), read_f32(o + 4), read_f32(o + 8))
            };
            Triangle::new(vertex(0), vertex(1), vertex(2))
        })
        .collect();

    Ok(TriangleMesh::new(triangles))
}

fn parse_ascii_stl(data: &[u8]) -> Result<TriangleMesh> {
    let text = std::str::from_utf8(data).map_err(|e| MeshError::InvalidAscii {
        line: 0,
        reason: e.to_string(),
    })?;

    let mut triangles = Vec::new();
    let mut pending: Vec<Point3> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        if parts.next() != Some("vertex") {
            continue;
        }
        let coords = parts
            .take(3)
            .map(|s| s.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| MeshError::InvalidAscii {
                line: line_no + 1,
                reason: e.to_string(),
            })?;
        if coords.len() != 3 {
            return Err(MeshError::InvalidAscii {
                line: line_no + 1,
                reason: "vertex needs three coordinates".into(),
            });
        }
        pending.push(Point3::new(coords[0], coords[1], coords[2]));
        if pending.len() == 3 {
            triangles.push(Triangle::new(pending[0], pending[1], pending[2]));
            pending.clear();
        }
    }

    Ok(TriangleMesh::new(triangles))
}

/// Encode a mesh as binary STL.
pub fn write_binary_stl(mesh: &TriangleMesh, name: &str) -> Result<Vec<u8>> {
    if mesh.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mut buf = Vec::with_capacity(HEADER_LEN + 4 + mesh.num_triangles() * FACET_LEN);

    let header = format!("binary STL: {}", name);
    let header_bytes = header.as_bytes();
    buf.extend_from_slice(&header_bytes[..header_bytes.len().min(HEADER_LEN)]);
    buf.resize(HEADER_LEN, 0u8);

    buf.extend_from_slice(&(mesh.num_triangles() as u32).to_le_bytes());

    for tri in mesh.triangles() {
        let n = tri.normal().map(|n| n.into_inner()).unwrap_or_else(Vec3::zeros);
        for c in [n.x, n.y, n.z] {
            buf.extend_from_slice(&(c as f32).to_le_bytes());
        }
        for p in &tri.v {
            for c in [p.x, p.y, p.z] {
                buf.extend_from_slice(&(c as f32).to_le_bytes());
            }
        }
        // Attribute byte count (unused)
        buf.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(buf)
}
