#![warn(missing_docs)]

//! Triangle soup meshes for the facepaint annotation kernel.
//!
//! A [`TriangleMesh`] is an ordered list of independent triangles with
//! consistent (counter-clockwise, outward) winding. The annotation core
//! only reads it; the one exception is rigid re-orientation, which
//! rotates every vertex in place.
//!
//! - [`Aabb3`] - bounding boxes used for sizing and ray acceleration
//! - [`stl`] - ASCII/binary STL decoding and binary STL encoding
//! - [`primitives`] - boxes and cylinders used for tests and inset solids

pub mod bbox;
pub mod error;
pub mod primitives;
pub mod stl;

pub use bbox::Aabb3;
pub use error::{MeshError, Result};

use facepaint_math::{Dir3, Point3, Rotation, Transform, Vec3};

/// Triangles with less than this area are treated as degenerate.
pub const DEGENERATE_AREA: f64 = 1e-12;

/// A single triangle of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Vertex positions in winding order.
    pub v: [Point3; 3],
}

impl Triangle {
    /// Create a triangle from three vertices.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self { v: [a, b, c] }
    }

    /// Unnormalized normal `(v1 - v0) × (v2 - v0)`; its length is twice the area.
    pub fn scaled_normal(&self) -> Vec3 {
        (self.v[1] - self.v[0]).cross(&(self.v[2] - self.v[0]))
    }

    /// Unit face normal from the winding, or `None` for a degenerate triangle.
    pub fn normal(&self) -> Option<Dir3> {
        let n = self.scaled_normal();
        if n.norm() * 0.5 < DEGENERATE_AREA {
            return None;
        }
        Some(Dir3::new_normalize(n))
    }

    /// Triangle area.
    pub fn area(&self) -> f64 {
        self.scaled_normal().norm() * 0.5
    }

    /// Centroid (average of the three vertices).
    pub fn centroid(&self) -> Point3 {
        Point3::from((self.v[0].coords + self.v[1].coords + self.v[2].coords) / 3.0)
    }

    /// Bounding box of the three vertices.
    pub fn aabb(&self) -> Aabb3 {
        let mut b = Aabb3::empty();
        for p in &self.v {
            b.include_point(p);
        }
        b
    }

    /// This triangle with `transform` applied to every vertex.
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            v: self.v.map(|p| transform.apply_point(&p)),
        }
    }
}

/// An ordered triangle soup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
}

impl TriangleMesh {
    /// Create a mesh from triangles.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Build a mesh from flat `[x0, y0, z0, ...]` positions and triangle indices.
    pub fn from_indexed(vertices: &[f32], indices: &[u32]) -> Result<Self> {
        let vertex_count = vertices.len() / 3;
        let vertex = |i: u32| -> Result<Point3> {
            let i = i as usize;
            if i >= vertex_count {
                return Err(MeshError::IndexOutOfRange {
                    index: i as u32,
                    vertex_count,
                });
            }
            Ok(Point3::new(
                vertices[i * 3] as f64,
                vertices[i * 3 + 1] as f64,
                vertices[i * 3 + 2] as f64,
            ))
        };

        let triangles = indices
            .chunks_exact(3)
            .map(|tri| Ok(Triangle::new(vertex(tri[0])?, vertex(tri[1])?, vertex(tri[2])?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { triangles })
    }

    /// Flatten into unwelded `(positions, indices)` buffers (f32/u32).
    pub fn to_indexed(&self) -> (Vec<f32>, Vec<u32>) {
        let mut vertices = Vec::with_capacity(self.triangles.len() * 9);
        let mut indices = Vec::with_capacity(self.triangles.len() * 3);
        for (i, tri) in self.triangles.iter().enumerate() {
            for p in &tri.v {
                vertices.extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
            }
            let base = (i * 3) as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }
        (vertices, indices)
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// True if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// All triangles in order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Triangle by index.
    pub fn triangle(&self, index: usize) -> Option<&Triangle> {
        self.triangles.get(index)
    }

    /// Append another mesh's triangles.
    pub fn merge(&mut self, other: &TriangleMesh) {
        self.triangles.extend_from_slice(&other.triangles);
    }

    /// Bounding box of all vertices, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb3> {
        if self.triangles.is_empty() {
            return None;
        }
        let mut b = Aabb3::empty();
        for tri in &self.triangles {
            for p in &tri.v {
                b.include_point(p);
            }
        }
        Some(b)
    }

    /// Center of the bounding box (origin for an empty mesh).
    pub fn bounding_center(&self) -> Point3 {
        self.bounds().map(|b| b.center()).unwrap_or_else(Point3::origin)
    }

    /// Largest bounding-box edge (0 for an empty mesh).
    pub fn max_dimension(&self) -> f64 {
        self.bounds().map(|b| b.max_dimension()).unwrap_or(0.0)
    }

    /// Bounding-box diagonal length (0 for an empty mesh).
    pub fn diagonal(&self) -> f64 {
        self.bounds().map(|b| b.diagonal()).unwrap_or(0.0)
    }

    /// This mesh translated so its bounding-box center sits at the origin.
    pub fn centered(&self) -> Self {
        let c = self.bounding_center();
        self.transformed(&Transform::translation(-c.x, -c.y, -c.z))
    }

    /// This mesh with `transform` applied to every vertex.
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            triangles: self.triangles.iter().map(|t| t.transformed(transform)).collect(),
        }
    }

    /// Rotate every vertex about the world origin, in place.
    pub fn rotate(&mut self, rotation: &Rotation) {
        for tri in &mut self.triangles {
            for p in &mut tri.v {
                *p = rotation * *p;
            }
        }
    }
}

impl FromIterator<Triangle> for TriangleMesh {
    fn from_iter<I: IntoIterator<Item = Triangle>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
