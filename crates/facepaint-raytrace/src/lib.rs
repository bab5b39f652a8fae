#![warn(missing_docs)]

//! Ray casting against triangle meshes.
//!
//! # Architecture
//!
//! - [`Ray`] - Ray representation with origin and direction
//! - [`RayHit`] - Closest-hit result carrying the triangle index
//! - [`intersect`] - Ray-plane and ray-triangle intersection
//! - [`bvh`] - Bounding volume hierarchy over mesh triangles
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use facepaint_raytrace::{Ray, Bvh};
//! use facepaint_mesh::primitives::make_box;
//!
//! let mesh = make_box(Point3::origin(), Point3::new(10.0, 10.0, 10.0));
//! let bvh = Bvh::build(Arc::new(mesh));
//!
//! let ray = Ray::new(Point3::new(-5.0, 5.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
//! let hit = bvh.trace_closest(&ray);
//! ```

pub mod bvh;
pub mod intersect;
mod ray;

pub use bvh::Bvh;
pub use ray::{Ray, RayHit};
