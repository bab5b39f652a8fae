//! Ray-primitive intersection algorithms.

mod plane;
mod triangle;

pub use plane::intersect_plane;
pub use triangle::{intersect_triangle, TriangleHit};
