//! Bounding Volume Hierarchy over mesh triangles.
//!
//! Uses a bucketed Surface Area Heuristic (SAH) for construction.

use std::sync::Arc;

use facepaint_math::Point3;
use facepaint_mesh::{Aabb3, TriangleMesh};
use tracing::{debug, instrument};

use crate::intersect::intersect_triangle;
use crate::{Ray, RayHit};

/// Maximum number of triangles stored in a leaf.
const LEAF_SIZE: usize = 4;

/// A BVH node - either a leaf containing triangles or an internal node with children.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Leaf node containing triangle indices.
    Leaf {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Indices into the mesh's triangle list.
        triangles: Vec<usize>,
    },
    /// Internal node with two children.
    Internal {
        /// Axis-aligned bounding box of this node.
        aabb: Aabb3,
        /// Left child node.
        left: Box<BvhNode>,
        /// Right child node.
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn aabb(&self) -> &Aabb3 {
        match self {
            BvhNode::Leaf { aabb, .. } | BvhNode::Internal { aabb, .. } => aabb,
        }
    }
}

/// Bounding Volume Hierarchy for accelerated ray-mesh intersection.
///
/// The hierarchy shares ownership of the mesh it was built from, so it can
/// never be queried against stale geometry; rebuild it after the mesh moves.
#[derive(Debug, Clone)]
pub struct Bvh {
    root: Option<BvhNode>,
    mesh: Arc<TriangleMesh>,
}

/// Per-triangle build record: (index, bounds, centroid).
type BuildItem = (usize, Aabb3, Point3);

impl Bvh {
    /// Build a BVH from a triangle mesh using SAH construction.
    ///
    /// Degenerate triangles are skipped; they can never be hit.
    #[instrument(skip(mesh), fields(triangles = mesh.num_triangles()))]
    pub fn build(mesh: Arc<TriangleMesh>) -> Self {
        let mut items: Vec<BuildItem> = mesh
            .triangles()
            .iter()
            .enumerate()
            .filter(|(_, tri)| tri.normal().is_some())
            .map(|(i, tri)| (i, tri.aabb(), tri.centroid()))
            .collect();

        let root = if items.is_empty() {
            None
        } else {
            Some(build_node(&mut items))
        };
        debug!(indexed = items.len(), "built triangle BVH");

        Self { root, mesh }
    }

    /// The mesh this hierarchy indexes.
    pub fn mesh(&self) -> &Arc<TriangleMesh> {
        &self.mesh
    }

    /// Get a reference to the root node, if any.
    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Trace a ray through the BVH, returning all intersections sorted by t.
    pub fn trace(&self, ray: &Ray) -> Vec<RayHit> {
        let mut hits = Vec::new();
        if let Some(ref root) = self.root {
            self.trace_node(ray, root, &mut hits);
        }
        hits.sort_by(|a, b| a.t.total_cmp(&b.t));
        hits
    }

    /// Trace a ray and return only the closest hit.
    pub fn trace_closest(&self, ray: &Ray) -> Option<RayHit> {
        let mut closest: Option<RayHit> = None;
        let mut closest_t = f64::INFINITY;
        if let Some(ref root) = self.root {
            self.trace_node_closest(ray, root, &mut closest, &mut closest_t);
        }
        closest
    }

    fn trace_node(&self, ray: &Ray, node: &BvhNode, hits: &mut Vec<RayHit>) {
        if ray.intersect_aabb(node.aabb()).is_none() {
            return;
        }
        match node {
            BvhNode::Leaf { triangles, .. } => {
                hits.extend(triangles.iter().filter_map(|&i| self.test_triangle(ray, i)));
            }
            BvhNode::Internal { left, right, .. } => {
                self.trace_node(ray, left, hits);
                self.trace_node(ray, right, hits);
            }
        }
    }

    fn trace_node_closest(
        &self,
        ray: &Ray,
        node: &BvhNode,
        closest: &mut Option<RayHit>,
        closest_t: &mut f64,
    ) {
        let Some((t_min, _)) = ray.intersect_aabb(node.aabb()) else {
            return;
        };
        // Early out if AABB entry is beyond current closest
        if t_min > *closest_t {
            return;
        }

        match node {
            BvhNode::Leaf { triangles, .. } => {
                for &i in triangles {
                    if let Some(hit) = self.test_triangle(ray, i) {
                        if hit.t < *closest_t {
                            *closest_t = hit.t;
                            *closest = Some(hit);
                        }
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                // Visit the nearer child first
                let left_t = ray.intersect_aabb(left.aabb()).map(|(t, _)| t);
                let right_t = ray.intersect_aabb(right.aabb()).map(|(t, _)| t);

                match (left_t, right_t) {
                    (Some(lt), Some(rt)) => {
                        let (first, second) = if lt <= rt { (left, right) } else { (right, left) };
                        self.trace_node_closest(ray, first, closest, closest_t);
                        self.trace_node_closest(ray, second, closest, closest_t);
                    }
                    (Some(_), None) => self.trace_node_closest(ray, left, closest, closest_t),
                    (None, Some(_)) => self.trace_node_closest(ray, right, closest, closest_t),
                    (None, None) => {}
                }
            }
        }
    }

    fn test_triangle(&self, ray: &Ray, index: usize) -> Option<RayHit> {
        let tri = self.mesh.triangle(index)?;
        let hit = intersect_triangle(ray, tri)?;
        let normal = tri.normal()?;
        Some(RayHit {
            t: hit.t,
            point: ray.at(hit.t),
            normal,
            triangle: index,
        })
    }
}

/// Build a BVH node recursively using SAH.
fn build_node(items: &mut [BuildItem]) -> BvhNode {
    let mut bounds = Aabb3::empty();
    for (_, aabb, _) in items.iter() {
        bounds.include_aabb(aabb);
    }

    if items.len() <= LEAF_SIZE {
        return BvhNode::Leaf {
            aabb: bounds,
            triangles: items.iter().map(|(i, _, _)| *i).collect(),
        };
    }

    let (axis, pos) = find_best_split(items, &bounds);
    let mut mid = partition(items, axis, pos);

    // Fallback if partition fails: split in the middle
    if mid == 0 || mid == items.len() {
        mid = items.len() / 2;
    }

    let (left, right) = items.split_at_mut(mid);
    BvhNode::Internal {
        aabb: bounds,
        left: Box::new(build_node(left)),
        right: Box::new(build_node(right)),
    }
}

/// Find the best split axis and position using bucketed SAH.
fn find_best_split(items: &[BuildItem], bounds: &Aabb3) -> (usize, f64) {
    const NUM_BUCKETS: usize = 12;

    let extent = bounds.size();
    let total_area = bounds.surface_area().max(f64::MIN_POSITIVE);

    let mut best_cost = f64::INFINITY;
    let mut best_axis = 0;
    let mut best_pos = 0.0;

    for axis in 0..3 {
        let axis_extent = extent[axis];
        if axis_extent < 1e-10 {
            continue;
        }
        let axis_min = bounds.min[axis];

        let mut counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];

        for (_, aabb, centroid) in items {
            let b = ((centroid[axis] - axis_min) / axis_extent * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);
            counts[b] += 1;
            bucket_bounds[b].include_aabb(aabb);
        }

        for split in 1..NUM_BUCKETS {
            let mut left_count = 0;
            let mut left_bounds = Aabb3::empty();
            for i in 0..split {
                left_count += counts[i];
                left_bounds.include_aabb(&bucket_bounds[i]);
            }

            let mut right_count = 0;
            let mut right_bounds = Aabb3::empty();
            for i in split..NUM_BUCKETS {
                right_count += counts[i];
                right_bounds.include_aabb(&bucket_bounds[i]);
            }

            if left_count == 0 || right_count == 0 {
                continue;
            }

            // SAH cost: traversal + P(left) * N_left + P(right) * N_right
            let cost = 0.125
                + left_bounds.surface_area() / total_area * left_count as f64
                + right_bounds.surface_area() / total_area * right_count as f64;

            if cost < best_cost {
                best_cost = cost;
                best_axis = axis;
                best_pos = axis_min + (split as f64 / NUM_BUCKETS as f64) * axis_extent;
            }
        }
    }

    (best_axis, best_pos)
}

/// Partition items by centroid along an axis; returns the split index.
fn partition(items: &mut [BuildItem], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = items.len();

    while left < right {
        if items[left].2[axis] < pos {
            left += 1;
        } else {
            right -= 1;
            items.swap(left, right);
        }
    }

    left
}
