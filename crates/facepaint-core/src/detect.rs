//! Largest flat region detection.
//!
//! A single streaming pass over the triangle soup groups triangles into
//! near-coplanar clusters: a triangle joins the first cluster whose normal
//! is within the angular threshold and whose plane offset is within the
//! offset tolerance, otherwise it seeds a new cluster. The cluster with the
//! largest total area wins.

use facepaint_math::{Dir3, Point3, Vec3};
use facepaint_mesh::TriangleMesh;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{AnnotateError, Result};
use crate::settings::DetectorParams;

/// A near-planar region of the mesh surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlatRegion {
    /// Area-weighted unit normal of the region.
    pub normal: Dir3,
    /// Area-weighted centroid of the region's triangles.
    pub origin: Point3,
    /// Total area of the region.
    pub area: f64,
}

#[derive(Debug)]
struct Cluster {
    /// Normal of the seeding triangle; membership is tested against it.
    seed_normal: Vec3,
    /// Area-weighted running average of `normal · vertex`.
    offset: f64,
    area: f64,
    normal_sum: Vec3,
    centroid_sum: Vec3,
}

impl Cluster {
    fn seed(normal: Vec3, offset: f64, area: f64, centroid: &Point3) -> Self {
        Self {
            seed_normal: normal,
            offset,
            area,
            normal_sum: normal * area,
            centroid_sum: centroid.coords * area,
        }
    }

    fn accepts(&self, normal: &Vec3, offset: f64, params: &DetectorParams, tolerance: f64) -> bool {
        self.seed_normal.dot(normal) >= params.normal_cos_threshold
            && (offset - self.offset).abs() <= tolerance
    }

    fn add(&mut self, normal: Vec3, offset: f64, area: f64, centroid: &Point3) {
        self.area += area;
        self.offset += (offset - self.offset) * (area / self.area);
        self.normal_sum += normal * area;
        self.centroid_sum += centroid.coords * area;
    }

    fn finish(&self) -> Option<FlatRegion> {
        let normal = Dir3::try_new(self.normal_sum, 1e-12)?;
        Some(FlatRegion {
            normal,
            origin: Point3::from(self.centroid_sum / self.area),
            area: self.area,
        })
    }
}

/// Find the largest near-planar region of `mesh`.
///
/// Ties on area keep the cluster seeded first. Fails with
/// [`AnnotateError::NoFlatSurfaceFound`] when the mesh has no valid
/// triangle or the largest cluster is below `params.min_cluster_area`.
#[instrument(skip(mesh, params), fields(triangles = mesh.num_triangles()))]
pub fn detect_largest_flat_region(
    mesh: &TriangleMesh,
    params: &DetectorParams,
) -> Result<FlatRegion> {
    let tolerance = params.offset_tolerance(mesh.diagonal());
    let mut clusters: Vec<Cluster> = Vec::new();

    for tri in mesh.triangles() {
        let area = tri.area();
        if area < params.degenerate_area {
            continue;
        }
        let Some(normal) = tri.normal() else {
            continue;
        };
        let normal = normal.into_inner();
        let offset = normal.dot(&tri.v[0].coords);
        let centroid = tri.centroid();

        match clusters
            .iter_mut()
            .find(|c| c.accepts(&normal, offset, params, tolerance))
        {
            Some(cluster) => cluster.add(normal, offset, area, &centroid),
            None => clusters.push(Cluster::seed(normal, offset, area, &centroid)),
        }
    }

    let mut best: Option<&Cluster> = None;
    for cluster in &clusters {
        if best.map_or(true, |b| cluster.area > b.area) {
            best = Some(cluster);
        }
    }

    let region = best
        .filter(|c| c.area >= params.min_cluster_area)
        .and_then(Cluster::finish)
        .ok_or(AnnotateError::NoFlatSurfaceFound)?;

    debug!(
        clusters = clusters.len(),
        area = region.area,
        "detected flat region"
    );
    Ok(region)
}
