//! Mirrored copies of plane points.

use facepaint_math::{Point2, Point3};

use crate::frame::PlaneFrame;

/// Decimal places kept when comparing mirrored coordinates.
const DEDUP_DECIMALS: i32 = 4;

/// Reflections of a local point, deduplicated.
///
/// `mirror_x` reflects across the U axis `(x, -y)`, `mirror_y` across the
/// V axis `(-x, y)`; with both, the point reflection `(-x, -y)` is added.
/// The original point is always first.
///
/// A point on an axis is unchanged only by the reflection across that
/// axis: `(3, 0)` with `mirror_x` gives one variant, but with `mirror_y`
/// alone it gives two, `(3, 0)` and `(-3, 0)`.
pub fn mirror_local(local: Point2, mirror_x: bool, mirror_y: bool) -> Vec<Point2> {
    let mut candidates = vec![local];
    if mirror_x {
        candidates.push(Point2::new(local.x, -local.y));
    }
    if mirror_y {
        candidates.push(Point2::new(-local.x, local.y));
    }
    if mirror_x && mirror_y {
        candidates.push(Point2::new(-local.x, -local.y));
    }

    let mut seen: Vec<(i64, i64)> = Vec::with_capacity(candidates.len());
    candidates.retain(|p| {
        let key = (quantize(p.x), quantize(p.y));
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
    candidates
}

/// World-space mirror variants of `point` on `frame` (1 to 4 points).
pub fn mirror_variants(
    point: &Point3,
    frame: &PlaneFrame,
    mirror_x: bool,
    mirror_y: bool,
) -> Vec<Point3> {
    mirror_local(frame.to_local(point), mirror_x, mirror_y)
        .iter()
        .map(|p| frame.to_world(p))
        .collect()
}

fn quantize(v: f64) -> i64 {
    // Rounding -0.00001 and 0.00001 both give 0
    (v * 10f64.powi(DEDUP_DECIMALS)).round() as i64
}
