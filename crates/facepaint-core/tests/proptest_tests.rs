//! Property-based tests for frame and alignment invariants.

use proptest::prelude::*;

use facepaint_core::{
    compute_alignment, mirror_local, AnnotateError, Axis, AxisLockTracker, PlaneFrame,
};
use facepaint_math::{Dir3, Point2, Point3, Vec3};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Arbitrary non-degenerate direction.
fn arb_direction() -> impl Strategy<Value = Vec3> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
        .prop_filter("direction must not be near zero", |v| v.norm() > 1e-3)
}

/// Arbitrary point in a modelling-sized range.
fn arb_point() -> impl Strategy<Value = Point3> {
    (-500.0f64..500.0, -500.0f64..500.0, -500.0f64..500.0)
        .prop_map(|(x, y, z)| Point3::new(x, y, z))
}

const TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// 1. Frame axes are orthonormal and right-handed for every normal
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn frame_axes_orthonormal(
        n in arb_direction(),
        origin in arb_point(),
        center in arb_point(),
    ) {
        let frame = PlaneFrame::build(Dir3::new_normalize(n), origin, &center, 16.0);
        let (u, v, w) = (frame.axis_u, frame.axis_v, frame.normal);

        prop_assert!((u.norm() - 1.0).abs() < TOL);
        prop_assert!((v.norm() - 1.0).abs() < TOL);
        prop_assert!((w.norm() - 1.0).abs() < TOL);
        prop_assert!(u.dot(v.as_ref()).abs() < TOL, "u.v = {}", u.dot(v.as_ref()));
        prop_assert!(u.dot(w.as_ref()).abs() < TOL, "u.n = {}", u.dot(w.as_ref()));
        prop_assert!(v.dot(w.as_ref()).abs() < TOL, "v.n = {}", v.dot(w.as_ref()));
        prop_assert!((u.cross(v.as_ref()) - w.into_inner()).norm() < TOL);
    }
}

// ---------------------------------------------------------------------------
// 2. Inset normal never points toward the mesh center
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn inset_normal_points_outward(
        n in arb_direction(),
        origin in arb_point(),
        center in arb_point(),
    ) {
        let frame = PlaneFrame::build(Dir3::new_normalize(n), origin, &center, 16.0);
        prop_assert!(frame.inset_normal.dot(&(origin - center)) >= 0.0);
        prop_assert!(frame.inset_normal.dot(frame.normal.as_ref()).abs() > 1.0 - TOL);
    }
}

// ---------------------------------------------------------------------------
// 3. Alignment sends bottom to -Y and the orthogonalised front to +Z
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn alignment_maps_references(
        bottom in arb_direction(),
        front in arb_direction(),
    ) {
        let down = bottom.normalize();
        let projected = front - down * front.dot(&down);
        prop_assume!(projected.norm_squared() > 1e-6);

        let q = compute_alignment(&bottom, &front).unwrap();
        prop_assert!((q * down - Vec3::new(0.0, -1.0, 0.0)).norm() < TOL);
        prop_assert!((q * projected.normalize() - Vec3::new(0.0, 0.0, 1.0)).norm() < TOL);
    }
}

// ---------------------------------------------------------------------------
// 4. Parallel references are always ambiguous
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn alignment_parallel_is_ambiguous(
        bottom in arb_direction(),
        scale in prop_oneof![-10.0f64..-0.1, 0.1f64..10.0],
    ) {
        let result = compute_alignment(&bottom, &(bottom * scale));
        prop_assert!(matches!(result, Err(AnnotateError::AlignmentAmbiguous)));
    }
}

// ---------------------------------------------------------------------------
// 5. Mirror variants are 1..=4 distinct points with the original first
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn mirror_variant_count(
        x in -100.0f64..100.0,
        y in -100.0f64..100.0,
        mirror_x in any::<bool>(),
        mirror_y in any::<bool>(),
    ) {
        let p = Point2::new(x, y);
        let variants = mirror_local(p, mirror_x, mirror_y);
        let max = 1 << (usize::from(mirror_x) + usize::from(mirror_y));
        prop_assert!(!variants.is_empty() && variants.len() <= max);
        prop_assert_eq!(variants[0], p);
        for v in &variants {
            prop_assert!((v.x.abs() - x.abs()).abs() < 1e-12);
            prop_assert!((v.y.abs() - y.abs()).abs() < 1e-12);
        }
    }
}

// ---------------------------------------------------------------------------
// 6. Axis lock only ever replaces one coordinate of a sample
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn axis_lock_keeps_one_coordinate(
        samples in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 2..20),
        factor in 1.0f64..12.0,
    ) {
        let mut lock = AxisLockTracker::new();
        for &(x, y) in &samples {
            let p = lock.constrain(Point2::new(x, y), factor);
            prop_assert!(p.x == x || p.y == y, "({}, {}) -> {:?}", x, y, p);
        }
        // Unlocked only if every step stayed inside the deadzone
        let ok = lock.state().is_some() || samples.windows(2).all(|w| {
            (w[1].0 - w[0].0).abs() < 0.1 && (w[1].1 - w[0].1).abs() < 0.1
        });
        prop_assert!(ok);
    }
}

// ---------------------------------------------------------------------------
// 7. A drag whose per-step drift stays under the factor never leaves its row
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn axis_lock_holds_under_bounded_drift(
        steps in prop::collection::vec((0.5f64..5.0, -0.9f64..0.9), 1..60),
        factor in 1.0f64..12.0,
    ) {
        let mut lock = AxisLockTracker::new();
        let (mut x, mut y) = (1.0, 0.0);
        lock.constrain(Point2::origin(), factor);
        lock.constrain(Point2::new(x, y), factor);
        for &(dx, drift) in &steps {
            // |dy| < dx * factor on every step
            x += dx;
            y += drift * dx * factor;
            let p = lock.constrain(Point2::new(x, y), factor);
            prop_assert_eq!(lock.state(), Some(Axis::X));
            prop_assert_eq!(p, Point2::new(x, 0.0));
        }
    }
}
