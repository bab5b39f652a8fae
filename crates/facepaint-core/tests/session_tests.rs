//! End-to-end annotation scenarios.

use std::sync::Arc;

use approx::assert_relative_eq;
use facepaint_core::{
    detect_largest_flat_region, AnnotateError, Axis, DetectorParams, MarkKind, ReferenceKind,
    Session, Settings, StrokeId, TextOutline,
};
use facepaint_math::{Point2, Point3, Rotation, Vec3};
use facepaint_mesh::primitives::make_box;
use facepaint_mesh::{Triangle, TriangleMesh};

/// 20 mm cube whose +Z face comes first in triangle order.
fn cube() -> TriangleMesh {
    let mut tris = make_box(Point3::new(-10.0, -10.0, -10.0), Point3::new(10.0, 10.0, 10.0))
        .triangles()
        .to_vec();
    tris.rotate_left(2);
    TriangleMesh::new(tris)
}

/// Axis-aligned rectangle `[x0, x1] x [y0, y1]` at height `z`, facing +Z.
fn rect_z(x0: f64, x1: f64, y0: f64, y1: f64, z: f64) -> Vec<Triangle> {
    vec![
        Triangle::new(
            Point3::new(x0, y0, z),
            Point3::new(x1, y0, z),
            Point3::new(x1, y1, z),
        ),
        Triangle::new(
            Point3::new(x0, y0, z),
            Point3::new(x1, y1, z),
            Point3::new(x0, y1, z),
        ),
    ]
}

fn session_with_top_frame(settings: Settings) -> Session {
    let mut session = Session::new(cube(), settings).unwrap();
    session.auto_detect_frame().unwrap();
    session
}

fn draw(session: &mut Session, points: &[(f64, f64)]) -> Option<StrokeId> {
    let frame = *session.frame().unwrap();
    session.begin_stroke();
    for &(x, y) in points {
        session.add_sample(&frame.to_world(&Point2::new(x, y))).unwrap();
    }
    session.commit_stroke().unwrap()
}

#[test]
fn cube_detects_top_face_and_projects_origin() {
    let mesh = cube();
    assert_eq!(mesh.num_triangles(), 12);
    let mut session = Session::new(mesh, Settings::default()).unwrap();

    let frame = session.auto_detect_frame().unwrap();
    assert_relative_eq!(frame.normal.into_inner(), Vec3::z(), epsilon = 1e-9);
    assert_relative_eq!(frame.inset_normal.into_inner(), Vec3::z(), epsilon = 1e-9);
    assert_relative_eq!(frame.origin, Point3::new(0.0, 0.0, 10.0), epsilon = 1e-9);

    let hit = session.project(&frame.origin).unwrap();
    assert_relative_eq!(hit.point, frame.origin, epsilon = 1e-9);
    assert_relative_eq!(hit.normal.into_inner(), Vec3::z(), epsilon = 1e-9);
}

#[test]
fn detector_prefers_large_plane_over_two_unit_planes() {
    let mut tris = Vec::new();
    // Unit square on z = 0 facing +Z
    tris.extend(rect_z(0.0, 1.0, 0.0, 1.0, 0.0));
    // Unit square on x = 0 facing -X
    tris.push(Triangle::new(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ));
    tris.push(Triangle::new(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 0.0),
    ));
    // 2 x 5 plane at z = 3
    tris.extend(rect_z(4.0, 6.0, 0.0, 5.0, 3.0));

    let region =
        detect_largest_flat_region(&TriangleMesh::new(tris), &DetectorParams::default()).unwrap();
    assert!((region.area - 10.0).abs() < 1e-9);
    assert_relative_eq!(region.normal.into_inner(), Vec3::z(), epsilon = 1e-12);
    assert_relative_eq!(region.origin, Point3::new(5.0, 2.5, 3.0), epsilon = 1e-9);
}

#[test]
fn undo_all_then_redo_order() {
    let mut session = session_with_top_frame(Settings::default());
    let ids: Vec<StrokeId> = (0..3)
        .map(|i| {
            let x = -6.0 + 4.0 * i as f64;
            draw(&mut session, &[(x, 0.0), (x + 1.0, 0.0)]).unwrap()
        })
        .collect();
    assert!(session.marks().len() > 3);

    for _ in 0..3 {
        assert!(session.undo().is_some());
    }
    assert!(session.marks().is_empty());
    assert!(session.undo().is_none());

    let redo: Vec<StrokeId> = session.history().redo_stack().iter().map(|s| s.id).collect();
    assert_eq!(redo, vec![ids[2], ids[1], ids[0]]);

    assert_eq!(session.redo(), Some(ids[0]));
    assert_eq!(session.redo(), Some(ids[1]));

    // Opening a stroke drops the remaining redo branch, even if it stays empty
    session.begin_stroke();
    assert!(!session.history().can_redo());
    assert_eq!(session.commit_stroke().unwrap(), None);
    assert_eq!(session.history().undo_stack().len(), 2);
}

#[test]
fn undo_redo_restores_exact_marks() {
    let mut session = session_with_top_frame(Settings::default());
    draw(&mut session, &[(0.0, 0.0), (2.0, 1.0)]).unwrap();
    let mut before: Vec<Point3> = session.marks().iter().map(|(_, m)| m.point).collect();

    session.undo();
    session.redo();
    let mut after: Vec<Point3> = session.marks().iter().map(|(_, m)| m.point).collect();

    let key = |p: &Point3| (p.x, p.y);
    before.sort_by(|a, b| key(a).partial_cmp(&key(b)).unwrap());
    after.sort_by(|a, b| key(a).partial_cmp(&key(b)).unwrap());
    assert_eq!(before, after);
}

#[test]
fn mirrored_dots_on_axis_collapse() {
    let settings = Settings {
        mirror_x: true,
        mirror_y: true,
        ..Settings::default()
    };
    let mut session = session_with_top_frame(settings);

    // Generic point: four copies
    draw(&mut session, &[(3.0, 2.0)]).unwrap();
    assert_eq!(session.marks().len(), 4);

    // On the U axis the X reflection coincides with the point itself
    draw(&mut session, &[(3.0, 0.0)]).unwrap();
    assert_eq!(session.marks().len(), 6);

    // The origin is fixed by every reflection
    draw(&mut session, &[(0.0, 0.0)]).unwrap();
    assert_eq!(session.marks().len(), 7);
}

#[test]
fn axis_lock_straightens_stroke() {
    let settings = Settings {
        axis_lock: true,
        brush_radius: 2.0,
        ..Settings::default()
    };
    let mut session = session_with_top_frame(settings);
    let frame = *session.frame().unwrap();

    session.begin_stroke();
    for (x, y) in [(0.0, 0.0), (5.0, 1.0), (6.0, 1.5)] {
        session.add_sample(&frame.to_world(&Point2::new(x, y))).unwrap();
    }
    assert_eq!(session.axis_lock_state(), Some(Axis::X));
    session.commit_stroke().unwrap();

    for (_, mark) in session.marks().iter() {
        let local = frame.to_local(&mark.point);
        assert!(local.y.abs() < 1e-9, "mark left the locked row: {:?}", local);
    }
}

#[test]
fn dots_take_active_palette_color() {
    let mut session = session_with_top_frame(Settings::default());
    session.select_color(1).unwrap();
    draw(&mut session, &[(1.0, 1.0)]).unwrap();
    let (_, mark) = session.marks().iter().next().unwrap();
    assert!(matches!(&mark.kind, MarkKind::Dot { color, .. } if color == "#4ecdc4"));
}

#[test]
fn text_placement_is_one_stroke() {
    let settings = Settings {
        mirror_y: true,
        ..Settings::default()
    };
    let mut session = session_with_top_frame(settings);
    let frame = *session.frame().unwrap();
    let outline = Arc::new(TextOutline::new(
        "A",
        make_box(Point3::new(-1.0, -1.0, 0.0), Point3::new(1.0, 1.0, 0.4)),
        0.4,
    ));

    let placed = session
        .place_text(&frame.to_world(&Point2::new(4.0, 2.0)), outline.clone())
        .unwrap();
    assert_eq!(placed, 2);
    assert_eq!(session.marks().len(), 2);

    session.undo();
    assert!(session.marks().is_empty());

    // Outside the drawing region nothing is placed
    let err = session
        .place_text(&frame.to_world(&Point2::new(40.0, 0.0)), outline)
        .unwrap_err();
    assert!(matches!(err, AnnotateError::PointOutsidePlaneRegion { .. }));
    assert!(session.marks().is_empty());
}

#[test]
fn alignment_rotates_marks_and_invalidates_frame() {
    let mut session = session_with_top_frame(Settings::default());
    draw(&mut session, &[(2.0, 3.0)]).unwrap();
    // Leave one stroke on the redo stack as well
    draw(&mut session, &[(-2.0, -3.0)]).unwrap();
    session.undo();

    let before: Vec<Point3> = session.marks().iter().map(|(_, m)| m.point).collect();
    let redo_before = session.history().redo_stack()[0].marks[0].point;

    let q = Rotation::from_axis_angle(&Vec3::x_axis(), std::f64::consts::FRAC_PI_2);
    session.align(&q).unwrap();

    assert!(session.frame().is_none());
    let after: Vec<Point3> = session.marks().iter().map(|(_, m)| m.point).collect();
    for (b, a) in before.iter().zip(&after) {
        assert_relative_eq!(q * b, *a, epsilon = 1e-9);
    }

    // Redo brings back the undone stroke in the new orientation
    session.redo();
    assert!(session
        .marks()
        .iter()
        .any(|(_, m)| (m.point - q * redo_before).norm() < 1e-9));

    // Projection queries see the rotated mesh immediately: the old top face now faces -Y
    assert!(matches!(
        session.project(&Point3::origin()),
        Err(AnnotateError::NoActiveFrame)
    ));
    let frame = session
        .pick_frame(
            &Point3::new(-5.0, -10.0, -5.0),
            &Point3::new(5.0, -10.0, -5.0),
            &Point3::new(0.0, -10.0, 5.0),
        )
        .unwrap();
    let hit = session.project(&frame.origin).unwrap();
    assert!((hit.point.y + 10.0).abs() < 1e-9);
}

#[test]
fn references_realign_mesh() {
    let mut session = session_with_top_frame(Settings::default());
    // Bottom: the -Y face; front: the +Z face
    session
        .set_reference(
            ReferenceKind::Bottom,
            &Point3::new(0.0, -10.0, 0.0),
            &Point3::new(5.0, -10.0, 0.0),
            &Point3::new(0.0, -10.0, 5.0),
        )
        .unwrap();
    let q = session
        .set_reference(
            ReferenceKind::Front,
            &Point3::new(0.0, 0.0, 10.0),
            &Point3::new(5.0, 0.0, 10.0),
            &Point3::new(0.0, 5.0, 10.0),
        )
        .unwrap()
        .unwrap();
    // Already canonical
    assert!((q * Vec3::y() - Vec3::y()).norm() < 1e-9);
    assert!((q * Vec3::z() - Vec3::z()).norm() < 1e-9);
    assert!(session.frame().is_none());
}
