//! Freehand stroke sampling.
//!
//! Each pointer sample on the drawing plane goes through:
//! 1. the axis-lock constraint (optional)
//! 2. interpolation from the previous sample at a fixed step
//! 3. mirroring
//! 4. surface projection, one mark per successful projection

use facepaint_math::{Point2, Point3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::annotation::{Mark, MarkKind, Stroke, StrokeId};
use crate::error::{AnnotateError, Result};
use crate::frame::PlaneFrame;
use crate::mirror::mirror_variants;
use crate::project::SurfaceProjector;
use crate::settings::Settings;

/// Movement below this (in both local axes) does not re-evaluate the lock.
pub const AXIS_LOCK_DEADZONE: f64 = 0.1;

/// A local axis of the drawing plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Local U.
    X,
    /// Local V.
    Y,
}

/// The currently locked axis, if any.
pub type AxisLockState = Option<Axis>;

/// Dominant-axis tracker with hysteresis.
#[derive(Debug, Clone, Default)]
pub struct AxisLockTracker {
    state: AxisLockState,
    /// Last raw sample; deltas are measured from here.
    last_sample: Option<Point2>,
    /// Last constrained point; supplies the non-dominant coordinate.
    anchor: Option<Point2>,
}

impl AxisLockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the lock and both reference points.
    pub fn reset(&mut self) {
        self.state = None;
        self.last_sample = None;
        self.anchor = None;
    }

    pub fn state(&self) -> AxisLockState {
        self.state
    }

    /// Constrain `local` to the dominant axis.
    ///
    /// Deltas are the movement since the previous raw sample. Once an axis
    /// is locked, the other axis takes over only when its delta exceeds the
    /// locked one's by `switch_factor`.
    pub fn constrain(&mut self, local: Point2, switch_factor: f64) -> Point2 {
        let (Some(last), Some(anchor)) = (self.last_sample, self.anchor) else {
            self.last_sample = Some(local);
            self.anchor = Some(local);
            return local;
        };
        self.last_sample = Some(local);

        let dx = (local.x - last.x).abs();
        let dy = (local.y - last.y).abs();

        if dx >= AXIS_LOCK_DEADZONE || dy >= AXIS_LOCK_DEADZONE {
            let next = match self.state {
                None if dx >= dy => Axis::X,
                None => Axis::Y,
                Some(Axis::X) if dy > dx * switch_factor => Axis::Y,
                Some(Axis::Y) if dx > dy * switch_factor => Axis::X,
                Some(axis) => axis,
            };
            if self.state != Some(next) {
                debug!(axis = ?next, dx, dy, "axis lock changed");
            }
            self.state = Some(next);
        }

        let constrained = apply_lock(self.state, &anchor, &local);
        self.anchor = Some(constrained);
        constrained
    }
}

/// Points from `from` (exclusive) to `to` (inclusive) spaced by `step`.
///
/// Always ends with `to`; returns just `to` when the points are closer than
/// one step.
pub fn interpolate(from: &Point3, to: &Point3, step: f64) -> Vec<Point3> {
    let delta = to - from;
    let length = delta.norm();
    if step <= 0.0 || length <= step {
        return vec![*to];
    }
    let dir = delta / length;
    let mut points: Vec<Point3> = (1..)
        .map(|i| i as f64 * step)
        .take_while(|d| *d < length)
        .map(|d| from + dir * d)
        .collect();
    points.push(*to);
    points
}

/// Gesture state for freehand and text strokes.
///
/// Owns the open stroke between `begin` and `commit`, the axis-lock
/// tracker, and the latest pending pointer sample.
#[derive(Debug, Default)]
pub struct StrokeEngine {
    active: Option<Stroke>,
    last_point: Option<Point3>,
    pending: Option<Point3>,
    lock: AxisLockTracker,
    next_id: u64,
}

impl StrokeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new stroke, discarding any open one.
    pub fn begin(&mut self) -> StrokeId {
        self.next_id += 1;
        let id = StrokeId(self.next_id);
        self.active = Some(Stroke::new(id));
        self.last_point = None;
        self.pending = None;
        self.lock.reset();
        id
    }

    /// True while a stroke is open.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The open stroke.
    pub fn active(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }

    /// Current axis-lock state.
    pub fn axis_lock(&self) -> AxisLockState {
        self.lock.state()
    }

    /// Close the open stroke and hand it over.
    ///
    /// Any queued sample is dropped.
    pub fn commit(&mut self) -> Option<Stroke> {
        self.pending = None;
        self.last_point = None;
        self.active.take()
    }

    /// Remember `point` as the latest sample, replacing any older pending one.
    pub fn queue_sample(&mut self, point: Point3) {
        self.pending = Some(point);
    }

    /// Take the pending sample, if any.
    pub fn take_pending(&mut self) -> Option<Point3> {
        self.pending.take()
    }

    /// Process one dot sample on `frame`; returns the number of marks added.
    ///
    /// Samples outside the region are ignored, and variants that miss the
    /// mesh are dropped without failing the stroke.
    pub fn add_dot_sample(
        &mut self,
        point: &Point3,
        frame: &PlaneFrame,
        projector: &SurfaceProjector,
        settings: &Settings,
    ) -> Result<usize> {
        let stroke = self.active.as_mut().ok_or(AnnotateError::NoActiveStroke)?;

        let local = match frame.checked_local(point) {
            Ok(local) => local,
            Err(err) => {
                trace!(%err, "sample ignored");
                return Ok(0);
            }
        };
        let local = if settings.axis_lock {
            self.lock.constrain(local, settings.switch_factor())
        } else {
            local
        };
        let point = frame.to_world(&local);

        let samples = match self.last_point {
            Some(prev) => interpolate(&prev, &point, settings.stroke_step()),
            None => vec![point],
        };
        self.last_point = Some(point);

        let kind = MarkKind::Dot {
            radius: settings.brush_radius,
            color: settings.color.clone(),
        };
        let mut added = 0;
        for sample in &samples {
            for variant in mirror_variants(sample, frame, settings.mirror_x, settings.mirror_y) {
                match projector.project(&variant, frame) {
                    Ok(hit) => {
                        stroke.marks.push(Mark {
                            point: hit.point,
                            normal: hit.normal,
                            tangent: frame.axis_u,
                            kind: kind.clone(),
                        });
                        added += 1;
                    }
                    Err(err) if err.is_recoverable() => trace!(%err, "sample dropped"),
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(added)
    }

    /// Add one mark of `kind` per mirror variant of `point`.
    pub fn add_placement(
        &mut self,
        point: &Point3,
        kind: MarkKind,
        frame: &PlaneFrame,
        projector: &SurfaceProjector,
        settings: &Settings,
    ) -> Result<usize> {
        let stroke = self.active.as_mut().ok_or(AnnotateError::NoActiveStroke)?;
        frame.checked_local(point)?;

        let mut added = 0;
        for variant in mirror_variants(point, frame, settings.mirror_x, settings.mirror_y) {
            match projector.project(&variant, frame) {
                Ok(hit) => {
                    stroke.marks.push(Mark {
                        point: hit.point,
                        normal: hit.normal,
                        tangent: frame.axis_u,
                        kind: kind.clone(),
                    });
                    added += 1;
                }
                Err(err) if err.is_recoverable() => trace!(%err, "placement variant dropped"),
                Err(err) => return Err(err),
            }
        }
        Ok(added)
    }
}
