//! The annotation session: owner of all mutable state.

use std::sync::Arc;

use facepaint_math::{Point3, Rotation};
use facepaint_mesh::TriangleMesh;
use facepaint_raytrace::Ray;
use tracing::{debug, info, instrument};

use crate::align::{apply_alignment, compute_alignment, Reference, ReferenceKind};
use crate::annotation::{AnnotationSet, MarkKind, StrokeId, TextOutline};
use crate::detect::{detect_largest_flat_region, FlatRegion};
use crate::error::{AnnotateError, Result};
use crate::frame::{resolve_half_extent, PlaneFrame};
use crate::history::History;
use crate::project::{SurfacePoint, SurfaceProjector};
use crate::settings::Settings;
use crate::stroke::{AxisLockState, StrokeEngine};

/// An annotation session over one mesh.
///
/// The mesh is only ever changed by realignment, which also rotates every
/// mark and drops the frame and reference picks.
#[derive(Debug)]
pub struct Session {
    settings: Settings,
    projector: SurfaceProjector,
    frame: Option<PlaneFrame>,
    marks: AnnotationSet,
    history: History,
    engine: StrokeEngine,
    bottom: Option<Reference>,
    front: Option<Reference>,
}

impl Session {
    /// Start a session on `mesh`.
    pub fn new(mesh: TriangleMesh, settings: Settings) -> Result<Self> {
        settings.validate()?;
        let projector = SurfaceProjector::new(Arc::new(mesh))?;
        Ok(Self {
            settings,
            projector,
            frame: None,
            marks: AnnotationSet::new(),
            history: History::new(),
            engine: StrokeEngine::new(),
            bottom: None,
            front: None,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn mesh(&self) -> &TriangleMesh {
        self.projector.mesh()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn frame(&self) -> Option<&PlaneFrame> {
        self.frame.as_ref()
    }

    pub fn marks(&self) -> &AnnotationSet {
        &self.marks
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn axis_lock_state(&self) -> AxisLockState {
        self.engine.axis_lock()
    }

    pub fn reference(&self, kind: ReferenceKind) -> Option<&Reference> {
        match kind {
            ReferenceKind::Bottom => self.bottom.as_ref(),
            ReferenceKind::Front => self.front.as_ref(),
        }
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Replace the settings after validating them.
    ///
    /// A changed plane size rebuilds the active frame.
    pub fn set_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        let resize = settings.requested_plane_size != self.settings.requested_plane_size;
        self.settings = settings;
        if resize {
            self.refresh_half_extent();
        }
        Ok(())
    }

    /// Make palette entry `index` the active color.
    pub fn select_color(&mut self, index: usize) -> Result<&str> {
        let color = self.settings.palette.get(index).cloned().ok_or_else(|| {
            AnnotateError::InvalidSettings(format!(
                "palette index {} out of range ({} colors)",
                index,
                self.settings.palette.len()
            ))
        })?;
        self.settings.color = color;
        Ok(&self.settings.color)
    }

    pub fn set_brush_radius(&mut self, radius: f64) -> Result<()> {
        if !(radius > 0.0) {
            return Err(AnnotateError::InvalidSettings(
                "brush_radius must be positive".into(),
            ));
        }
        self.settings.brush_radius = radius;
        Ok(())
    }

    pub fn set_mirror(&mut self, mirror_x: bool, mirror_y: bool) {
        self.settings.mirror_x = mirror_x;
        self.settings.mirror_y = mirror_y;
    }

    pub fn set_axis_lock(&mut self, enabled: bool) {
        self.settings.axis_lock = enabled;
    }

    /// Change the requested drawing-region size and rebuild the frame.
    pub fn set_requested_plane_size(&mut self, size: f64) -> Result<()> {
        if !(size >= 0.0) {
            return Err(AnnotateError::InvalidSettings(
                "requested_plane_size must not be negative".into(),
            ));
        }
        self.settings.requested_plane_size = size;
        self.refresh_half_extent();
        Ok(())
    }

    // =========================================================================
    // Frame
    // =========================================================================

    fn half_extent(&self) -> f64 {
        resolve_half_extent(
            self.projector.max_dimension(),
            self.settings.requested_plane_size,
        )
    }

    fn refresh_half_extent(&mut self) {
        let half_extent = self.half_extent();
        if let Some(frame) = self.frame {
            self.frame = Some(frame.with_half_extent(half_extent));
        }
    }

    /// Detect the largest flat region and make it the drawing frame.
    #[instrument(skip(self))]
    pub fn auto_detect_frame(&mut self) -> Result<PlaneFrame> {
        let region = self.detect_flat_region()?;
        let frame =
            PlaneFrame::from_region(&region, &self.projector.center(), self.half_extent());
        info!(area = region.area, half_extent = frame.half_extent, "frame from flat region");
        self.frame = Some(frame);
        Ok(frame)
    }

    /// Largest flat region of the current mesh.
    pub fn detect_flat_region(&self) -> Result<FlatRegion> {
        detect_largest_flat_region(self.mesh(), &self.settings.detector)
    }

    /// Make the plane through three picked points the drawing frame.
    pub fn pick_frame(&mut self, a: &Point3, b: &Point3, c: &Point3) -> Result<PlaneFrame> {
        let frame =
            PlaneFrame::from_picked_points(a, b, c, &self.projector.center(), self.half_extent())?;
        self.frame = Some(frame);
        Ok(frame)
    }

    /// Drop the drawing frame.
    pub fn clear_frame(&mut self) {
        self.frame = None;
    }

    /// Where a pointer ray meets the active drawing region.
    pub fn pointer_point(&self, ray: &Ray) -> Result<Point3> {
        let frame = self.frame.as_ref().ok_or(AnnotateError::NoActiveFrame)?;
        frame.pointer_point(ray)
    }

    /// Project a plane point onto the mesh using the active frame.
    pub fn project(&self, plane_point: &Point3) -> Result<SurfacePoint> {
        let frame = self.frame.as_ref().ok_or(AnnotateError::NoActiveFrame)?;
        self.projector.project(plane_point, frame)
    }

    // =========================================================================
    // Strokes
    // =========================================================================

    /// Open a stroke. Drops the redo branch.
    pub fn begin_stroke(&mut self) -> StrokeId {
        self.history.clear_redo();
        self.engine.begin()
    }

    /// Feed one pointer sample to the open stroke immediately.
    pub fn add_sample(&mut self, point: &Point3) -> Result<usize> {
        let frame = self.frame.as_ref().ok_or(AnnotateError::NoActiveFrame)?;
        self.engine
            .add_dot_sample(point, frame, &self.projector, &self.settings)
    }

    /// Queue a pointer sample; only the latest one survives until [`tick`](Self::tick).
    pub fn queue_sample(&mut self, point: Point3) {
        self.engine.queue_sample(point);
    }

    /// Process at most one pending sample.
    pub fn tick(&mut self) -> Result<usize> {
        match self.engine.take_pending() {
            Some(point) => self.add_sample(&point),
            None => Ok(0),
        }
    }

    /// Flush the pending sample and commit the open stroke.
    ///
    /// Returns the stroke id if it carried at least one mark.
    pub fn commit_stroke(&mut self) -> Result<Option<StrokeId>> {
        if !self.engine.is_active() {
            return Err(AnnotateError::NoActiveStroke);
        }
        let flushed = self.tick();
        let Some(stroke) = self.engine.commit() else {
            return Err(AnnotateError::NoActiveStroke);
        };
        let id = stroke.id;
        let count = stroke.len();
        let kept = self.history.commit(stroke, &mut self.marks);
        debug!(stroke = id.0, marks = count, kept, "stroke committed");
        match flushed {
            Err(err) if !err.is_recoverable() => Err(err),
            _ => Ok(kept.then_some(id)),
        }
    }

    /// Place `outline` at `point` (plus mirror copies) as one undoable stroke.
    ///
    /// Any open stroke is committed first. Returns the number of text marks.
    pub fn place_text(&mut self, point: &Point3, outline: Arc<TextOutline>) -> Result<usize> {
        let frame = *self.frame.as_ref().ok_or(AnnotateError::NoActiveFrame)?;
        if self.engine.is_active() {
            self.commit_stroke()?;
        }
        self.begin_stroke();
        let kind = MarkKind::Text {
            outline,
            color: self.settings.color.clone(),
        };
        let placed = self
            .engine
            .add_placement(point, kind, &frame, &self.projector, &self.settings);
        let stroke = self.engine.commit();
        let added = placed?;
        if let Some(stroke) = stroke {
            self.history.commit(stroke, &mut self.marks);
        }
        Ok(added)
    }

    /// Undo the most recent stroke.
    pub fn undo(&mut self) -> Option<StrokeId> {
        self.history.undo(&mut self.marks).map(|s| s.id)
    }

    /// Redo the most recently undone stroke.
    pub fn redo(&mut self) -> Option<StrokeId> {
        self.history.redo(&mut self.marks).map(|s| s.id)
    }

    /// Remove every mark and forget the history. Not undoable.
    pub fn clear_marks(&mut self) {
        self.engine.commit();
        self.marks.clear();
        self.history.clear();
    }

    // =========================================================================
    // Orientation
    // =========================================================================

    /// Record a bottom or front reference from three picked points.
    ///
    /// Once both are present the mesh is realigned and the applied rotation
    /// returned. An ambiguous pair keeps the bottom and drops the front.
    pub fn set_reference(
        &mut self,
        kind: ReferenceKind,
        a: &Point3,
        b: &Point3,
        c: &Point3,
    ) -> Result<Option<Rotation>> {
        let reference = Reference::from_points(a, b, c, &self.projector.center())?;
        match kind {
            ReferenceKind::Bottom => self.bottom = Some(reference),
            ReferenceKind::Front => self.front = Some(reference),
        }

        let (Some(bottom), Some(front)) = (self.bottom, self.front) else {
            return Ok(None);
        };
        let rotation = match compute_alignment(&bottom.normal, &front.normal) {
            Ok(rotation) => rotation,
            Err(err) => {
                self.front = None;
                return Err(err);
            }
        };
        self.align(&rotation)?;
        Ok(Some(rotation))
    }

    /// Rotate the mesh and all marks about the world origin.
    ///
    /// The frame and reference picks are invalidated; detect or pick a new
    /// frame before drawing again.
    #[instrument(skip_all)]
    pub fn align(&mut self, rotation: &Rotation) -> Result<()> {
        if self.engine.is_active() {
            self.commit_stroke()?;
        }
        let mut mesh = TriangleMesh::clone(self.projector.mesh());
        apply_alignment(&mut mesh, &mut self.marks, rotation);
        self.history.rotate_undone(rotation);
        self.projector = SurfaceProjector::new(Arc::new(mesh))?;
        self.frame = None;
        self.bottom = None;
        self.front = None;
        info!("mesh realigned; frame invalidated");
        Ok(())
    }
}
