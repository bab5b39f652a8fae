//! Placed marks and the persistent annotation set.

use std::sync::Arc;

use facepaint_math::{Dir3, Point3, Rotation};
use facepaint_mesh::TriangleMesh;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key of a mark in the [`AnnotationSet`].
    pub struct MarkId;
}

/// Pre-triangulated text geometry.
///
/// Local XY is the baseline plane and the solid is extruded along local +Z
/// over `[0, depth]`. Glyph layout happens elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOutline {
    /// Label for exported objects.
    pub text: String,
    /// Closed solid in outline-local coordinates.
    pub mesh: TriangleMesh,
    /// Extrusion depth along local +Z.
    pub depth: f64,
}

impl TextOutline {
    /// Create a text outline.
    pub fn new(text: impl Into<String>, mesh: TriangleMesh, depth: f64) -> Self {
        Self {
            text: text.into(),
            mesh,
            depth,
        }
    }
}

/// Payload of a mark.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkKind {
    /// Round dot.
    Dot {
        /// Dot radius.
        radius: f64,
        /// `#rrggbb` color.
        color: String,
    },
    /// Text outline shared between the mirrored copies of one placement.
    Text {
        /// Outline geometry.
        outline: Arc<TextOutline>,
        /// `#rrggbb` color.
        color: String,
    },
}

impl MarkKind {
    /// Color of the mark.
    pub fn color(&self) -> &str {
        match self {
            MarkKind::Dot { color, .. } | MarkKind::Text { color, .. } => color,
        }
    }
}

/// One placed annotation element.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    /// Point on the mesh surface.
    pub point: Point3,
    /// Outward surface normal at `point`.
    pub normal: Dir3,
    /// In-plane direction the mark's local X follows (frame U axis at
    /// placement time).
    pub tangent: Dir3,
    /// Payload.
    pub kind: MarkKind,
}

impl Mark {
    /// Rotate the mark about the world origin.
    pub fn rotate(&mut self, rotation: &Rotation) {
        self.point = rotation * self.point;
        self.normal = rotation * self.normal;
        self.tangent = rotation * self.tangent;
    }
}

/// Identifier of a stroke in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrokeId(pub u64);

/// Marks produced by one gesture; undone and redone as a unit.
#[derive(Debug, Clone)]
pub struct Stroke {
    /// Identifier, increasing with each opened stroke.
    pub id: StrokeId,
    /// Marks in emission order.
    pub marks: Vec<Mark>,
    /// Keys of the marks while the stroke is applied to an annotation set.
    pub(crate) placed: Vec<MarkId>,
}

impl Stroke {
    /// Create an empty stroke.
    pub fn new(id: StrokeId) -> Self {
        Self {
            id,
            marks: Vec::new(),
            placed: Vec::new(),
        }
    }

    /// Number of marks.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// True if the stroke has no marks.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

/// Persistent set of committed marks.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    marks: SlotMap<MarkId, Mark>,
}

impl AnnotationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of marks.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// True if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Mark by key.
    pub fn get(&self, id: MarkId) -> Option<&Mark> {
        self.marks.get(id)
    }

    /// Iterate over all marks.
    pub fn iter(&self) -> impl Iterator<Item = (MarkId, &Mark)> {
        self.marks.iter()
    }

    /// Insert a stroke's marks, recording their keys on the stroke.
    pub fn apply(&mut self, stroke: &mut Stroke) {
        stroke.placed = stroke
            .marks
            .iter()
            .map(|m| self.marks.insert(m.clone()))
            .collect();
    }

    /// Remove a stroke's marks, refreshing the stroke's copies so a later
    /// [`apply`](Self::apply) restores them exactly.
    pub fn retract(&mut self, stroke: &mut Stroke) {
        for (slot, id) in stroke.placed.drain(..).enumerate() {
            if let Some(mark) = self.marks.remove(id) {
                stroke.marks[slot] = mark;
            }
        }
    }

    /// Remove every mark.
    pub fn clear(&mut self) {
        self.marks.clear();
    }

    /// Rotate every mark about the world origin.
    pub fn rotate_all(&mut self, rotation: &Rotation) {
        for mark in self.marks.values_mut() {
            mark.rotate(rotation);
        }
    }
}
