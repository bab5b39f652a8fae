//! Stroke-level undo/redo.

use facepaint_math::Rotation;

use crate::annotation::{AnnotationSet, Stroke};

/// Two-stack undo/redo history of strokes.
///
/// A stroke lives on at most one stack. Strokes on `undo` are applied to
/// the annotation set; strokes on `redo` are not.
#[derive(Debug, Default)]
pub struct History {
    undo: Vec<Stroke>,
    redo: Vec<Stroke>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a stroke to `marks` and push it onto the undo stack.
    ///
    /// Empty strokes are discarded; returns whether the stroke was kept.
    pub fn commit(&mut self, mut stroke: Stroke, marks: &mut AnnotationSet) -> bool {
        if stroke.is_empty() {
            return false;
        }
        marks.apply(&mut stroke);
        self.undo.push(stroke);
        self.redo.clear();
        true
    }

    /// Retract the most recent stroke and move it to the redo stack.
    pub fn undo(&mut self, marks: &mut AnnotationSet) -> Option<&Stroke> {
        let mut stroke = self.undo.pop()?;
        marks.retract(&mut stroke);
        self.redo.push(stroke);
        self.redo.last()
    }

    /// Re-apply the most recently undone stroke.
    pub fn redo(&mut self, marks: &mut AnnotationSet) -> Option<&Stroke> {
        let mut stroke = self.redo.pop()?;
        marks.apply(&mut stroke);
        self.undo.push(stroke);
        self.undo.last()
    }

    /// Drop the redo branch.
    pub fn clear_redo(&mut self) {
        self.redo.clear();
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Rotate the marks held by undone strokes, keeping them in step with
    /// a realigned mesh. Applied strokes are refreshed from the annotation
    /// set when undone.
    pub fn rotate_undone(&mut self, rotation: &Rotation) {
        for stroke in &mut self.redo {
            for mark in &mut stroke.marks {
                mark.rotate(rotation);
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Committed strokes, oldest first.
    pub fn undo_stack(&self) -> &[Stroke] {
        &self.undo
    }

    /// Undone strokes, most recently undone last.
    pub fn redo_stack(&self) -> &[Stroke] {
        &self.redo
    }
}
