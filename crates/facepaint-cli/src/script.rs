//! JSON annotation scripts.
//!
//! A script picks the drawing frame and lists strokes as plane-local
//! points, so a session can be replayed without a pointer device:
//!
//! ```json
//! {
//!   "frame": { "mode": "auto" },
//!   "strokes": [
//!     { "color": 1, "mirror_x": true, "points": [[0, 0], [4, 0]] }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use facepaint_core::{PlaneFrame, Session};
use facepaint_math::{Point2, Point3};
use serde::Deserialize;
use tracing::debug;

/// How the drawing frame is chosen.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FrameSpec {
    /// Largest flat region of the mesh.
    #[default]
    Auto,
    /// Three surface points, in mesh coordinates.
    Pick { points: [[f64; 3]; 3] },
}

/// One stroke; unset options keep the previous stroke's value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptStroke {
    pub color: Option<usize>,
    pub brush_radius: Option<f64>,
    pub mirror_x: Option<bool>,
    pub mirror_y: Option<bool>,
    pub axis_lock: Option<bool>,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Script {
    pub frame: FrameSpec,
    /// Drawing-region size; 0 derives it from the mesh.
    pub plane_size: f64,
    pub strokes: Vec<ScriptStroke>,
}

impl Script {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid annotation script")
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplaySummary {
    pub frame: PlaneFrame,
    pub strokes: usize,
    pub marks: usize,
}

/// Run every stroke of `script` through `session`.
pub fn replay(session: &mut Session, script: &Script) -> Result<ReplaySummary> {
    if script.plane_size > 0.0 {
        session.set_requested_plane_size(script.plane_size)?;
    }
    let frame = match &script.frame {
        FrameSpec::Auto => session
            .auto_detect_frame()
            .context("no flat region found; pick the frame explicitly")?,
        FrameSpec::Pick { points: [a, b, c] } => session
            .pick_frame(&point3(a), &point3(b), &point3(c))
            .context("picked frame points are degenerate")?,
    };

    let mut strokes = 0;
    for (i, stroke) in script.strokes.iter().enumerate() {
        if let Some(index) = stroke.color {
            session
                .select_color(index)
                .with_context(|| format!("stroke {}: bad color index", i + 1))?;
        }
        if let Some(radius) = stroke.brush_radius {
            session
                .set_brush_radius(radius)
                .with_context(|| format!("stroke {}: bad brush radius", i + 1))?;
        }
        let settings = session.settings();
        let mirror_x = stroke.mirror_x.unwrap_or(settings.mirror_x);
        let mirror_y = stroke.mirror_y.unwrap_or(settings.mirror_y);
        let axis_lock = stroke.axis_lock.unwrap_or(settings.axis_lock);
        session.set_mirror(mirror_x, mirror_y);
        session.set_axis_lock(axis_lock);

        session.begin_stroke();
        for &[x, y] in &stroke.points {
            session.add_sample(&frame.to_world(&Point2::new(x, y)))?;
        }
        if session.commit_stroke()?.is_some() {
            strokes += 1;
        } else {
            debug!(stroke = i + 1, "stroke placed nothing");
        }
    }

    Ok(ReplaySummary {
        frame,
        strokes,
        marks: session.marks().len(),
    })
}

fn point3(p: &[f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}
