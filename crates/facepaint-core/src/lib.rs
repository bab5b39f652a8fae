//! Surface annotation core for facepaint.
//!
//! Lets marks (freehand dot strokes and extruded text) be placed on an
//! arbitrary triangle mesh, locked to a locally flat region of its surface.
//!
//! # Architecture
//!
//! - [`detect`] - largest near-planar region of a triangle soup
//! - [`frame`] - the bounded drawing plane and its local axes
//! - [`project`] - plane point to mesh surface, with per-hit normals
//! - [`mirror`] - symmetric copies of a plane point
//! - [`stroke`] - axis lock, interpolation, pointer coalescing
//! - [`history`] - stroke-level undo/redo over the [`AnnotationSet`]
//! - [`align`] - bottom/front re-orientation of mesh and marks
//! - [`session`] - the owner of all of the above
//!
//! # Example
//!
//! ```ignore
//! use facepaint_core::{Session, Settings};
//!
//! let mut session = Session::new(mesh, Settings::default())?;
//! let frame = session.auto_detect_frame()?;
//!
//! session.begin_stroke();
//! session.add_sample(&frame.origin)?;
//! session.commit_stroke()?;
//! assert_eq!(session.marks().len(), 1);
//! ```

pub mod align;
pub mod annotation;
pub mod detect;
pub mod error;
pub mod frame;
pub mod history;
pub mod mirror;
pub mod project;
pub mod session;
pub mod settings;
pub mod stroke;

pub use align::{apply_alignment, compute_alignment, Reference, ReferenceKind};
pub use annotation::{AnnotationSet, Mark, MarkId, MarkKind, Stroke, StrokeId, TextOutline};
pub use detect::{detect_largest_flat_region, FlatRegion};
pub use error::{AnnotateError, Result};
pub use frame::{resolve_half_extent, PlaneFrame};
pub use history::History;
pub use mirror::{mirror_local, mirror_variants};
pub use project::{SurfacePoint, SurfaceProjector};
pub use session::Session;
pub use settings::{parse_hex_color, DetectorParams, Settings};
pub use stroke::{interpolate, Axis, AxisLockState, AxisLockTracker, StrokeEngine};
