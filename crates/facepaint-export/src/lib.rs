//! Inset-solid generation and 3MF packaging for facepaint annotations.
//!
//! Marks are exported as separate colored objects next to the base part:
//! dots as short cylinders below the surface, text as the placed outline.
//!
//! ```ignore
//! use facepaint_export::{export_3mf, ExportOptions};
//!
//! let options = ExportOptions::from_settings(session.settings());
//! let bytes = export_3mf("part", session.mesh(), session.marks(), &options)?;
//! std::fs::write("part.3mf", bytes)?;
//! ```

pub mod error;
pub mod solid;
pub mod threemf;

pub use error::{ExportError, Result};
pub use solid::{collect_exports, DotExport, ExportOptions, MarkExport, TextExport, DOT_SEGMENTS};
pub use threemf::{export_3mf, ThreeMfObject, ThreeMfWriter, BASE_COLOR};
