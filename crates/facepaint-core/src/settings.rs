//! User-tunable annotation settings.

use serde::{Deserialize, Serialize};

use crate::error::{AnnotateError, Result};

/// Default palette offered to the user.
pub const DEFAULT_PALETTE: [&str; 4] = ["#ff5a5a", "#4ecdc4", "#ffe66d", "#9f7aea"];

/// Bounds applied to the axis-lock switch factor.
pub const SWITCH_FACTOR_RANGE: (f64, f64) = (1.0, 12.0);

/// Flat-surface detector parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Minimum cosine between a triangle normal and a cluster normal.
    pub normal_cos_threshold: f64,
    /// Absolute floor of the plane-offset tolerance (mesh units).
    pub min_offset_tolerance: f64,
    /// Plane-offset tolerance as a fraction of the bounding diagonal.
    pub relative_offset_tolerance: f64,
    /// Triangles with smaller area are skipped.
    pub degenerate_area: f64,
    /// A winning cluster must have at least this area.
    pub min_cluster_area: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            normal_cos_threshold: 6.0_f64.to_radians().cos(),
            min_offset_tolerance: 0.25,
            relative_offset_tolerance: 0.003,
            degenerate_area: 1e-9,
            min_cluster_area: 1e-6,
        }
    }
}

impl DetectorParams {
    /// Plane-offset tolerance for a mesh with the given bounding diagonal.
    pub fn offset_tolerance(&self, diagonal: f64) -> f64 {
        self.min_offset_tolerance
            .max(self.relative_offset_tolerance * diagonal)
    }
}

/// Annotation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dot radius (mm).
    pub brush_radius: f64,
    /// Active color as `#rrggbb`.
    pub color: String,
    /// Colors selectable by index.
    pub palette: Vec<String>,
    /// Reflect across the frame's U axis.
    pub mirror_x: bool,
    /// Reflect across the frame's V axis.
    pub mirror_y: bool,
    /// Constrain freehand strokes to one local axis at a time.
    pub axis_lock: bool,
    /// Hysteresis ratio for switching the locked axis.
    pub axis_lock_switch_factor: f64,
    /// Requested drawing-region size (0 = derive from the mesh).
    pub requested_plane_size: f64,
    /// Inset depth of every mark (mm).
    pub inset_depth: f64,
    /// Preview lift applied to text marks (mm).
    pub text_lift: f64,
    /// Flat-surface detector parameters.
    pub detector: DetectorParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brush_radius: 1.0,
            color: DEFAULT_PALETTE[0].to_string(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            mirror_x: false,
            mirror_y: false,
            axis_lock: false,
            axis_lock_switch_factor: 1.6,
            requested_plane_size: 0.0,
            inset_depth: 0.4,
            text_lift: 0.06,
            detector: DetectorParams::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(text).map_err(|e| AnnotateError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.brush_radius > 0.0) {
            return Err(AnnotateError::InvalidSettings(
                "brush_radius must be positive".into(),
            ));
        }
        if !(self.inset_depth > 0.0) {
            return Err(AnnotateError::InvalidSettings(
                "inset_depth must be positive".into(),
            ));
        }
        if !(self.text_lift >= 0.0) {
            return Err(AnnotateError::InvalidSettings(
                "text_lift must not be negative".into(),
            ));
        }
        if !(self.requested_plane_size >= 0.0) {
            return Err(AnnotateError::InvalidSettings(
                "requested_plane_size must not be negative".into(),
            ));
        }
        if !self.axis_lock_switch_factor.is_finite() {
            return Err(AnnotateError::InvalidSettings(
                "axis_lock_switch_factor must be finite".into(),
            ));
        }
        if parse_hex_color(&self.color).is_none() {
            return Err(AnnotateError::InvalidSettings(format!(
                "color {:?} is not #rrggbb",
                self.color
            )));
        }
        if let Some(bad) = self.palette.iter().find(|c| parse_hex_color(c).is_none()) {
            return Err(AnnotateError::InvalidSettings(format!(
                "palette color {:?} is not #rrggbb",
                bad
            )));
        }
        let d = &self.detector;
        if !(d.normal_cos_threshold > 0.0 && d.normal_cos_threshold <= 1.0) {
            return Err(AnnotateError::InvalidSettings(
                "detector.normal_cos_threshold must be in (0, 1]".into(),
            ));
        }
        if d.min_offset_tolerance < 0.0
            || d.relative_offset_tolerance < 0.0
            || d.degenerate_area < 0.0
            || d.min_cluster_area < 0.0
        {
            return Err(AnnotateError::InvalidSettings(
                "detector tolerances must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// Switch factor clamped to its valid range.
    pub fn switch_factor(&self) -> f64 {
        self.axis_lock_switch_factor
            .clamp(SWITCH_FACTOR_RANGE.0, SWITCH_FACTOR_RANGE.1)
    }

    /// Interpolation step for freehand strokes at the current brush radius.
    pub fn stroke_step(&self) -> f64 {
        (self.brush_radius * 0.18).clamp(0.06, 0.35)
    }
}

/// Parse `#rrggbb` into RGB bytes.
pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.palette.len(), 4);
        assert_eq!(s.color, "#ff5a5a");
        assert!((s.inset_depth - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_detector_defaults() {
        let d = DetectorParams::default();
        assert!((d.normal_cos_threshold - 0.994_521_895).abs() < 1e-9);
        // Small meshes use the absolute floor
        assert!((d.offset_tolerance(10.0) - 0.25).abs() < 1e-12);
        // Large meshes scale with the diagonal
        assert!((d.offset_tolerance(1000.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_toml_partial() {
        let s = Settings::from_toml_str(
            r##"
brush_radius = 2.5
mirror_x = true
color = "#4ecdc4"

[detector]
min_offset_tolerance = 0.5
"##,
        )
        .unwrap();
        assert!((s.brush_radius - 2.5).abs() < 1e-12);
        assert!(s.mirror_x);
        assert!(!s.mirror_y);
        assert_eq!(s.color, "#4ecdc4");
        assert!((s.detector.min_offset_tolerance - 0.5).abs() < 1e-12);
        assert!((s.detector.relative_offset_tolerance - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        let err = Settings::from_toml_str("brush_radius = -1.0").unwrap_err();
        assert!(matches!(err, AnnotateError::InvalidSettings(_)));
        let err = Settings::from_toml_str("brush_radius = \"big\"").unwrap_err();
        assert!(matches!(err, AnnotateError::InvalidSettings(_)));
    }

    #[test]
    fn test_validate_colors() {
        let s = Settings {
            color: "red".into(),
            ..Settings::default()
        };
        assert!(s.validate().is_err());

        let s = Settings {
            palette: vec!["#12345".into()],
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_switch_factor_clamped() {
        let mut s = Settings::default();
        assert!((s.switch_factor() - 1.6).abs() < 1e-12);
        s.axis_lock_switch_factor = 0.2;
        assert_eq!(s.switch_factor(), 1.0);
        s.axis_lock_switch_factor = 40.0;
        assert_eq!(s.switch_factor(), 12.0);
    }

    #[test]
    fn test_stroke_step_clamped() {
        let mut s = Settings::default();
        assert!((s.stroke_step() - 0.18).abs() < 1e-12);
        s.brush_radius = 0.1;
        assert!((s.stroke_step() - 0.06).abs() < 1e-12);
        s.brush_radius = 10.0;
        assert!((s.stroke_step() - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff5a5a"), Some([0xff, 0x5a, 0x5a]));
        assert_eq!(parse_hex_color("#4ECDC4"), Some([0x4e, 0xcd, 0xc4]));
        assert_eq!(parse_hex_color("ff5a5a"), None);
        assert_eq!(parse_hex_color("#ff5a5"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }
}
