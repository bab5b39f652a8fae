//! Export payloads and the inset solids built from them.
//!
//! Every mark is cut into the part as a shallow solid hanging below the
//! surface: dots as capped cylinders along the mark normal, text as the
//! outline mesh placed in the mark's tangent frame.

use std::sync::Arc;

use facepaint_core::{AnnotationSet, Mark, MarkKind, Settings, TextOutline};
use facepaint_math::{tangent_basis, Dir3, Point3, Transform};
use facepaint_mesh::primitives::make_cylinder;
use facepaint_mesh::TriangleMesh;

/// Side count of exported dot cylinders.
pub const DOT_SEGMENTS: u32 = 20;

/// Geometry options for exported solids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Depth of dot cylinders below the surface (mm).
    pub inset_depth: f64,
    /// Preview lift carried by text marks (mm).
    pub text_lift: f64,
    /// Keep the preview lift on exported text instead of stripping it.
    pub keep_preview_lift: bool,
    /// Side count of dot cylinders.
    pub dot_segments: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            inset_depth: 0.4,
            text_lift: 0.06,
            keep_preview_lift: false,
            dot_segments: DOT_SEGMENTS,
        }
    }
}

impl ExportOptions {
    /// Take depth and lift from session settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            inset_depth: settings.inset_depth,
            text_lift: settings.text_lift,
            ..Self::default()
        }
    }

    fn effective_lift(&self) -> f64 {
        if self.keep_preview_lift {
            self.text_lift
        } else {
            0.0
        }
    }
}

/// A committed dot as seen by an exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct DotExport {
    /// Surface point.
    pub point: Point3,
    /// Outward surface normal; the solid goes the other way.
    pub normal: Dir3,
    /// Dot radius.
    pub radius: f64,
    /// `#rrggbb` color.
    pub color: String,
}

impl DotExport {
    /// Inset cylinder centered half the depth below the surface point.
    pub fn solid(&self, options: &ExportOptions) -> TriangleMesh {
        let center = self.point - self.normal.into_inner() * (options.inset_depth * 0.5);
        make_cylinder(
            center,
            &self.normal,
            self.radius,
            options.inset_depth,
            options.dot_segments,
        )
    }
}

/// A committed text placement as seen by an exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct TextExport {
    /// Outline geometry shared with the annotation set.
    pub outline: Arc<TextOutline>,
    /// Surface point of the baseline origin.
    pub point: Point3,
    /// Outward surface normal.
    pub normal: Dir3,
    /// Direction the baseline runs along.
    pub tangent: Dir3,
    /// `#rrggbb` color.
    pub color: String,
}

impl TextExport {
    /// Placement of the outline: local X along the tangent, local Z along
    /// the normal, with the top face `lift` above the surface.
    pub fn transform(&self, lift: f64) -> Transform {
        let (u, v) = tangent_basis(&self.normal, &self.tangent);
        let origin = self.point + self.normal.into_inner() * (lift - self.outline.depth);
        Transform::from_frame(&origin, &u, &v, &self.normal)
    }

    /// Outline placed and recessed by its own depth.
    pub fn solid(&self, options: &ExportOptions) -> TriangleMesh {
        self.outline
            .mesh
            .transformed(&self.transform(options.effective_lift()))
    }
}

/// Export payload of a single mark.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkExport {
    /// Inset dot.
    Dot(DotExport),
    /// Inset text.
    Text(TextExport),
}

impl MarkExport {
    /// Payload for one annotation mark.
    pub fn from_mark(mark: &Mark) -> Self {
        match &mark.kind {
            MarkKind::Dot { radius, color } => MarkExport::Dot(DotExport {
                point: mark.point,
                normal: mark.normal,
                radius: *radius,
                color: color.clone(),
            }),
            MarkKind::Text { outline, color } => MarkExport::Text(TextExport {
                outline: Arc::clone(outline),
                point: mark.point,
                normal: mark.normal,
                tangent: mark.tangent,
                color: color.clone(),
            }),
        }
    }

    /// Color of the payload.
    pub fn color(&self) -> &str {
        match self {
            MarkExport::Dot(dot) => &dot.color,
            MarkExport::Text(text) => &text.color,
        }
    }

    /// Object name for a package.
    pub fn label(&self) -> &str {
        match self {
            MarkExport::Dot(_) => "dot",
            MarkExport::Text(text) => &text.outline.text,
        }
    }

    /// Inset solid of the payload.
    pub fn solid(&self, options: &ExportOptions) -> TriangleMesh {
        match self {
            MarkExport::Dot(dot) => dot.solid(options),
            MarkExport::Text(text) => text.solid(options),
        }
    }
}

/// Payloads for every mark currently in the set.
pub fn collect_exports(marks: &AnnotationSet) -> Vec<MarkExport> {
    marks.iter().map(|(_, mark)| MarkExport::from_mark(mark)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use facepaint_math::Vec3;
    use facepaint_mesh::primitives::make_box;

    fn text_mark(normal: Dir3, tangent: Dir3) -> TextExport {
        let outline = TextOutline::new(
            "AB",
            make_box(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 1.0, 0.5)),
            0.5,
        );
        TextExport {
            outline: Arc::new(outline),
            point: Point3::new(1.0, 2.0, 3.0),
            normal,
            tangent,
            color: "#ffe66d".into(),
        }
    }

    #[test]
    fn test_dot_cylinder_hangs_below_surface() {
        let dot = DotExport {
            point: Point3::new(0.0, 0.0, 10.0),
            normal: Vec3::z_axis(),
            radius: 1.5,
            color: "#ff5a5a".into(),
        };
        let solid = dot.solid(&ExportOptions::default());
        assert_eq!(solid.num_triangles(), 4 * DOT_SEGMENTS as usize);

        let b = solid.bounds().unwrap();
        assert_relative_eq!(b.max.z, 10.0, epsilon = 1e-9);
        assert_relative_eq!(b.min.z, 9.6, epsilon = 1e-9);
        assert_relative_eq!(b.center(), Point3::new(0.0, 0.0, 9.8), epsilon = 1e-9);
        assert!((b.max.x - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_dot_follows_tilted_normal() {
        let n = Dir3::new_normalize(Vec3::new(1.0, 1.0, 0.0));
        let dot = DotExport {
            point: Point3::new(5.0, 5.0, 0.0),
            normal: n,
            radius: 0.5,
            color: "#ff5a5a".into(),
        };
        let options = ExportOptions {
            inset_depth: 1.0,
            ..ExportOptions::default()
        };
        let solid = dot.solid(&options);
        let deepest = solid
            .triangles()
            .iter()
            .flat_map(|t| t.v.iter())
            .map(|p| (p - dot.point).dot(n.as_ref()))
            .fold(f64::INFINITY, f64::min);
        assert_relative_eq!(deepest, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_text_recessed_by_outline_depth() {
        let text = text_mark(Vec3::z_axis(), Vec3::x_axis());
        let solid = text.solid(&ExportOptions::default());
        let b = solid.bounds().unwrap();
        assert_relative_eq!(b.max.z, 3.0, epsilon = 1e-9);
        assert_relative_eq!(b.min.z, 2.5, epsilon = 1e-9);
        // Baseline runs along +X from the surface point
        assert_relative_eq!(b.min.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(b.max.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(b.min.y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(b.max.y, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_text_keeps_lift_on_request() {
        let text = text_mark(Vec3::z_axis(), Vec3::x_axis());
        let options = ExportOptions {
            keep_preview_lift: true,
            ..ExportOptions::default()
        };
        let b = text.solid(&options).bounds().unwrap();
        assert_relative_eq!(b.max.z, 3.06, epsilon = 1e-9);
        assert_relative_eq!(b.min.z, 2.56, epsilon = 1e-9);
    }

    #[test]
    fn test_text_on_side_face() {
        // Face looking along -Y, baseline along +X: text reads upright (+Z)
        let text = text_mark(-Vec3::y_axis(), Vec3::x_axis());
        let transform = text.transform(0.0);
        let up = transform.apply_vec(&Vec3::y());
        assert_relative_eq!(up, Vec3::z(), epsilon = 1e-9);
        let depth_dir = transform.apply_vec(&Vec3::z());
        assert_relative_eq!(depth_dir, -Vec3::y(), epsilon = 1e-9);
    }

    #[test]
    fn test_from_mark_keeps_payload() {
        let mark = Mark {
            point: Point3::new(0.0, 0.0, 1.0),
            normal: Vec3::z_axis(),
            tangent: Vec3::x_axis(),
            kind: MarkKind::Dot {
                radius: 2.0,
                color: "#4ecdc4".into(),
            },
        };
        let export = MarkExport::from_mark(&mark);
        assert_eq!(export.color(), "#4ecdc4");
        assert_eq!(export.label(), "dot");
        assert!(matches!(export, MarkExport::Dot(DotExport { radius, .. }) if radius == 2.0));
    }

    #[test]
    fn test_options_from_settings() {
        let settings = Settings {
            inset_depth: 0.8,
            text_lift: 0.1,
            ..Settings::default()
        };
        let options = ExportOptions::from_settings(&settings);
        assert_eq!(options.inset_depth, 0.8);
        assert_eq!(options.text_lift, 0.1);
        assert!(!options.keep_preview_lift);
        assert_eq!(options.dot_segments, DOT_SEGMENTS);
    }
}
