//! 3MF package generation for annotated parts.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;

use facepaint_core::{parse_hex_color, AnnotationSet};
use facepaint_mesh::TriangleMesh;
use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{ExportError, Result};
use crate::solid::{collect_exports, ExportOptions};

/// Display color of the base part.
pub const BASE_COLOR: &str = "#9d9d9d";

/// One mesh object in the package.
#[derive(Debug, Clone)]
pub struct ThreeMfObject {
    /// Object name.
    pub name: String,
    /// Geometry in world coordinates.
    pub mesh: TriangleMesh,
    /// Display color as RGB.
    pub color: [u8; 3],
}

/// 3MF package: the base part plus one object per mark.
#[derive(Debug, Clone)]
pub struct ThreeMfWriter {
    /// Model name.
    pub name: String,
    objects: Vec<ThreeMfObject>,
}

impl ThreeMfWriter {
    /// Start a package around the base part.
    pub fn new(name: impl Into<String>, base: TriangleMesh) -> Result<Self> {
        if base.is_empty() {
            return Err(ExportError::EmptyMesh);
        }
        let name = name.into();
        let mut writer = Self {
            name: name.clone(),
            objects: Vec::new(),
        };
        writer.add_object(name, base, BASE_COLOR)?;
        Ok(writer)
    }

    /// Add a mesh object with a `#rrggbb` color. Empty meshes are skipped.
    pub fn add_object(
        &mut self,
        name: impl Into<String>,
        mesh: TriangleMesh,
        color: &str,
    ) -> Result<()> {
        let color = parse_hex_color(color).ok_or_else(|| ExportError::InvalidColor(color.into()))?;
        if mesh.is_empty() {
            return Ok(());
        }
        self.objects.push(ThreeMfObject {
            name: name.into(),
            mesh,
            color,
        });
        Ok(())
    }

    /// Add the inset solid of every mark in the set; returns how many were added.
    #[instrument(skip_all, fields(marks = marks.len()))]
    pub fn add_marks(&mut self, marks: &AnnotationSet, options: &ExportOptions) -> Result<usize> {
        let before = self.objects.len();
        for (i, export) in collect_exports(marks).iter().enumerate() {
            let name = format!("{} {}", export.label(), i + 1);
            self.add_object(name, export.solid(options), export.color())?;
        }
        let added = self.objects.len() - before;
        debug!(added, "added mark solids");
        Ok(added)
    }

    /// Objects in package order; the base part is first.
    pub fn objects(&self) -> &[ThreeMfObject] {
        &self.objects
    }

    /// Generate the 3MF file as bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(6));

        let entries = [
            ("[Content_Types].xml", content_types_xml()),
            ("_rels/.rels", rels_xml()),
            ("3D/3dmodel.model", self.model_xml()),
        ];
        for (path, body) in &entries {
            zip.start_file(*path, options)
                .map_err(|e| ExportError::ThreeMf(e.to_string()))?;
            zip.write_all(body.as_bytes())?;
        }

        zip.finish()
            .map_err(|e| ExportError::ThreeMf(e.to_string()))?;

        Ok(buffer.into_inner())
    }

    /// Write the package to `path`.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    fn model_xml(&self) -> String {
        let mut materials_xml = String::new();
        for object in &self.objects {
            let [r, g, b] = object.color;
            materials_xml.push_str(&format!(
                "            <base name=\"{}\" displaycolor=\"#{:02X}{:02X}{:02X}FF\"/>\n",
                escape_xml(&object.name),
                r,
                g,
                b
            ));
        }

        let mut objects_xml = String::new();
        let mut items_xml = String::new();
        for (index, object) in self.objects.iter().enumerate() {
            // Id 1 is the material group
            let id = index + 2;
            objects_xml.push_str(&format!(
                "        <object id=\"{}\" name=\"{}\" type=\"model\" pid=\"1\" pindex=\"{}\">\n            <mesh>\n{}            </mesh>\n        </object>\n",
                id,
                escape_xml(&object.name),
                index,
                mesh_xml(&object.mesh)
            ));
            items_xml.push_str(&format!(
                "        <item objectid=\"{}\" transform=\"1 0 0 0 1 0 0 0 1 0 0 0\" p:UUID=\"{}\"/>\n",
                id,
                uuid::Uuid::new_v4()
            ));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xml:lang="en-US" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02" xmlns:p="http://schemas.microsoft.com/3dmanufacturing/production/2015/06">
    <metadata name="Application">facepaint</metadata>
    <metadata name="Title">{}</metadata>
    <resources>
        <basematerials id="1">
{materials_xml}        </basematerials>
{objects_xml}    </resources>
    <build p:UUID="{}">
{items_xml}    </build>
</model>"#,
            escape_xml(&self.name),
            uuid::Uuid::new_v4()
        )
    }
}

/// Annotate `base` with every mark and package the result.
#[instrument(skip_all, fields(triangles = base.num_triangles(), marks = marks.len()))]
pub fn export_3mf(
    name: &str,
    base: &TriangleMesh,
    marks: &AnnotationSet,
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    let mut writer = ThreeMfWriter::new(name, base.clone())?;
    writer.add_marks(marks, options)?;
    writer.to_bytes()
}

fn content_types_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#
        .to_string()
}

fn rels_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Target="/3D/3dmodel.model" Id="rel-1" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"#
        .to_string()
}

/// `<vertices>`/`<triangles>` body with coincident corners welded.
fn mesh_xml(mesh: &TriangleMesh) -> String {
    let (positions, indices) = mesh.to_indexed();

    let mut welded: HashMap<[u32; 3], u32> = HashMap::new();
    let mut vertices_xml = String::new();
    let mut remap = Vec::with_capacity(positions.len() / 3);
    for p in positions.chunks_exact(3) {
        let key = [p[0].to_bits(), p[1].to_bits(), p[2].to_bits()];
        let next = welded.len() as u32;
        let index = *welded.entry(key).or_insert_with(|| {
            vertices_xml.push_str(&format!(
                "                    <vertex x=\"{:.6}\" y=\"{:.6}\" z=\"{:.6}\"/>\n",
                p[0], p[1], p[2]
            ));
            next
        });
        remap.push(index);
    }

    let mut triangles_xml = String::new();
    for tri in indices.chunks_exact(3) {
        let (v1, v2, v3) = (
            remap[tri[0] as usize],
            remap[tri[1] as usize],
            remap[tri[2] as usize],
        );
        // Welding can collapse slivers
        if v1 == v2 || v2 == v3 || v1 == v3 {
            continue;
        }
        triangles_xml.push_str(&format!(
            "                    <triangle v1=\"{}\" v2=\"{}\" v3=\"{}\"/>\n",
            v1, v2, v3
        ));
    }

    format!(
        "                <vertices>\n{}                </vertices>\n                <triangles>\n{}                </triangles>\n",
        vertices_xml, triangles_xml
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
