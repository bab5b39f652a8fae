//! facepaint CLI - annotate and realign STL parts
//!
//! Loaded meshes are recentered on their bounding-box center, so every
//! coordinate given on the command line or in a script is relative to it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use facepaint_core::{detect_largest_flat_region, PlaneFrame, ReferenceKind, Session, Settings};
use facepaint_export::{ExportOptions, ThreeMfWriter};
use facepaint_math::{Point3, Vec3};
use facepaint_mesh::stl::{read_stl, write_binary_stl};
use facepaint_mesh::TriangleMesh;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

mod script;

use script::{replay, Script};

#[derive(Parser)]
#[command(name = "facepaint")]
#[command(about = "Inset dot and text annotations on STL parts", long_about = None)]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display triangle count and bounds of an STL file
    Info {
        /// Input STL file
        file: PathBuf,
    },
    /// Print the largest flat region and its drawing frame as JSON
    Detect {
        /// Input STL file
        file: PathBuf,
    },
    /// Replay an annotation script and write a 3MF package
    Annotate {
        /// Input STL file
        file: PathBuf,
        /// JSON annotation script
        #[arg(short, long)]
        script: PathBuf,
        /// Output .3mf file
        #[arg(short, long)]
        output: PathBuf,
        /// Keep the preview lift on exported text
        #[arg(long)]
        keep_preview_lift: bool,
    },
    /// Stand a part on its bottom face with its front face toward +Z
    Align {
        /// Input STL file
        file: PathBuf,
        /// Three bottom-face points: "x,y,z;x,y,z;x,y,z"
        #[arg(long)]
        bottom: String,
        /// Three front-face points: "x,y,z;x,y,z;x,y,z"
        #[arg(long)]
        front: String,
        /// Output .stl file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref())?;

    match cli.command {
        Commands::Info { file } => show_info(&file)?,
        Commands::Detect { file } => detect(&file, &settings)?,
        Commands::Annotate {
            file,
            script,
            output,
            keep_preview_lift,
        } => annotate(&file, &script, &output, settings, keep_preview_lift)?,
        Commands::Align {
            file,
            bottom,
            front,
            output,
        } => align(&file, &bottom, &front, &output, settings)?,
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings {}", path.display()))?;
    Settings::from_toml_str(&text).with_context(|| format!("invalid settings {}", path.display()))
}

fn load_mesh(path: &Path) -> Result<TriangleMesh> {
    let mesh = read_stl(path).with_context(|| format!("failed to load {}", path.display()))?;
    if mesh.is_empty() {
        bail!("{} contains no triangles", path.display());
    }
    info!(triangles = mesh.num_triangles(), "loaded mesh");
    Ok(mesh.centered())
}

fn show_info(file: &Path) -> Result<()> {
    let mesh = read_stl(file).with_context(|| format!("failed to load {}", file.display()))?;

    println!("STL: {}", file.display());
    println!("  Triangles: {}", mesh.num_triangles());
    match mesh.bounds() {
        Some(b) => {
            let size = b.size();
            println!("  Min: ({:.3}, {:.3}, {:.3})", b.min.x, b.min.y, b.min.z);
            println!("  Max: ({:.3}, {:.3}, {:.3})", b.max.x, b.max.y, b.max.z);
            println!("  Size: {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);
            let c = b.center();
            println!("  Center: ({:.3}, {:.3}, {:.3})", c.x, c.y, c.z);
        }
        None => println!("  (empty)"),
    }
    Ok(())
}

#[derive(Serialize)]
struct DetectReport {
    area: f64,
    frame: PlaneFrame,
}

fn detect(file: &Path, settings: &Settings) -> Result<()> {
    let mesh = load_mesh(file)?;
    let region = detect_largest_flat_region(&mesh, &settings.detector)
        .context("no flat region found")?;
    let half_extent =
        facepaint_core::resolve_half_extent(mesh.max_dimension(), settings.requested_plane_size);
    let frame = PlaneFrame::from_region(&region, &mesh.bounding_center(), half_extent);

    let report = DetectReport {
        area: region.area,
        frame,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn annotate(
    file: &Path,
    script_path: &Path,
    output: &Path,
    settings: Settings,
    keep_preview_lift: bool,
) -> Result<()> {
    let mesh = load_mesh(file)?;
    let text = std::fs::read_to_string(script_path)
        .with_context(|| format!("failed to read script {}", script_path.display()))?;
    let script = Script::from_json(&text)?;

    let options = ExportOptions {
        keep_preview_lift,
        ..ExportOptions::from_settings(&settings)
    };
    let mut session = Session::new(mesh, settings)?;
    let summary = replay(&mut session, &script)?;

    let name = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("part");
    let mut writer = ThreeMfWriter::new(name, session.mesh().clone())?;
    writer.add_marks(session.marks(), &options)?;
    writer
        .write_file(output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "Placed {} marks in {} strokes (plane half-extent {:.1} mm)",
        summary.marks, summary.strokes, summary.frame.half_extent
    );
    println!("Exported 3MF to {}", output.display());
    Ok(())
}

fn align(file: &Path, bottom: &str, front: &str, output: &Path, settings: Settings) -> Result<()> {
    let mesh = load_mesh(file)?;
    let bottom = parse_points(bottom).context("invalid --bottom")?;
    let front = parse_points(front).context("invalid --front")?;

    let mut session = Session::new(mesh, settings)?;
    session
        .set_reference(ReferenceKind::Bottom, &bottom[0], &bottom[1], &bottom[2])
        .context("bottom reference points are degenerate")?;
    let rotation = session
        .set_reference(ReferenceKind::Front, &front[0], &front[1], &front[2])
        .context("front reference rejected (degenerate, or parallel to the bottom)")?;
    let Some(rotation) = rotation else {
        bail!("alignment needs both references");
    };

    let name = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("part");
    let bytes = write_binary_stl(session.mesh(), name)?;
    std::fs::write(output, bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let (axis, angle) = match rotation.axis_angle() {
        Some((axis, angle)) => (axis.into_inner(), angle),
        None => (Vec3::z(), 0.0),
    };
    println!(
        "Rotated {:.2} deg about ({:.3}, {:.3}, {:.3})",
        angle.to_degrees(),
        axis.x,
        axis.y,
        axis.z
    );
    println!("Exported STL to {}", output.display());
    Ok(())
}

/// Parse `"x,y,z;x,y,z;x,y,z"` into three points.
fn parse_points(text: &str) -> Result<[Point3; 3]> {
    let points = text
        .split(';')
        .map(|triple| -> Result<Point3> {
            let coords = triple
                .split(',')
                .map(|c| c.trim().parse::<f64>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .with_context(|| format!("bad coordinate in {:?}", triple))?;
            match coords.as_slice() {
                &[x, y, z] => Ok(Point3::new(x, y, z)),
                _ => bail!("expected x,y,z, got {:?}", triple),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    match points.as_slice() {
        &[a, b, c] => Ok([a, b, c]),
        _ => bail!("expected three points, got {}", points.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_points() {
        let [a, b, c] = parse_points("0,0,-10; 5,0,-10;0, 5 ,-10").unwrap();
        assert_eq!(a, Point3::new(0.0, 0.0, -10.0));
        assert_eq!(b, Point3::new(5.0, 0.0, -10.0));
        assert_eq!(c, Point3::new(0.0, 5.0, -10.0));
    }

    #[test]
    fn test_parse_points_rejects_bad_input() {
        assert!(parse_points("0,0,0;1,1,1").is_err());
        assert!(parse_points("0,0;1,1,1;2,2,2").is_err());
        assert!(parse_points("0,0,x;1,1,1;2,2,2").is_err());
    }

    #[test]
    fn test_cli_parses_annotate() {
        let cli = Cli::try_parse_from([
            "facepaint",
            "annotate",
            "part.stl",
            "--script",
            "marks.json",
            "-o",
            "part.3mf",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Annotate { keep_preview_lift: false, .. }
        ));
        assert!(cli.settings.is_none());
    }
}
