//! mesh-segment info command - display input statistics.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use mesh_segment::EdgeSet;
use serde::Serialize;

use crate::{Cli, OutputFormat, input, output};

#[derive(Serialize)]
struct InputInfo {
    path: String,
    vertices: usize,
    normals: usize,
    faces: usize,
    edges: usize,
    vertices_with_normals: usize,
    vertices_without_normals: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
}

#[derive(Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
    dimensions: [f64; 3],
}

pub fn run(path: &Path, cli: &Cli) -> Result<()> {
    let input = input::load(path)?;

    let bounds = input.bounds().map(|(min, max)| {
        let dims = max - min;
        BoundsInfo {
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
            dimensions: [dims.x, dims.y, dims.z],
        }
    });

    let with_normals = input.vertices_with_normals();
    let info = InputInfo {
        path: path.display().to_string(),
        vertices: input.vertex_count(),
        normals: input.normal_count(),
        faces: input.face_count(),
        edges: EdgeSet::from_faces(input.faces()).len(),
        vertices_with_normals: with_normals,
        vertices_without_normals: input.vertex_count() - with_normals,
        bounds,
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Input Information".bold().underline());
                println!("  {}: {}", "File".cyan(), path.display());
                println!("  {}: {}", "Vertices".cyan(), info.vertices);
                println!("  {}: {}", "Normals".cyan(), info.normals);
                println!("  {}: {}", "Faces".cyan(), info.faces);
                println!("  {}: {}", "Edges".cyan(), info.edges);

                if let Some(ref b) = info.bounds {
                    println!(
                        "  {}: {:.3} x {:.3} x {:.3}",
                        "Dimensions".cyan(),
                        b.dimensions[0],
                        b.dimensions[1],
                        b.dimensions[2]
                    );
                }

                if info.vertices_without_normals > 0 {
                    println!(
                        "  {}: {} vertices have no normal and will stay unmerged",
                        "Warning".yellow(),
                        info.vertices_without_normals
                    );
                } else {
                    println!("  {}: all vertices", "Normals assigned".cyan());
                }
            }
        }
    }

    Ok(())
}
