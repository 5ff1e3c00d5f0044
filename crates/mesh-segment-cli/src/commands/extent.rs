//! mesh-segment extent command - report pairwise distance extent.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use mesh_segment::SpatialIndex;
use serde::Serialize;

use crate::{Cli, OutputFormat, input, output};

#[derive(Serialize)]
struct ExtentInfo {
    path: String,
    vertices: usize,
    /// `null` when fewer than two distinct positions exist.
    min_distance: Option<f64>,
    max_distance: Option<f64>,
}

pub fn run(path: &Path, cli: &Cli) -> Result<()> {
    let input = input::load(path)?;

    output::info(
        &format!("Measuring {} vertices...", input.vertex_count()),
        cli.format,
        cli.quiet,
    );
    let extent = SpatialIndex::build(input.vertices()).distance_extent();

    let info = ExtentInfo {
        path: path.display().to_string(),
        vertices: input.vertex_count(),
        min_distance: extent.map(|e| e.min),
        max_distance: extent.map(|e| e.max),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Distance Extent".bold().underline());
                println!("  {}: {}", "File".cyan(), path.display());
                match extent {
                    Some(e) => {
                        println!("  {}: {:.6}", "Min distance".cyan(), e.min);
                        println!("  {}: {:.6}", "Max distance".cyan(), e.max);
                    }
                    None => println!(
                        "  {}: fewer than two distinct vertex positions",
                        "Extent".yellow()
                    ),
                }
            }
        }
    }

    Ok(())
}
