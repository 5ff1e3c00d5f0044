//! JSON input documents.
//!
//! ```json
//! {
//!   "vertices": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//!   "normals": [[0.0, 0.0, 1.0]],
//!   "faces": [[{"vertex": 0, "normal": 0}, {"vertex": 1, "normal": 0}, {"vertex": 2, "normal": 0}]]
//! }
//! ```
//!
//! Per-vertex normals come from the face corners, the last corner naming a
//! vertex winning. A document may instead give `normal_map` (one normal
//! index or `null` per vertex), in which case faces are still accepted but
//! their corner normals are ignored.

use std::path::Path;

use anyhow::{Context, Result};
use mesh_segment::{FaceCorner, SegmentationInput};
use nalgebra::{Point3, Vector3};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct InputDocument {
    vertices: Vec<[f64; 3]>,
    #[serde(default)]
    normals: Vec<[f64; 3]>,
    #[serde(default)]
    faces: Vec<[CornerDocument; 3]>,
    #[serde(default)]
    normal_map: Option<Vec<Option<u32>>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct CornerDocument {
    vertex: u32,
    #[serde(default)]
    texture: Option<u32>,
    #[serde(default)]
    normal: Option<u32>,
}

impl From<CornerDocument> for FaceCorner {
    fn from(c: CornerDocument) -> Self {
        FaceCorner {
            vertex: c.vertex,
            texture: c.texture,
            normal: c.normal,
        }
    }
}

/// Load and validate an input document.
pub fn load(path: &Path) -> Result<SegmentationInput> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input from {:?}", path))?;
    parse(&contents).with_context(|| format!("Invalid input document {:?}", path))
}

fn parse(contents: &str) -> Result<SegmentationInput> {
    let doc: InputDocument = serde_json::from_str(contents).context("Malformed JSON")?;

    let vertices: Vec<Point3<f64>> = doc
        .vertices
        .iter()
        .map(|&[x, y, z]| Point3::new(x, y, z))
        .collect();
    let normals: Vec<Vector3<f64>> = doc
        .normals
        .iter()
        .map(|&[x, y, z]| Vector3::new(x, y, z))
        .collect();

    let input = match doc.normal_map {
        Some(normal_map) => {
            let faces = doc
                .faces
                .iter()
                .map(|f| [f[0].vertex, f[1].vertex, f[2].vertex])
                .collect();
            SegmentationInput::new(vertices, normals, normal_map, faces)?
        }
        None => {
            let faces: Vec<[FaceCorner; 3]> = doc
                .faces
                .iter()
                .map(|f| [f[0].into(), f[1].into(), f[2].into()])
                .collect();
            SegmentationInput::from_corners(vertices, normals, &faces)?
        }
    };
    Ok(input)
}
