//! Core input data types.

use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::error::{SegmentError, SegmentResult};

/// One corner of a face in a `vertex/texture/normal` indexed face list.
///
/// All indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    /// Index into the vertex set.
    pub vertex: u32,
    /// Index into a texture coordinate set, carried but unused.
    pub texture: Option<u32>,
    /// Index into the normal set.
    pub normal: Option<u32>,
}

impl FaceCorner {
    /// Corner with a vertex and normal but no texture coordinate.
    #[inline]
    pub fn new(vertex: u32, normal: Option<u32>) -> Self {
        Self {
            vertex,
            texture: None,
            normal,
        }
    }
}

/// A vertex position together with its resolved normal, as seen by merge
/// predicates.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint<'a> {
    /// Vertex index.
    pub index: u32,
    /// Vertex position.
    pub position: &'a Point3<f64>,
    /// Vertex normal.
    pub normal: &'a Vector3<f64>,
}

/// Immutable segmentation input: vertex set, normal set, normal map and
/// face set.
///
/// Vertex indices are stable identifiers used by every other module. The
/// normal map is partial: a vertex without an entry never takes part in a
/// merge.
#[derive(Debug, Clone, Default)]
pub struct SegmentationInput {
    vertices: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    normal_map: Vec<Option<u32>>,
    faces: Vec<[u32; 3]>,
}

impl SegmentationInput {
    /// Create a validated input.
    ///
    /// `normal_map` must have one entry per vertex. Every present entry must
    /// resolve to a valid normal, every face index to a valid vertex, and all
    /// coordinates must be finite.
    pub fn new(
        vertices: Vec<Point3<f64>>,
        normals: Vec<Vector3<f64>>,
        normal_map: Vec<Option<u32>>,
        faces: Vec<[u32; 3]>,
    ) -> SegmentResult<Self> {
        let input = Self {
            vertices,
            normals,
            normal_map,
            faces,
        };
        input.validate()?;
        Ok(input)
    }

    /// Build an input from faces whose corners carry their own normal index.
    ///
    /// A vertex that appears in several corners takes the normal of the last
    /// corner that names one. Vertices never referenced by a corner with a
    /// normal stay without a normal.
    pub fn from_corners(
        vertices: Vec<Point3<f64>>,
        normals: Vec<Vector3<f64>>,
        corner_faces: &[[FaceCorner; 3]],
    ) -> SegmentResult<Self> {
        let vertex_count = vertices.len();
        let mut normal_map = vec![None; vertex_count];
        let mut faces = Vec::with_capacity(corner_faces.len());

        for (face_index, corners) in corner_faces.iter().enumerate() {
            for corner in corners {
                if corner.vertex as usize >= vertex_count {
                    return Err(SegmentError::invalid_vertex_index(
                        face_index,
                        corner.vertex,
                        vertex_count,
                    ));
                }
                if let Some(normal) = corner.normal {
                    normal_map[corner.vertex as usize] = Some(normal);
                }
            }
            faces.push([corners[0].vertex, corners[1].vertex, corners[2].vertex]);
        }

        debug!(
            "Assembled normal map from {} faces: {} of {} vertices have normals",
            faces.len(),
            normal_map.iter().filter(|n| n.is_some()).count(),
            vertex_count
        );

        Self::new(vertices, normals, normal_map, faces)
    }

    /// Build a face-less input where vertex `i` uses normal `i`.
    pub fn from_points_and_normals(
        points: Vec<Point3<f64>>,
        normals: Vec<Vector3<f64>>,
    ) -> SegmentResult<Self> {
        let normal_map = (0..points.len() as u32).map(Some).collect();
        Self::new(points, normals, normal_map, Vec::new())
    }

    /// Check index and coordinate invariants.
    pub fn validate(&self) -> SegmentResult<()> {
        if self.normal_map.len() != self.vertices.len() {
            return Err(SegmentError::NormalMapMismatch {
                map_len: self.normal_map.len(),
                vertex_count: self.vertices.len(),
            });
        }

        for (i, v) in self.vertices.iter().enumerate() {
            for (name, value) in [("x", v.x), ("y", v.y), ("z", v.z)] {
                if !value.is_finite() {
                    return Err(SegmentError::InvalidCoordinate {
                        vertex_index: i,
                        coordinate: name,
                        value,
                    });
                }
            }
        }

        for (i, n) in self.normals.iter().enumerate() {
            for (name, value) in [("x", n.x), ("y", n.y), ("z", n.z)] {
                if !value.is_finite() {
                    return Err(SegmentError::InvalidNormal {
                        normal_index: i,
                        coordinate: name,
                        value,
                    });
                }
            }
        }

        for (i, entry) in self.normal_map.iter().enumerate() {
            match *entry {
                Some(n) if n as usize >= self.normals.len() => {
                    return Err(SegmentError::invalid_normal_index(i, n, self.normals.len()));
                }
                _ => {}
            }
        }

        let vertex_count = self.vertices.len();
        for (face_index, face) in self.faces.iter().enumerate() {
            for &v in face {
                if v as usize >= vertex_count {
                    return Err(SegmentError::invalid_vertex_index(face_index, v, vertex_count));
                }
            }
        }

        Ok(())
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of normals in the normal set.
    #[inline]
    pub fn normal_count(&self) -> usize {
        self.normals.len()
    }

    /// Number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the vertex set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex positions.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// The normal set.
    #[inline]
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    /// Per-vertex normal index, `None` where the vertex has no normal.
    #[inline]
    pub fn normal_map(&self) -> &[Option<u32>] {
        &self.normal_map
    }

    /// Triangles as vertex indices.
    #[inline]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Resolved normal of a vertex.
    #[inline]
    pub fn normal_of(&self, vertex: u32) -> Option<&Vector3<f64>> {
        self.normal_map
            .get(vertex as usize)
            .copied()
            .flatten()
            .map(|n| &self.normals[n as usize])
    }

    /// Whether a vertex has a normal map entry.
    #[inline]
    pub fn has_normal(&self, vertex: u32) -> bool {
        self.normal_of(vertex).is_some()
    }

    /// Number of vertices that have a normal.
    pub fn vertices_with_normals(&self) -> usize {
        self.normal_map.iter().filter(|n| n.is_some()).count()
    }

    /// Position and normal of a vertex, when it has a normal.
    #[inline]
    pub fn surface_point(&self, vertex: u32) -> Option<SurfacePoint<'_>> {
        self.normal_of(vertex).map(|normal| SurfacePoint {
            index: vertex,
            position: &self.vertices[vertex as usize],
            normal,
        })
    }

    /// Axis-aligned bounding box, or `None` when empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.vertices[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }
}
