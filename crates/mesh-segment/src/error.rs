//! Error types for segmentation with rich diagnostics.
//!
//! This module provides error handling with:
//! - Machine-readable error codes for programmatic handling
//! - Context about which vertex, face, or parameter was rejected
//! - Recovery suggestions for common issues
//! - Terminal display via miette
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `SEG-XXXX`:
//! - `SEG-2xxx`: Input validation errors (indices, coordinates)
//! - `SEG-3xxx`: Parameter validation errors (radius range, tolerances)
//!
//! Index errors inside [`DisjointSet`](crate::union_find::DisjointSet) are
//! programming errors and panic instead of producing a `SegmentError`.
//!
//! # Example
//!
//! ```
//! use mesh_segment::{ErrorCode, SegmentError};
//!
//! let err = SegmentError::invalid_radius_range(2.0, 1.0);
//! assert_eq!(err.code(), ErrorCode::InvalidRadiusRange);
//! assert_eq!(err.code().as_str(), "SEG-3001");
//! ```

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for segmentation operations.
pub type SegmentResult<T> = Result<T, SegmentError>;

/// Machine-readable error codes.
///
/// Codes follow the pattern `SEG-XXXX` where:
/// - 2xxx = Input validation errors
/// - 3xxx = Parameter validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input validation errors (2xxx)
    /// SEG-2001: Face references invalid vertex index
    InvalidVertexIndex = 2001,
    /// SEG-2002: Normal map references invalid normal index
    InvalidNormalIndex = 2002,
    /// SEG-2003: Vertex has NaN or Infinity coordinate
    InvalidCoordinate = 2003,
    /// SEG-2004: Normal has NaN or Infinity component
    InvalidNormal = 2004,
    /// SEG-2005: Normal map length differs from vertex count
    NormalMapMismatch = 2005,

    // Parameter errors (3xxx)
    /// SEG-3001: Radius range is empty or non-finite
    InvalidRadiusRange = 3001,
    /// SEG-3002: Radius step is not positive or yields too many radii
    InvalidRadiusStep = 3002,
    /// SEG-3003: Angle tolerance is negative or non-finite
    InvalidTolerance = 3003,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `SEG-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidVertexIndex => "SEG-2001",
            ErrorCode::InvalidNormalIndex => "SEG-2002",
            ErrorCode::InvalidCoordinate => "SEG-2003",
            ErrorCode::InvalidNormal => "SEG-2004",
            ErrorCode::NormalMapMismatch => "SEG-2005",
            ErrorCode::InvalidRadiusRange => "SEG-3001",
            ErrorCode::InvalidRadiusStep => "SEG-3002",
            ErrorCode::InvalidTolerance => "SEG-3003",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for segmentation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Re-export the source mesh with different settings.
    ReexportMesh { hint: String },
    /// Check the input data for specific problems.
    CheckInput { checks: Vec<String> },
    /// Adjust parameters for the operation.
    AdjustParameters { parameters: Vec<(String, String)> },
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::ReexportMesh { hint } => {
                write!(f, "Try re-exporting the mesh: {}", hint)
            }
            RecoverySuggestion::CheckInput { checks } => {
                write!(f, "Check the input for: {}", checks.join(", "))
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
        }
    }
}

/// Where in the input an error was detected.
#[derive(Debug, Clone, PartialEq)]
pub enum InputLocation {
    /// A specific vertex.
    Vertex { index: usize },
    /// A specific face.
    Face { index: usize },
    /// A specific normal in the Normal Set.
    Normal { index: usize },
    /// A configuration parameter.
    Parameter { name: &'static str },
}

impl std::fmt::Display for InputLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputLocation::Vertex { index } => write!(f, "vertex {}", index),
            InputLocation::Face { index } => write!(f, "face {}", index),
            InputLocation::Normal { index } => write!(f, "normal {}", index),
            InputLocation::Parameter { name } => write!(f, "parameter `{}`", name),
        }
    }
}

/// Errors that can occur while validating segmentation input or parameters.
#[derive(Debug, Error, Diagnostic)]
pub enum SegmentError {
    /// A face corner references a vertex that does not exist.
    #[error(
        "invalid vertex index: face {face_index} references vertex {vertex_index}, but the input only has {vertex_count} vertices"
    )]
    #[diagnostic(
        code(segment::input::vertex_index),
        help("Check the mesh export settings; face indices must refer to loaded vertices.")
    )]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    /// The normal map references a normal that does not exist.
    #[error(
        "invalid normal index: vertex {vertex_index} maps to normal {normal_index}, but the input only has {normal_count} normals"
    )]
    #[diagnostic(
        code(segment::input::normal_index),
        help("Make sure the mesh was exported with vertex normals.")
    )]
    InvalidNormalIndex {
        vertex_index: usize,
        normal_index: u32,
        normal_count: usize,
    },

    /// A vertex coordinate is NaN or infinite.
    #[error("invalid coordinate at vertex {vertex_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(segment::input::coordinate),
        help("Check for numerical issues in the source data.")
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// A normal component is NaN or infinite.
    #[error("invalid normal {normal_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(segment::input::normal),
        help("Recompute vertex normals before exporting the mesh.")
    )]
    InvalidNormal {
        normal_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// The per-vertex normal map does not cover the vertex set.
    #[error("normal map has {map_len} entries but the input has {vertex_count} vertices")]
    #[diagnostic(
        code(segment::input::normal_map),
        help("Provide exactly one (possibly empty) normal entry per vertex.")
    )]
    NormalMapMismatch { map_len: usize, vertex_count: usize },

    /// Radius range is empty or not finite.
    #[error("invalid radius range: eps_min = {eps_min}, eps_max = {eps_max}")]
    #[diagnostic(
        code(segment::params::radius_range),
        help("eps_min and eps_max must be finite, non-negative, and eps_min <= eps_max.")
    )]
    InvalidRadiusRange { eps_min: f64, eps_max: f64 },

    /// Radius step is zero, negative, not finite, or yields too many radii.
    #[error("invalid radius step: {step}")]
    #[diagnostic(
        code(segment::params::radius_step),
        help("The radius step must be finite, greater than zero, and large enough for at most one million radii.")
    )]
    InvalidRadiusStep { step: f64 },

    /// Angle tolerance is negative or not finite.
    #[error("invalid angle tolerance at position {position}: {value}")]
    #[diagnostic(
        code(segment::params::tolerance),
        help("Angle tolerances are in radians and must be finite and non-negative.")
    )]
    InvalidTolerance { position: usize, value: f64 },
}

impl SegmentError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SegmentError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            SegmentError::InvalidNormalIndex { .. } => ErrorCode::InvalidNormalIndex,
            SegmentError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            SegmentError::InvalidNormal { .. } => ErrorCode::InvalidNormal,
            SegmentError::NormalMapMismatch { .. } => ErrorCode::NormalMapMismatch,
            SegmentError::InvalidRadiusRange { .. } => ErrorCode::InvalidRadiusRange,
            SegmentError::InvalidRadiusStep { .. } => ErrorCode::InvalidRadiusStep,
            SegmentError::InvalidTolerance { .. } => ErrorCode::InvalidTolerance,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            SegmentError::InvalidVertexIndex { .. } => RecoverySuggestion::ReexportMesh {
                hint: "triangulate and keep all referenced vertices".into(),
            },
            SegmentError::InvalidNormalIndex { .. } => RecoverySuggestion::ReexportMesh {
                hint: "enable normal export".into(),
            },
            SegmentError::InvalidCoordinate { .. } | SegmentError::InvalidNormal { .. } => {
                RecoverySuggestion::CheckInput {
                    checks: vec!["NaN values".into(), "export precision".into()],
                }
            }
            SegmentError::NormalMapMismatch { .. } => RecoverySuggestion::CheckInput {
                checks: vec!["normal map length".into()],
            },
            SegmentError::InvalidRadiusRange { .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![
                    ("eps_min".into(), "a value <= eps_max".into()),
                    ("eps_max".into(), "a value >= eps_min".into()),
                ],
            },
            SegmentError::InvalidRadiusStep { .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![("eps_step".into(), "a positive value such as 0.1".into())],
            },
            SegmentError::InvalidTolerance { .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![("theta_max".into(), "a value in [0, pi]".into())],
            },
        }
    }

    /// Returns location information if available.
    pub fn location(&self) -> Option<InputLocation> {
        match self {
            SegmentError::InvalidVertexIndex { face_index, .. } => {
                Some(InputLocation::Face { index: *face_index })
            }
            SegmentError::InvalidNormalIndex { vertex_index, .. }
            | SegmentError::InvalidCoordinate { vertex_index, .. } => Some(InputLocation::Vertex {
                index: *vertex_index,
            }),
            SegmentError::InvalidNormal { normal_index, .. } => Some(InputLocation::Normal {
                index: *normal_index,
            }),
            SegmentError::NormalMapMismatch { .. } => None,
            SegmentError::InvalidRadiusRange { .. } => {
                Some(InputLocation::Parameter { name: "eps_min" })
            }
            SegmentError::InvalidRadiusStep { .. } => {
                Some(InputLocation::Parameter { name: "eps_step" })
            }
            SegmentError::InvalidTolerance { .. } => {
                Some(InputLocation::Parameter { name: "theta_max" })
            }
        }
    }

    // Constructor helpers for common error patterns

    /// Create an InvalidVertexIndex error.
    pub fn invalid_vertex_index(face_index: usize, vertex_index: u32, vertex_count: usize) -> Self {
        SegmentError::InvalidVertexIndex {
            face_index,
            vertex_index,
            vertex_count,
        }
    }

    /// Create an InvalidNormalIndex error.
    pub fn invalid_normal_index(vertex_index: usize, normal_index: u32, normal_count: usize) -> Self {
        SegmentError::InvalidNormalIndex {
            vertex_index,
            normal_index,
            normal_count,
        }
    }

    /// Create an InvalidRadiusRange error.
    pub fn invalid_radius_range(eps_min: f64, eps_max: f64) -> Self {
        SegmentError::InvalidRadiusRange { eps_min, eps_max }
    }

    /// Create an InvalidRadiusStep error.
    pub fn invalid_radius_step(step: f64) -> Self {
        SegmentError::InvalidRadiusStep { step }
    }

    /// Create an InvalidTolerance error.
    pub fn invalid_tolerance(position: usize, value: f64) -> Self {
        SegmentError::InvalidTolerance { position, value }
    }
}
