//! Region-growing segmentation of surface meshes.
//!
//! This crate partitions mesh vertices into regions by sweeping a spatial
//! radius and merging only vertices whose normals agree. It is built from a
//! weighted union-find, a k-d tree over vertex positions, and a pluggable
//! compatibility predicate.
//!
//! # Features
//!
//! - **Region growth**: single-linkage clustering over an increasing radius,
//!   gated by the angle between normals
//! - **Death times**: per-vertex radius at which it was absorbed into a region
//! - **Tolerance sweeps**: one independent segmentation per angle tolerance,
//!   run in parallel
//! - **Custom predicates**: any [`MergeCompatibility`] implementation or
//!   closure can replace the normal-angle test
//! - **Configuration**: TOML/JSON sweep files (feature `config`, on by default)
//!
//! # Units
//!
//! Radii are in the units of the vertex coordinates. Angle tolerances are in
//! radians. The reference configuration sweeps the radius from 0.001 to 20 in
//! steps of 0.1, which suits meshes measured in millimeters at roughly
//! hand-held object scale. Use [`SpatialIndex::distance_extent`] to pick a
//! range for other data.
//!
//! # Quick Start
//!
//! ```
//! use mesh_segment::{FaceCorner, SegmentationInput, SweepConfig, run_sweep};
//! use nalgebra::{Point3, Vector3};
//! use std::f64::consts::PI;
//!
//! // Two triangles sharing an edge, folded at a right angle
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(1.0, 0.0, 1.0),
//! ];
//! let normals = vec![Vector3::z(), Vector3::y()];
//! let faces = [
//!     [FaceCorner::new(0, Some(0)), FaceCorner::new(1, Some(0)), FaceCorner::new(2, Some(0))],
//!     [FaceCorner::new(0, Some(1)), FaceCorner::new(3, Some(1)), FaceCorner::new(1, Some(1))],
//! ];
//! let input = SegmentationInput::from_corners(vertices, normals, &faces).unwrap();
//!
//! let config = SweepConfig::new(0.5, 2.0, 0.5, vec![PI / 4.0]);
//! let outcomes = run_sweep(&input, &config).unwrap();
//!
//! for outcome in &outcomes {
//!     println!("theta {:.3}: {}", outcome.theta_max, outcome.summary());
//! }
//! ```
//!
//! # Single Growth Run
//!
//! ```
//! use mesh_segment::{GrowthParams, MergeScope, NormalAngle, SegmentationInput, grow_regions};
//! use nalgebra::{Point3, Vector3};
//!
//! let input = SegmentationInput::from_points_and_normals(
//!     vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)],
//!     vec![Vector3::z(), Vector3::z()],
//! )
//! .unwrap();
//!
//! let params = GrowthParams::with_range(0.5, 2.0, 0.5).scope(MergeScope::Closed);
//! let outcome = grow_regions(&input, &params, &NormalAngle::pi_over(4.0)).unwrap();
//!
//! assert_eq!(outcome.death_time(1), Some(1.0));
//! assert_eq!(outcome.summary().region_count, 1);
//! ```
//!
//! # Error Handling
//!
//! Construction and parameter checks return `SegmentResult<T>`, which is
//! `Result<T, SegmentError>`. Every error carries a code and a recovery
//! suggestion.
//!
//! ```
//! use mesh_segment::{GrowthParams, SegmentError};
//!
//! match GrowthParams::with_range(2.0, 1.0, 0.1).schedule() {
//!     Ok(schedule) => println!("{} steps", schedule.len()),
//!     Err(SegmentError::InvalidRadiusRange { eps_min, eps_max }) => {
//!         println!("bad range [{}, {}]", eps_min, eps_max);
//!     }
//!     Err(e) => println!("[{}] {}", e.code(), e),
//! }
//! ```
//!
//! # Logging
//!
//! The crate logs through `tracing` and never installs a subscriber. Set
//! `RUST_LOG=mesh_segment=debug` for per-radius-step output, or
//! `mesh_segment::timing=info` for operation timing only.

mod error;
pub mod tracing_ext;
mod types;

#[cfg(test)]
mod edge_cases;

pub mod compat;
pub mod edges;
pub mod growth;
pub mod progress;
pub mod regions;
pub mod spatial;
pub mod sweep;
pub mod union_find;

// Sweep configuration files (requires config feature)
#[cfg(feature = "config")]
pub mod config;

// Re-export core types at crate root
pub use error::{ErrorCode, InputLocation, RecoverySuggestion, SegmentError, SegmentResult};
pub use types::{FaceCorner, SegmentationInput, SurfacePoint};

pub use compat::{AlwaysCompatible, MergeCompatibility, NormalAngle, angle_between, is_compatible};
pub use edges::EdgeSet;
pub use growth::{
    GrowthOutcome, GrowthParams, MAX_RADIUS_STEPS, MergeScope, RadiusSchedule, grow_regions,
    grow_regions_with_progress,
};
pub use progress::{Progress, ProgressCallback};
pub use regions::{RegionSummary, group_by_label, summarize_labels};
pub use spatial::{DistanceExtent, SpatialIndex};
pub use sweep::{SweepConfig, SweepOutcome, run_sweep, run_sweep_with, run_sweep_with_progress};
pub use union_find::DisjointSet;

#[cfg(feature = "config")]
pub use config::ConfigError;
