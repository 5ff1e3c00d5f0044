//! Parameter sweep over angle tolerances.
//!
//! A sweep runs region growth once per tolerance. Runs share the immutable
//! input and spatial index but nothing else, so they execute in parallel by
//! default. Outcomes are returned in tolerance order regardless of the order
//! in which runs finish.

use std::f64::consts::PI;

use rayon::prelude::*;
use tracing::info;

use crate::compat::{MergeCompatibility, NormalAngle};
use crate::error::{SegmentError, SegmentResult};
use crate::growth::{GrowthOutcome, GrowthParams, MergeScope, RadiusSchedule, grow_regions_with_index};
use crate::progress::ProgressCallback;
use crate::regions::RegionSummary;
use crate::spatial::SpatialIndex;
use crate::tracing_ext::{OperationTimer, log_input_stats, log_perf_section, log_sweep_result};
use crate::types::SegmentationInput;

/// Divisors of π for the reference tolerance list, tightest first.
const REFERENCE_PI_DIVISORS: [f64; 18] = [
    36.0, 34.0, 32.0, 30.0, 28.0, 26.0, 24.0, 22.0, 20.0, 18.0, 16.0, 14.0, 12.0, 10.0, 8.0, 6.0,
    4.0, 2.0,
];

/// Configuration for a tolerance sweep.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SweepConfig {
    /// First radius of every growth run.
    pub eps_min: f64,
    /// Last radius of every growth run (inclusive).
    pub eps_max: f64,
    /// Radius increment.
    pub eps_step: f64,
    /// Angle tolerances in radians, in sweep order.
    pub theta_max_values: Vec<f64>,
    /// Tolerances given as divisors of π. When set, replaces
    /// `theta_max_values`.
    #[cfg_attr(
        feature = "config",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub theta_max_pi_divisors: Option<Vec<f64>>,
    /// Merge scope for every run.
    pub scope: MergeScope,
    /// Run tolerances in parallel.
    pub parallel_sweeps: bool,
    /// Compute candidate sets within a radius step in parallel.
    pub parallel_steps: bool,
    /// Cache compatible neighbors per vertex for the whole run.
    pub cache_neighbors: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl SweepConfig {
    /// Radius range 0.001 to 20 in steps of 0.1 and eighteen tolerances from
    /// π/36 up to π/2.
    pub fn reference() -> Self {
        let growth = GrowthParams::reference();
        Self {
            eps_min: growth.eps_min,
            eps_max: growth.eps_max,
            eps_step: growth.eps_step,
            theta_max_values: REFERENCE_PI_DIVISORS.iter().map(|d| PI / d).collect(),
            theta_max_pi_divisors: None,
            scope: growth.scope,
            parallel_sweeps: true,
            parallel_steps: growth.parallel,
            cache_neighbors: growth.cache_neighbors,
        }
    }

    /// Reference options with a custom radius range and tolerance list.
    pub fn new(eps_min: f64, eps_max: f64, eps_step: f64, theta_max_values: Vec<f64>) -> Self {
        Self {
            eps_min,
            eps_max,
            eps_step,
            theta_max_values,
            ..Self::reference()
        }
    }

    /// Replace the tolerance list.
    pub fn with_tolerances(mut self, theta_max_values: Vec<f64>) -> Self {
        self.theta_max_values = theta_max_values;
        self.theta_max_pi_divisors = None;
        self
    }

    /// Set the merge scope.
    pub fn with_scope(mut self, scope: MergeScope) -> Self {
        self.scope = scope;
        self
    }

    /// Enable or disable parallel tolerance runs.
    pub fn with_parallel_sweeps(mut self, parallel: bool) -> Self {
        self.parallel_sweeps = parallel;
        self
    }

    /// All tolerances in sweep order, in radians.
    pub fn tolerances(&self) -> Vec<f64> {
        match &self.theta_max_pi_divisors {
            Some(divisors) => divisors.iter().map(|d| PI / d).collect(),
            None => self.theta_max_values.clone(),
        }
    }

    /// Growth parameters shared by every run.
    pub fn growth_params(&self) -> GrowthParams {
        GrowthParams {
            eps_min: self.eps_min,
            eps_max: self.eps_max,
            eps_step: self.eps_step,
            scope: self.scope,
            parallel: self.parallel_steps,
            cache_neighbors: self.cache_neighbors,
        }
    }

    /// Check the radius schedule and every tolerance.
    ///
    /// Tolerances must be finite and non-negative.
    pub fn validate(&self) -> SegmentResult<()> {
        RadiusSchedule::new(self.eps_min, self.eps_max, self.eps_step)?;
        for (position, theta) in self.tolerances().into_iter().enumerate() {
            if !theta.is_finite() || theta < 0.0 {
                return Err(SegmentError::invalid_tolerance(position, theta));
            }
        }
        Ok(())
    }
}

/// Result of one tolerance run.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    /// Position of the tolerance in the sweep order.
    pub position: usize,
    /// Angle tolerance in radians.
    pub theta_max: f64,
    /// Growth result for this tolerance.
    pub growth: GrowthOutcome,
}

impl SweepOutcome {
    /// Region representative of every vertex.
    #[inline]
    pub fn labels(&self) -> &[u32] {
        &self.growth.labels
    }

    /// Death time of every vertex.
    #[inline]
    pub fn death_times(&self) -> &[f64] {
        &self.growth.death_times
    }

    /// Region statistics.
    pub fn summary(&self) -> RegionSummary {
        self.growth.summary()
    }
}

/// Run one growth per tolerance using the normal-angle predicate.
///
/// Returns one outcome per tolerance, in order. An empty vertex set or an
/// empty tolerance list yields no outcomes.
///
/// # Example
///
/// ```
/// use mesh_segment::{SegmentationInput, SweepConfig, run_sweep};
/// use nalgebra::{Point3, Vector3};
/// use std::f64::consts::PI;
///
/// let input = SegmentationInput::from_points_and_normals(
///     vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.5, 0.0, 0.0)],
///     vec![Vector3::z(), Vector3::y()],
/// )
/// .unwrap();
///
/// let config = SweepConfig::new(0.5, 1.0, 0.5, vec![PI / 4.0, PI]);
/// let outcomes = run_sweep(&input, &config).unwrap();
///
/// assert_eq!(outcomes.len(), 2);
/// assert_eq!(outcomes[0].labels(), &[0, 1]);
/// assert_eq!(outcomes[1].labels(), &[0, 0]);
/// ```
pub fn run_sweep(
    input: &SegmentationInput,
    config: &SweepConfig,
) -> SegmentResult<Vec<SweepOutcome>> {
    run_sweep_with_progress(input, config, None)
}

/// Like [`run_sweep`], forwarding per-step progress of every run to
/// `callback`.
pub fn run_sweep_with_progress(
    input: &SegmentationInput,
    config: &SweepConfig,
    callback: Option<&ProgressCallback>,
) -> SegmentResult<Vec<SweepOutcome>> {
    run_sweep_with(input, config, NormalAngle::new, callback)
}

/// Run one growth per tolerance with a predicate built by `make_predicate`.
///
/// `make_predicate` receives each tolerance in radians.
pub fn run_sweep_with<P, F>(
    input: &SegmentationInput,
    config: &SweepConfig,
    make_predicate: F,
    callback: Option<&ProgressCallback>,
) -> SegmentResult<Vec<SweepOutcome>>
where
    P: MergeCompatibility,
    F: Fn(f64) -> P + Sync,
{
    config.validate()?;
    let tolerances = config.tolerances();
    if input.is_empty() || tolerances.is_empty() {
        info!(
            "Nothing to sweep: {} vertices, {} tolerances",
            input.vertex_count(),
            tolerances.len()
        );
        return Ok(Vec::new());
    }

    let _timer = OperationTimer::with_context("run_sweep", input.vertex_count(), tolerances.len());
    log_input_stats(input, "run_sweep");
    info!(
        "Sweeping {} tolerances over {} vertices (parallel: {})",
        tolerances.len(),
        input.vertex_count(),
        config.parallel_sweeps
    );

    let index = {
        let _perf = log_perf_section("build_spatial_index");
        SpatialIndex::build(input.vertices())
    };
    let params = config.growth_params();

    let run = |(position, theta_max): (usize, f64)| -> SegmentResult<SweepOutcome> {
        let predicate = make_predicate(theta_max);
        let growth = grow_regions_with_index(input, &index, &params, &predicate, callback)?;
        log_sweep_result(position, theta_max, &growth.summary());
        Ok(SweepOutcome {
            position,
            theta_max,
            growth,
        })
    };

    if config.parallel_sweeps {
        tolerances
            .into_par_iter()
            .enumerate()
            .map(run)
            .collect()
    } else {
        tolerances.into_iter().enumerate().map(run).collect()
    }
}
