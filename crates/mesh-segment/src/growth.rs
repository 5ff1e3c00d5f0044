//! Region growth over an increasing radius.
//!
//! One growth run (a *sweep*) fixes a merge predicate and walks a radius
//! schedule `eps_min, eps_min + step, ..., <= eps_max`. At every radius each
//! vertex that has a normal gathers its compatible neighbors within that
//! radius and merges them into the lowest-indexed candidate. Because the
//! radius only grows, the result is a single-linkage clustering in which
//! the predicate decides which spatial edges may ever exist.
//!
//! For every vertex the run records a *death time*: the radius at which it
//! was last merged into another region as a non-target candidate. Vertices
//! that never merge keep `f64::INFINITY`.
//!
//! # Algorithm
//!
//! ```text
//! for eps in schedule:
//!     for i in vertices with a normal (ascending):
//!         C = { nn != i : |p_nn - p_i| <= eps, nn has a normal, compatible(i, nn) }
//!         if scope is Closed: C = C + { i }
//!         if C is empty: continue
//!         target = min(C)
//!         for nn in C - { target } (ascending):
//!             if find(nn) != find(target):
//!                 death[nn] = eps
//!                 union(nn, target)
//! ```
//!
//! Candidate sets depend only on the immutable input, never on the
//! disjoint-set state, so they can be computed in parallel and applied
//! serially in vertex order without changing the result.

use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::compat::MergeCompatibility;
use crate::error::{SegmentError, SegmentResult};
use crate::progress::{ProgressCallback, ProgressTracker};
use crate::regions::{RegionSummary, summarize_labels};
use crate::spatial::SpatialIndex;
use crate::tracing_ext::{OperationTimer, log_perf_section};
use crate::types::SegmentationInput;
use crate::union_find::DisjointSet;

/// Slack for counting radius steps, so a range that is an exact multiple of
/// the step still includes `eps_max` despite rounding.
const STEP_COUNT_SLACK: f64 = 1e-9;

/// Upper bound on the number of radius steps in one schedule. The reference
/// schedule has 200.
pub const MAX_RADIUS_STEPS: usize = 1_000_000;

/// Which vertices take part in a merge proposed by a query vertex.
///
/// `Open` reproduces the original segmentation script exactly. `Closed`
/// additionally lets two mutually compatible vertices merge with each other
/// when they have no third neighbor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum MergeScope {
    /// The query vertex joins its own compatible neighbors, and the merge
    /// target is the lowest index among all of them.
    #[default]
    Closed,
    /// Only the compatible neighbors are merged; the query vertex itself is
    /// never a candidate.
    Open,
}

/// Parameters for one growth run.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthParams {
    /// First radius of the schedule.
    pub eps_min: f64,
    /// Last radius of the schedule (inclusive).
    pub eps_max: f64,
    /// Fixed radius increment.
    pub eps_step: f64,
    /// Whether the query vertex is part of its own candidate set.
    pub scope: MergeScope,
    /// Compute candidate sets for all vertices of a step in parallel.
    pub parallel: bool,
    /// Query each vertex once at the largest radius and reuse the sorted
    /// result for every step. Faster, at the cost of memory proportional to
    /// the neighborhood size at `eps_max`.
    pub cache_neighbors: bool,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self::reference()
    }
}

impl GrowthParams {
    /// Radius range 0.001 to 20 in steps of 0.1.
    pub fn reference() -> Self {
        Self {
            eps_min: 0.001,
            eps_max: 20.0,
            eps_step: 0.1,
            scope: MergeScope::Closed,
            parallel: true,
            cache_neighbors: false,
        }
    }

    /// Parameters with a custom radius schedule and default options.
    pub fn with_range(eps_min: f64, eps_max: f64, eps_step: f64) -> Self {
        Self {
            eps_min,
            eps_max,
            eps_step,
            ..Self::reference()
        }
    }

    /// Set the merge scope.
    pub fn scope(mut self, scope: MergeScope) -> Self {
        self.scope = scope;
        self
    }

    /// Enable or disable parallel candidate computation.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable or disable the neighbor cache.
    pub fn cache_neighbors(mut self, cache: bool) -> Self {
        self.cache_neighbors = cache;
        self
    }

    /// Validate the radius schedule and return it.
    pub fn schedule(&self) -> SegmentResult<RadiusSchedule> {
        RadiusSchedule::new(self.eps_min, self.eps_max, self.eps_step)
    }
}

/// The radii visited by a growth run, `eps_min + k * eps_step` for
/// `k = 0..len`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusSchedule {
    eps_min: f64,
    eps_step: f64,
    steps: usize,
}

impl RadiusSchedule {
    /// Validate a radius range and step.
    ///
    /// Requires finite `0 <= eps_min <= eps_max` and a finite positive step
    /// that yields at most [`MAX_RADIUS_STEPS`] radii.
    pub fn new(eps_min: f64, eps_max: f64, eps_step: f64) -> SegmentResult<Self> {
        if !eps_min.is_finite() || !eps_max.is_finite() || eps_min < 0.0 || eps_max < eps_min {
            return Err(SegmentError::invalid_radius_range(eps_min, eps_max));
        }
        if !eps_step.is_finite() || eps_step <= 0.0 {
            return Err(SegmentError::invalid_radius_step(eps_step));
        }

        // Counted in f64 so a tiny step cannot overflow the cast
        let intervals = ((eps_max - eps_min) / eps_step + STEP_COUNT_SLACK).floor();
        if !intervals.is_finite() || intervals >= MAX_RADIUS_STEPS as f64 {
            return Err(SegmentError::invalid_radius_step(eps_step));
        }

        let steps = intervals as usize + 1;
        Ok(Self {
            eps_min,
            eps_step,
            steps,
        })
    }

    /// Number of radius steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps
    }

    /// Always false: a valid schedule has at least one step.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    /// Radius of step `k`.
    #[inline]
    pub fn radius(&self, k: usize) -> f64 {
        self.eps_min + k as f64 * self.eps_step
    }

    /// Largest radius visited.
    #[inline]
    pub fn last(&self) -> f64 {
        self.radius(self.steps - 1)
    }

    /// Iterate over all radii in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.steps).map(|k| self.radius(k))
    }
}

/// Final state of one growth run.
#[derive(Debug, Clone)]
pub struct GrowthOutcome {
    /// Disjoint-set state at the end of the run.
    pub regions: DisjointSet,
    /// Region representative of every vertex.
    pub labels: Vec<u32>,
    /// Per-vertex death time; `f64::INFINITY` if the vertex never merged.
    pub death_times: Vec<f64>,
    /// Radii visited, in order.
    pub radii: Vec<f64>,
    /// Component count after each radius step.
    pub component_history: Vec<usize>,
    /// Number of successful unions.
    pub merge_count: usize,
}

impl GrowthOutcome {
    /// Death time of a vertex, `None` if it never merged.
    #[inline]
    pub fn death_time(&self, vertex: u32) -> Option<f64> {
        let t = self.death_times[vertex as usize];
        t.is_finite().then_some(t)
    }

    /// Region statistics for the final labels.
    pub fn summary(&self) -> RegionSummary {
        summarize_labels(&self.labels)
    }
}

/// Grow regions for one predicate.
///
/// Builds a fresh spatial index. [`run_sweep`](crate::run_sweep) shares one
/// index across all of its runs.
///
/// # Example
///
/// ```
/// use mesh_segment::{GrowthParams, NormalAngle, SegmentationInput, grow_regions};
/// use nalgebra::{Point3, Vector3};
///
/// let input = SegmentationInput::from_points_and_normals(
///     vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(100.0, 0.0, 0.0)],
///     vec![Vector3::z(); 3],
/// )
/// .unwrap();
///
/// let params = GrowthParams::with_range(0.5, 2.0, 0.5);
/// let outcome = grow_regions(&input, &params, &NormalAngle::new(std::f64::consts::PI)).unwrap();
///
/// assert_eq!(outcome.death_time(1), Some(1.0));
/// assert_eq!(outcome.death_time(2), None);
/// assert_eq!(outcome.labels, vec![0, 0, 2]);
/// ```
pub fn grow_regions<P>(
    input: &SegmentationInput,
    params: &GrowthParams,
    predicate: &P,
) -> SegmentResult<GrowthOutcome>
where
    P: MergeCompatibility + ?Sized,
{
    grow_regions_with_progress(input, params, predicate, None)
}

/// Grow regions, reporting after every radius step.
pub fn grow_regions_with_progress<P>(
    input: &SegmentationInput,
    params: &GrowthParams,
    predicate: &P,
    callback: Option<&ProgressCallback>,
) -> SegmentResult<GrowthOutcome>
where
    P: MergeCompatibility + ?Sized,
{
    let schedule = params.schedule()?;
    let index = SpatialIndex::build(input.vertices());
    Ok(grow_with_schedule(
        input, &index, params, &schedule, predicate, callback,
    ))
}

/// Grow regions using a prebuilt spatial index over `input`'s vertices.
pub(crate) fn grow_regions_with_index<P>(
    input: &SegmentationInput,
    index: &SpatialIndex,
    params: &GrowthParams,
    predicate: &P,
    callback: Option<&ProgressCallback>,
) -> SegmentResult<GrowthOutcome>
where
    P: MergeCompatibility + ?Sized,
{
    let schedule = params.schedule()?;
    debug_assert_eq!(
        index.len(),
        input.vertex_count(),
        "spatial index does not match the input vertex set"
    );
    Ok(grow_with_schedule(
        input, index, params, &schedule, predicate, callback,
    ))
}

/// Vertices proposed for merging by one query vertex at one radius.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Proposal {
    /// Lowest-indexed candidate.
    target: u32,
    /// Remaining candidates, ascending.
    members: Vec<u32>,
}

impl Proposal {
    /// Build from an ascending candidate list, `None` if there is nothing
    /// to merge.
    fn from_sorted(mut candidates: Vec<u32>) -> Option<Self> {
        if candidates.len() < 2 {
            return None;
        }
        let target = candidates.remove(0);
        Some(Self {
            target,
            members: candidates,
        })
    }
}

/// Candidate lookup for one sweep.
struct Candidates<'a, P: ?Sized> {
    input: &'a SegmentationInput,
    index: &'a SpatialIndex,
    predicate: &'a P,
    scope: MergeScope,
    /// Per vertex: compatible neighbors with squared distance, sorted by
    /// distance. Only populated when the neighbor cache is enabled.
    cache: Option<Vec<Vec<(u32, f64)>>>,
}

impl<'a, P> Candidates<'a, P>
where
    P: MergeCompatibility + ?Sized,
{
    fn new(
        input: &'a SegmentationInput,
        index: &'a SpatialIndex,
        predicate: &'a P,
        params: &GrowthParams,
        schedule: &RadiusSchedule,
    ) -> Self {
        let mut candidates = Self {
            input,
            index,
            predicate,
            scope: params.scope,
            cache: None,
        };

        if params.cache_neighbors {
            let _perf = log_perf_section("cache_neighbors");
            let max_radius = schedule.last();
            let build = |i: u32| {
                let mut hits = candidates.compatible_within(i, max_radius);
                hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
                hits
            };
            let cache: Vec<Vec<(u32, f64)>> = if params.parallel {
                (0..input.vertex_count() as u32)
                    .into_par_iter()
                    .map(build)
                    .collect()
            } else {
                (0..input.vertex_count() as u32).map(build).collect()
            };
            debug!(
                "Cached {} compatible neighbor pairs at radius {:.4}",
                cache.iter().map(Vec::len).sum::<usize>(),
                max_radius
            );
            candidates.cache = Some(cache);
        }

        candidates
    }

    /// Compatible neighbors of `i` within `radius`, excluding `i`, with
    /// squared distances. Empty when `i` has no normal.
    fn compatible_within(&self, i: u32, radius: f64) -> Vec<(u32, f64)> {
        let Some(center) = self.input.surface_point(i) else {
            return Vec::new();
        };

        self.index
            .within_radius_sq(center.position, radius)
            .into_iter()
            .filter(|&(nn, _)| nn != i)
            .filter(|&(nn, _)| {
                self.input
                    .surface_point(nn)
                    .is_some_and(|other| self.predicate.is_compatible(&center, &other))
            })
            .collect()
    }

    /// Merge proposal of vertex `i` at radius `eps`.
    fn propose(&self, i: u32, eps: f64) -> Option<Proposal> {
        if !self.input.has_normal(i) {
            return None;
        }

        let mut members: Vec<u32> = match &self.cache {
            Some(cache) => {
                let eps_sq = eps * eps;
                let neighbors = &cache[i as usize];
                let end = neighbors.partition_point(|&(_, d)| d <= eps_sq);
                neighbors[..end].iter().map(|&(nn, _)| nn).collect()
            }
            None => self
                .compatible_within(i, eps)
                .into_iter()
                .map(|(nn, _)| nn)
                .collect(),
        };

        if members.is_empty() {
            return None;
        }
        if self.scope == MergeScope::Closed {
            members.push(i);
        }
        members.sort_unstable();
        Proposal::from_sorted(members)
    }
}

fn grow_with_schedule<P>(
    input: &SegmentationInput,
    index: &SpatialIndex,
    params: &GrowthParams,
    schedule: &RadiusSchedule,
    predicate: &P,
    callback: Option<&ProgressCallback>,
) -> GrowthOutcome
where
    P: MergeCompatibility + ?Sized,
{
    let _timer = OperationTimer::with_context("grow_regions", input.vertex_count(), schedule.len());
    let n = input.vertex_count();

    info!(
        "Growing regions over {} vertices ({} with normals), {} radius steps from {:.4} to {:.4}",
        n,
        input.vertices_with_normals(),
        schedule.len(),
        schedule.radius(0),
        schedule.last()
    );

    let mut regions = DisjointSet::new(n);
    let mut death_times = vec![f64::INFINITY; n];
    let mut radii = Vec::with_capacity(schedule.len());
    let mut component_history = Vec::with_capacity(schedule.len());
    let mut merge_count = 0usize;

    let candidates = Candidates::new(input, index, predicate, params, schedule);
    let tracker = ProgressTracker::new(schedule.len() as u64);

    for eps in schedule.iter() {
        let proposals: Vec<Proposal> = if params.parallel {
            (0..n as u32)
                .into_par_iter()
                .filter_map(|i| candidates.propose(i, eps))
                .collect()
        } else {
            (0..n as u32)
                .filter_map(|i| candidates.propose(i, eps))
                .collect()
        };

        let mut step_merges = 0usize;
        for proposal in &proposals {
            for &nn in &proposal.members {
                if regions.find(nn) != regions.find(proposal.target) {
                    death_times[nn as usize] = eps;
                    regions.union(nn, proposal.target);
                    step_merges += 1;
                    trace!(
                        vertex = nn,
                        target = proposal.target,
                        eps = eps,
                        "Merged vertex into region"
                    );
                }
            }
        }
        merge_count += step_merges;
        radii.push(eps);
        component_history.push(regions.component_count());

        debug!(
            "eps = {:.4}: {} merges, {} components",
            eps,
            step_merges,
            regions.component_count()
        );

        tracker.increment();
        tracker.maybe_report(callback, &format!("Growing regions (eps = {:.4})", eps));
    }

    let labels = regions.labels();

    info!(
        "Region growth finished: {} components after {} merges",
        regions.component_count(),
        merge_count
    );

    GrowthOutcome {
        regions,
        labels,
        death_times,
        radii,
        component_history,
        merge_count,
    }
}
