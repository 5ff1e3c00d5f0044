//! Tracing extensions for segmentation runs.
//!
//! Structured logging and timing for growth and sweeps, built on the
//! `tracing` ecosystem:
//!
//! - **Timing spans**: [`OperationTimer`] opens a `segment_operation` span and
//!   logs the elapsed time when dropped
//! - **Structured fields**: vertex counts, radius steps, region counts
//! - **Per-step events**: emitted at DEBUG by the growth loop
//!
//! # Usage
//!
//! Enable tracing by initializing a subscriber in your application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // Set RUST_LOG=mesh_segment=debug for per-step output
//! ```
//!
//! # Log Levels
//!
//! - **INFO**: Sweep and growth summaries, timing
//! - **DEBUG**: Per-radius-step merge counts, index construction
//! - **TRACE**: Individual merges

use std::time::Instant;
use tracing::{Span, debug, info, warn};

use crate::regions::RegionSummary;
use crate::types::SegmentationInput;

/// A performance timer that logs duration on drop.
///
/// # Example
///
/// ```rust,ignore
/// use mesh_segment::tracing_ext::OperationTimer;
///
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... do work ...
/// } // Timer logs duration when dropped
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("segment_operation", operation = name);
        debug!(target: "mesh_segment::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer with vertex and radius step counts attached.
    pub fn with_context(name: &'static str, vertex_count: usize, steps: usize) -> Self {
        let span = tracing::info_span!(
            "segment_operation",
            operation = name,
            vertices = vertex_count,
            steps = steps
        );
        debug!(
            target: "mesh_segment::timing",
            operation = name,
            vertices = vertex_count,
            steps = steps,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "mesh_segment::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log input statistics at debug level.
pub fn log_input_stats(input: &SegmentationInput, context: &str) {
    let (min_bounds, max_bounds) = input.bounds().unwrap_or_default();
    let with_normals = input.vertices_with_normals();
    debug!(
        context = context,
        vertices = input.vertex_count(),
        normals = input.normal_count(),
        faces = input.face_count(),
        with_normals = with_normals,
        bounds_min = format!(
            "[{:.3}, {:.3}, {:.3}]",
            min_bounds.x, min_bounds.y, min_bounds.z
        ),
        bounds_max = format!(
            "[{:.3}, {:.3}, {:.3}]",
            max_bounds.x, max_bounds.y, max_bounds.z
        ),
        "Input statistics"
    );

    let missing = input.vertex_count() - with_normals;
    if missing > 0 {
        warn!(
            context = context,
            missing = missing,
            "Vertices without a normal never take part in merges"
        );
    }
}

/// Log the regions produced for one tolerance of a sweep.
pub fn log_sweep_result(position: usize, theta_max: f64, summary: &RegionSummary) {
    info!(
        position = position,
        theta_max = format!("{:.6}", theta_max),
        regions = summary.region_count,
        singletons = summary.singleton_count,
        largest = summary.largest_region_size,
        "Sweep finished"
    );
    if summary.is_single_region() && summary.largest_region_size > 1 {
        debug!(
            position = position,
            theta_max = format!("{:.6}", theta_max),
            "All vertices collapsed into one region"
        );
    }
}

/// Start a timed section that logs its duration at debug level when dropped.
pub fn log_perf_section(section: &'static str) -> impl Drop {
    struct PerfGuard {
        section: &'static str,
        start: Instant,
    }

    impl Drop for PerfGuard {
        fn drop(&mut self) {
            debug!(
                target: "mesh_segment::perf",
                section = self.section,
                elapsed_us = self.start.elapsed().as_micros() as u64,
                "Section completed"
            );
        }
    }

    PerfGuard {
        section,
        start: Instant::now(),
    }
}
