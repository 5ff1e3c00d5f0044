//! Progress reporting for long-running sweeps.
//!
//! A sweep reports after each radius step. Reporting is an observability hook
//! only: callbacks cannot stop a sweep, and an interrupted sweep is simply
//! restarted from scratch.
//!
//! # Example
//!
//! ```
//! use mesh_segment::progress::{Progress, ProgressCallback};
//!
//! let callback: ProgressCallback = Box::new(|progress: &Progress| {
//!     eprintln!("{}% {}", progress.percent(), progress.message);
//! });
//! # let _ = callback;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress information passed to callbacks.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Steps completed so far.
    pub current: u64,

    /// Total number of steps.
    pub total: u64,

    /// Human-readable description of the running operation.
    pub message: String,

    /// Elapsed time since the operation started.
    pub elapsed: Duration,

    /// Estimated time remaining (if available).
    pub estimated_remaining: Option<Duration>,
}

impl Progress {
    /// Create a new progress report.
    pub fn new(current: u64, total: u64, message: impl Into<String>) -> Self {
        Self {
            current,
            total,
            message: message.into(),
            elapsed: Duration::ZERO,
            estimated_remaining: None,
        }
    }

    /// Progress as a fraction (0.0 to 1.0).
    #[inline]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64) / (self.total as f64)
        }
    }

    /// Progress as a percentage (0 to 100).
    #[inline]
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }

    /// Whether every step has completed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

/// Callback for progress reporting.
pub type ProgressCallback = Box<dyn Fn(&Progress) + Send + Sync>;

/// Thread-safe step counter that snapshots progress for a callback.
#[derive(Debug)]
pub struct ProgressTracker {
    current: AtomicU64,
    total: u64,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a tracker for `total` steps.
    pub fn new(total: u64) -> Self {
        Self {
            current: AtomicU64::new(0),
            total,
            start_time: Instant::now(),
        }
    }

    /// Increment progress by one.
    #[inline]
    pub fn increment(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
    }

    /// Current step count.
    #[inline]
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    /// Total step count.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Elapsed time.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Estimate remaining time from the average step rate.
    pub fn estimated_remaining(&self) -> Option<Duration> {
        let current = self.current();
        if current == 0 {
            return None;
        }

        let rate = current as f64 / self.elapsed().as_secs_f64();
        if rate > 0.0 && rate.is_finite() {
            let remaining = self.total.saturating_sub(current) as f64 / rate;
            Some(Duration::from_secs_f64(remaining))
        } else {
            None
        }
    }

    /// Create a Progress snapshot.
    pub fn snapshot(&self, message: impl Into<String>) -> Progress {
        Progress {
            current: self.current(),
            total: self.total,
            message: message.into(),
            elapsed: self.elapsed(),
            estimated_remaining: self.estimated_remaining(),
        }
    }

    /// Deliver a snapshot to the callback, if any. Returns whether the
    /// callback ran.
    pub fn maybe_report(&self, callback: Option<&ProgressCallback>, message: &str) -> bool {
        let Some(callback) = callback else {
            return false;
        };
        callback(&self.snapshot(message));
        true
    }
}
