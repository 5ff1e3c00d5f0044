//! Merge compatibility between two surface points.
//!
//! Region growth only ever joins two vertices when a [`MergeCompatibility`]
//! predicate accepts the pair. The default predicate compares vertex normals
//! against a maximum angle; anything else (curvature, color, tags) can be
//! plugged in by implementing the trait or passing a closure.

use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::types::SurfacePoint;

/// Angle between two vectors in radians, in `[0, π]`.
///
/// The cosine is clamped to `[-1, 1]` before `acos`, so rounding noise on
/// (anti)parallel vectors never leaves the domain. A zero-length vector has no
/// direction and yields NaN.
#[inline]
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return f64::NAN;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Whether the angle between `a` and `b` is at most `theta_max`.
///
/// Always `false` when either vector is zero-length.
#[inline]
pub fn is_compatible(a: &Vector3<f64>, b: &Vector3<f64>, theta_max: f64) -> bool {
    angle_between(a, b) <= theta_max
}

/// Decides whether two vertices may ever be merged.
///
/// Implementations must be symmetric and pure; growth calls them from
/// several threads when parallel proposals are enabled.
pub trait MergeCompatibility: Send + Sync {
    /// Whether `a` and `b` may join the same region.
    fn is_compatible(&self, a: &SurfacePoint<'_>, b: &SurfacePoint<'_>) -> bool;
}

impl<F> MergeCompatibility for F
where
    F: Fn(&SurfacePoint<'_>, &SurfacePoint<'_>) -> bool + Send + Sync,
{
    #[inline]
    fn is_compatible(&self, a: &SurfacePoint<'_>, b: &SurfacePoint<'_>) -> bool {
        self(a, b)
    }
}

/// Normals must be within `theta_max` radians of each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalAngle {
    /// Maximum permitted angle between normals, in radians.
    pub theta_max: f64,
}

impl NormalAngle {
    /// Create a predicate with the given tolerance in radians.
    pub fn new(theta_max: f64) -> Self {
        Self { theta_max }
    }

    /// Tolerance of `π / divisor` radians.
    pub fn pi_over(divisor: f64) -> Self {
        Self::new(PI / divisor)
    }
}

impl MergeCompatibility for NormalAngle {
    #[inline]
    fn is_compatible(&self, a: &SurfacePoint<'_>, b: &SurfacePoint<'_>) -> bool {
        is_compatible(a.normal, b.normal, self.theta_max)
    }
}

/// Accepts every pair, reducing growth to plain single-linkage clustering
/// by distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysCompatible;

impl MergeCompatibility for AlwaysCompatible {
    #[inline]
    fn is_compatible(&self, _a: &SurfacePoint<'_>, _b: &SurfacePoint<'_>) -> bool {
        true
    }
}
