//! End-to-end integration tests for mesh-segment.
//!
//! These tests run complete sweeps on small hand-built inputs and check the
//! labels and death times against values worked out by hand.

use std::f64::consts::PI;

use approx::assert_relative_eq;
use mesh_segment::{
    AlwaysCompatible, EdgeSet, ErrorCode, FaceCorner, GrowthParams, MergeScope, NormalAngle,
    SegmentationInput, SpatialIndex, SweepConfig, SurfacePoint, group_by_label, grow_regions,
    grow_regions_with_progress, run_sweep, run_sweep_with, summarize_labels,
};
use mesh_segment::progress::{Progress, ProgressCallback};
use nalgebra::{Point3, Vector3};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Points spread evenly over a sphere, each with its outward normal.
fn sphere_input(count: usize, radius: f64) -> SegmentationInput {
    let golden = PI * (3.0 - 5.0f64.sqrt());
    let mut points = Vec::with_capacity(count);
    let mut normals = Vec::with_capacity(count);
    for i in 0..count {
        let y = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
        let r = (1.0 - y * y).sqrt();
        let phi = golden * i as f64;
        let n = Vector3::new(phi.cos() * r, y, phi.sin() * r);
        points.push(Point3::from(n * radius));
        normals.push(n);
    }
    SegmentationInput::from_points_and_normals(points, normals).unwrap()
}

/// Two unit squares meeting at a right-angled crease, as a corner-indexed
/// triangle list with one normal per face.
fn folded_sheet() -> SegmentationInput {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
    ];
    let normals = vec![Vector3::z(), Vector3::x()];
    let c = |v, n| FaceCorner::new(v, Some(n));
    let faces = [
        [c(0, 0), c(1, 0), c(2, 0)],
        [c(0, 0), c(2, 0), c(3, 0)],
        [c(1, 1), c(4, 1), c(5, 1)],
        [c(1, 1), c(5, 1), c(2, 1)],
    ];
    SegmentationInput::from_corners(vertices, normals, &faces).unwrap()
}

// =============================================================================
// Reference scenarios
// =============================================================================

#[test]
fn test_nearby_pair_merges_far_vertex_stays_alone() {
    let input = SegmentationInput::from_points_and_normals(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(100.0, 0.0, 0.0),
        ],
        vec![Vector3::new(0.3, 0.4, 0.5); 3],
    )
    .unwrap();
    let config = SweepConfig::new(0.5, 2.0, 0.5, vec![PI]);

    let outcomes = run_sweep(&input, &config).unwrap();
    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];

    assert_eq!(outcome.death_times()[1], 1.0);
    assert!(outcome.death_times()[0].is_infinite());
    assert!(outcome.death_times()[2].is_infinite());
    assert_eq!(outcome.labels()[0], outcome.labels()[1]);
    assert_eq!(outcome.labels()[2], 2);
}

#[test]
fn test_coincident_orthogonal_normals_never_merge() {
    let input = SegmentationInput::from_points_and_normals(
        vec![Point3::new(2.0, 2.0, 2.0); 2],
        vec![Vector3::x(), Vector3::z()],
    )
    .unwrap();
    let config = SweepConfig::new(0.001, 20.0, 0.1, vec![PI / 4.0]);

    let outcome = &run_sweep(&input, &config).unwrap()[0];
    assert_eq!(outcome.labels(), &[0, 1]);
    assert!(outcome.death_times().iter().all(|t| t.is_infinite()));
}

#[test]
fn test_vertex_without_normal_is_never_a_target() {
    // Vertex 0 sits in the middle of a ring of compatible vertices but has
    // no normal. With the lowest index it would be every merge target.
    let mut points = vec![Point3::origin()];
    for k in 0..6 {
        let a = k as f64 * PI / 3.0;
        points.push(Point3::new(a.cos() * 0.5, a.sin() * 0.5, 0.0));
    }
    let mut normal_map = vec![None];
    normal_map.extend((0..6).map(|_| Some(0)));
    let input = SegmentationInput::new(points, vec![Vector3::z()], normal_map, vec![]).unwrap();

    let config = SweepConfig::new(0.1, 2.0, 0.1, vec![PI / 36.0, PI / 2.0]);
    for outcome in run_sweep(&input, &config).unwrap() {
        assert_eq!(outcome.labels()[0], 0);
        assert!(outcome.death_times()[0].is_infinite());
        // The ring joins into one region of its own
        let ring = outcome.labels()[1];
        assert_ne!(ring, 0);
        assert!(outcome.labels()[1..].iter().all(|&l| l == ring));
    }
}

#[test]
fn test_looser_tolerance_never_merges_fewer_vertices() {
    let input = sphere_input(300, 1.0);
    let thetas: Vec<f64> = [36.0, 24.0, 18.0, 12.0, 8.0, 4.0, 2.0]
        .iter()
        .map(|d| PI / d)
        .collect();
    let config = SweepConfig::new(0.02, 0.3, 0.02, thetas);

    let outcomes = run_sweep(&input, &config).unwrap();
    let merged: Vec<usize> = outcomes
        .iter()
        .map(|o| o.summary().merged_vertex_count)
        .collect();

    assert!(
        merged.windows(2).all(|w| w[0] <= w[1]),
        "merged counts not monotonic: {:?}",
        merged
    );
    assert_eq!(*merged.last().unwrap(), 300);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_parallel_and_sequential_sweeps_agree() {
    let input = sphere_input(200, 2.0);
    let config = SweepConfig::new(0.05, 0.6, 0.05, vec![0.05, 0.1, 0.2, 0.4, 0.8]);

    let parallel = run_sweep(&input, &config).unwrap();
    let sequential = run_sweep(&input, &config.clone().with_parallel_sweeps(false)).unwrap();

    for (a, b) in parallel.iter().zip(&sequential) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.labels(), b.labels());
        assert_eq!(a.death_times(), b.death_times());
    }

    // Each run matches a standalone growth with the same tolerance
    for outcome in &parallel {
        let alone = grow_regions(
            &input,
            &config.growth_params(),
            &NormalAngle::new(outcome.theta_max),
        )
        .unwrap();
        assert_eq!(outcome.labels(), alone.labels.as_slice());
    }
}

#[test]
fn test_proposal_modes_agree_with_serial_growth() {
    let input = sphere_input(250, 1.5);
    let predicate = NormalAngle::pi_over(10.0);

    for scope in [MergeScope::Closed, MergeScope::Open] {
        let serial = GrowthParams::with_range(0.05, 0.8, 0.05)
            .scope(scope)
            .parallel(false);
        let expected = grow_regions(&input, &serial, &predicate).unwrap();

        let fast = serial.clone().parallel(true).cache_neighbors(true);
        let actual = grow_regions(&input, &fast, &predicate).unwrap();

        assert_eq!(actual.labels, expected.labels);
        assert_eq!(actual.death_times, expected.death_times);
        assert_eq!(actual.merge_count, expected.merge_count);
    }
}

// =============================================================================
// Corner-indexed input
// =============================================================================

#[test]
fn test_crease_separates_faces() {
    let input = folded_sheet();
    // Crease vertices 1 and 2 take the normal of the last corner naming them
    assert_eq!(input.normal_of(1), Some(&Vector3::x()));
    assert_eq!(input.normal_of(2), Some(&Vector3::x()));
    assert_eq!(EdgeSet::from_faces(input.faces()).len(), 9);

    let config = SweepConfig::new(0.5, 1.5, 0.5, vec![PI / 4.0]);
    let outcome = &run_sweep(&input, &config).unwrap()[0];
    let groups = group_by_label(outcome.labels());

    assert_eq!(groups, vec![vec![1, 2, 4, 5], vec![0, 3]]);
}

#[test]
fn test_corners_without_normals_leave_vertex_unassigned() {
    let faces = [[
        FaceCorner::new(0, Some(0)),
        FaceCorner::new(1, None),
        FaceCorner::new(2, Some(0)),
    ]];
    let input = SegmentationInput::from_corners(
        vec![Point3::origin(), Point3::new(0.1, 0.0, 0.0), Point3::new(0.2, 0.0, 0.0)],
        vec![Vector3::z()],
        &faces,
    )
    .unwrap();
    assert!(!input.has_normal(1));
    assert_eq!(input.vertices_with_normals(), 2);
}

// =============================================================================
// Custom predicates and observability
// =============================================================================

#[test]
fn test_closure_predicate_splits_by_height() {
    let input = SegmentationInput::from_points_and_normals(
        (0..6).map(|i| Point3::new(i as f64 * 0.1, 0.0, (i / 3) as f64 * 0.05)).collect(),
        vec![Vector3::z(); 6],
    )
    .unwrap();

    fn same_level(a: &SurfacePoint<'_>, b: &SurfacePoint<'_>) -> bool {
        (a.position.z - b.position.z).abs() < 1e-9
    }

    let config = SweepConfig::new(0.5, 1.0, 0.5, vec![0.0]);
    let outcome = &run_sweep_with(&input, &config, |_| same_level, None).unwrap()[0];
    assert_eq!(outcome.labels(), &[0, 0, 0, 3, 3, 3]);

    let merged = &run_sweep_with(&input, &config, |_| AlwaysCompatible, None).unwrap()[0];
    assert_eq!(summarize_labels(merged.labels()).region_count, 1);
}

#[test]
fn test_progress_reports_every_step() {
    let input = sphere_input(50, 1.0);
    let seen = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(Mutex::new(None::<Progress>));

    let seen_cb = Arc::clone(&seen);
    let last_cb = Arc::clone(&last);
    let callback: ProgressCallback = Box::new(move |p: &Progress| {
        seen_cb.fetch_add(1, Ordering::SeqCst);
        *last_cb.lock().unwrap() = Some(p.clone());
    });

    let params = GrowthParams::with_range(0.1, 1.0, 0.1);
    let steps = params.schedule().unwrap().len();
    grow_regions_with_progress(&input, &params, &NormalAngle::pi_over(4.0), Some(&callback))
        .unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), steps);
    let last = last.lock().unwrap().clone().unwrap();
    assert!(last.is_complete());
    assert_eq!(last.total as usize, steps);
}

#[test]
fn test_distance_extent_brackets_merge_radii() {
    let input = sphere_input(100, 3.0);
    let extent = SpatialIndex::build(input.vertices())
        .distance_extent()
        .unwrap();
    assert!(extent.min > 0.0);
    assert_relative_eq!(extent.max, 6.0, epsilon = 0.2);

    // Nothing merges below the smallest separation
    let below = GrowthParams::with_range(extent.min * 0.5, extent.min * 0.9, extent.min * 0.1);
    let outcome = grow_regions(&input, &below, &AlwaysCompatible).unwrap();
    assert_eq!(outcome.merge_count, 0);

    // Everything is in reach at the largest separation
    let above = GrowthParams::with_range(extent.max, extent.max, 1.0);
    let outcome = grow_regions(&input, &above, &AlwaysCompatible).unwrap();
    assert_eq!(outcome.summary().region_count, 1);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_invalid_sweep_config_reports_code_and_suggestion() {
    let config = SweepConfig::new(0.0, 1.0, 0.0, vec![0.1]);
    let err = run_sweep(&sphere_input(10, 1.0), &config).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRadiusStep);
    assert_eq!(err.code().as_str(), "SEG-3002");
    assert!(!err.recovery_suggestion().to_string().is_empty());
}
